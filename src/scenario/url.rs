use crate::args::ScenarioName;
use crate::corpus::Request;

/// Query parameter selecting the backend algorithm variant.
pub const SCENARIO_PARAM: &str = "_override_scenario";

/// Resolves corpus requests into full URLs for one scenario:
/// `{server_url}/coverage/{coverage}/{path}?{parameters}&_override_scenario={scenario}&{extra_args}`.
#[derive(Debug, Clone)]
pub struct UrlTemplate {
    base: String,
    scenario_param: String,
    extra_args: String,
}

impl UrlTemplate {
    /// `extra_args` is appended verbatim; an empty value adds nothing.
    #[must_use]
    pub fn new(server_url: &str, coverage: &str, scenario: &ScenarioName, extra_args: &str) -> Self {
        Self {
            base: format!(
                "{}/coverage/{}",
                server_url.trim_end_matches('/'),
                coverage.trim_matches('/')
            ),
            scenario_param: format!("{}={}", SCENARIO_PARAM, scenario),
            extra_args: extra_args.to_owned(),
        }
    }

    #[must_use]
    pub fn resolve(&self, request: &Request) -> String {
        let path = request.path().trim_start_matches('/');
        let parameters = request.parameters().trim_start_matches('?');

        let mut url = String::with_capacity(
            self.base
                .len()
                .saturating_add(path.len())
                .saturating_add(parameters.len())
                .saturating_add(self.scenario_param.len())
                .saturating_add(self.extra_args.len())
                .saturating_add(4),
        );
        url.push_str(&self.base);
        if !path.is_empty() {
            url.push('/');
            url.push_str(path);
        }
        url.push('?');
        if !parameters.is_empty() {
            url.push_str(parameters);
            url.push('&');
        }
        url.push_str(&self.scenario_param);
        if !self.extra_args.is_empty() {
            url.push('&');
            url.push_str(&self.extra_args);
        }
        url
    }
}
