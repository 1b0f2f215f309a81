use super::*;
use crate::args::parsers::{parse_duration_arg, parse_threshold};
use clap::Parser;
use std::time::Duration;

fn parse_test_args<I, T>(args: I) -> Result<BenchArgs, String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    BenchArgs::try_parse_from(args).map_err(|err| format!("parse failed: {}", err))
}

#[test]
fn bench_defaults_leave_settings_unresolved() -> Result<(), String> {
    let args = parse_test_args(["routebench", "bench", "-i", "corpus.csv"])?;
    let Command::Bench(run) = args.command else {
        return Err("Expected bench subcommand".to_owned());
    };
    let checks = [
        (run.input.as_deref() == Some("corpus.csv"), "Unexpected input"),
        (run.input_format == InputFormat::Auto, "Expected auto format"),
        (run.concurrency.is_none(), "Expected concurrency unset"),
        (run.extra_args.is_none(), "Expected extra args unset"),
        (run.target.scenarios.is_empty(), "Expected no scenarios"),
        (run.target.server_url.is_none(), "Expected server url unset"),
        (!run.target.no_charts, "Expected charts enabled"),
        (!args.verbose, "Expected verbose off"),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(message.to_owned());
        }
    }
    Ok(())
}

#[test]
fn bench_parses_scenarios_and_concurrency() -> Result<(), String> {
    let args = parse_test_args([
        "routebench",
        "bench",
        "-i",
        "corpus.csv",
        "-c",
        "8",
        "-s",
        "baseline",
        "-s",
        "candidate",
        "-a",
        "first_section_mode[]=car&last_section_mode[]=car",
        "--timeout",
        "500ms",
        "-v",
    ])?;
    let Command::Bench(run) = args.command else {
        return Err("Expected bench subcommand".to_owned());
    };
    if run.concurrency.map(PositiveUsize::get) != Some(8) {
        return Err("Expected concurrency 8".to_owned());
    }
    let names: Vec<&str> = run
        .target
        .scenarios
        .iter()
        .map(ScenarioName::as_str)
        .collect();
    if names != ["baseline", "candidate"] {
        return Err(format!("Unexpected scenarios: {:?}", names));
    }
    if run.extra_args.as_deref() != Some("first_section_mode[]=car&last_section_mode[]=car") {
        return Err("Extra args were altered".to_owned());
    }
    if run.request_timeout != Some(Duration::from_millis(500)) {
        return Err("Unexpected timeout".to_owned());
    }
    if !args.verbose {
        return Err("Expected verbose".to_owned());
    }
    Ok(())
}

#[test]
fn zero_concurrency_is_rejected() -> Result<(), String> {
    if parse_test_args(["routebench", "bench", "-i", "c.csv", "-c", "0"]).is_ok() {
        return Err("Expected concurrency 0 to fail".to_owned());
    }
    Ok(())
}

#[test]
fn scenario_names_cannot_escape_output_dir() -> Result<(), String> {
    for bad in ["", "../etc", "a/b", "with space", ".."] {
        if bad.parse::<ScenarioName>().is_ok() {
            return Err(format!("Expected '{}' to be rejected", bad));
        }
    }
    let name: ScenarioName = "experimental".parse().map_err(|err| format!("{}", err))?;
    if name.as_str() != "experimental" {
        return Err("Unexpected scenario name".to_owned());
    }
    Ok(())
}

#[test]
fn bounding_box_parses_and_validates() -> Result<(), String> {
    let bbox: BoundingBox = "2.2, 48.8, 2.4, 48.9"
        .parse()
        .map_err(|err| format!("{}", err))?;
    if (bbox.min_lon - 2.2).abs() > f64::EPSILON || (bbox.max_lat - 48.9).abs() > f64::EPSILON {
        return Err(format!("Unexpected bbox: {:?}", bbox));
    }
    for bad in ["1,2,3", "2.4,48.8,2.2,48.9", "a,b,c,d", "1,1,1,1"] {
        if bad.parse::<BoundingBox>().is_ok() {
            return Err(format!("Expected '{}' to be rejected", bad));
        }
    }
    Ok(())
}

#[test]
fn replot_accepts_positional_files() -> Result<(), String> {
    let args = parse_test_args(["routebench", "replot", "a.csv", "b.csv", "--no-charts"])?;
    let Command::Replot(replot) = args.command else {
        return Err("Expected replot subcommand".to_owned());
    };
    if replot.files != ["a.csv", "b.csv"] || !replot.target.no_charts {
        return Err(format!("Unexpected replot args: {:?}", replot));
    }
    Ok(())
}

#[test]
fn duration_and_threshold_parsers() -> Result<(), String> {
    let cases = [
        ("10", Duration::from_secs(10)),
        ("250ms", Duration::from_millis(250)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_arg(input).map_err(|err| format!("{}", err))?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", input, parsed));
        }
    }
    if parse_duration_arg("0s").is_ok() || parse_duration_arg("5d").is_ok() {
        return Err("Expected invalid durations to fail".to_owned());
    }
    let threshold = parse_threshold("7.5%").map_err(|err| format!("{}", err))?;
    if (threshold - 7.5).abs() > f64::EPSILON {
        return Err(format!("Unexpected threshold {}", threshold));
    }
    if parse_threshold("-1").is_ok() {
        return Err("Expected negative threshold to fail".to_owned());
    }
    Ok(())
}
