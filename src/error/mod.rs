mod app;
mod config;
mod corpus;
mod dispatch;
mod precondition;
mod report;
mod sink;
mod transport;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use corpus::CorpusError;
pub use dispatch::DispatchError;
pub use precondition::PreconditionError;
pub use report::ReportError;
pub use sink::SinkError;
pub use transport::TransportError;
pub use validation::ValidationError;
