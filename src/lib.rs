//! Core library for the `routebench` CLI.
//!
//! `routebench` replays a corpus of routing queries against two or more
//! backend scenarios of a transit-routing HTTP API, with a bounded number of
//! requests in flight, and compares their latency. Each scenario's outcomes
//! are persisted as they complete and reassembled in request order for the
//! comparison report. The primary user-facing interface is the `routebench`
//! command-line application; library APIs may evolve as the CLI grows.
pub mod app;
pub mod args;
pub mod config;
pub mod corpus;
pub mod coverage;
pub mod dispatch;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod report;
pub mod scenario;
pub mod sinks;
pub mod store;
