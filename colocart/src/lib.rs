pub mod cli;
pub mod output;
pub mod s3;

pub use cli::{report_error, run, Cli, Commands};
