pub mod config;
pub mod handlers;
pub mod job;

pub use config::{JobConfig, OutputFormat, RunArgs, ServeArgs};
pub use handlers::{AppState, router};
pub use job::{JobSummary, SUCCESS_MARKER, part_name, run_job};
