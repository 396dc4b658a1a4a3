mod classify;
mod client;
mod retrigger;
mod types;

pub use classify::{classify, JobConsole, PatternConfig, RestartDecision};
pub use client::CiClient;
pub use retrigger::{console_url, run_retrigger, RetriggerOptions, RetriggerOutcome};
pub use types::{Job, JobStatus, Run};
