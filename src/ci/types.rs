use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One execution of the CI pipeline for a given commit. Fetched read-only
/// from the CI service; never mutated locally.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub id: String,
    pub run_number: u64,
    pub total_tests: u64,
    /// None while the run is still in flight
    pub ended_at: Option<DateTime<Utc>>,
    pub commit_sha: String,
}

/// One unit of work within a run
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Failed,
    Timeout,
    Unstable,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Wire form used in the `status=` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Failed => "failed",
            Self::Timeout => "timeout",
            Self::Unstable => "unstable",
            Self::Succeeded => "succeeded",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_deserializes_camel_case() {
        let run: Run = serde_json::from_str(
            r#"{
                "id": "run1",
                "runNumber": 7,
                "totalTests": 100,
                "endedAt": "2020-05-01T10:00:00.000Z",
                "commitSha": "abc123"
            }"#,
        )
        .unwrap();

        assert_eq!(run.run_number, 7);
        assert_eq!(run.total_tests, 100);
        assert!(run.ended_at.is_some());
        assert_eq!(run.commit_sha, "abc123");
    }

    #[test]
    fn test_run_ended_at_null_while_running() {
        let run: Run = serde_json::from_str(
            r#"{
                "id": "run1",
                "runNumber": 8,
                "totalTests": 0,
                "endedAt": null,
                "commitSha": "abc123"
            }"#,
        )
        .unwrap();

        assert!(run.ended_at.is_none());
    }

    #[test]
    fn test_job_status_known_values() {
        let job: Job = serde_json::from_str(r#"{"id": "j1", "status": "timeout"}"#).unwrap();

        assert_eq!(job.status, JobStatus::Timeout);
        assert_eq!(job.status.as_str(), "timeout");
    }

    #[test]
    fn test_job_status_unrecognized_value_maps_to_unknown() {
        let job: Job = serde_json::from_str(r#"{"id": "j1", "status": "queued"}"#).unwrap();

        assert_eq!(job.status, JobStatus::Unknown);
    }
}
