use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// A record that could not be registered, and why.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationFailure {
    pub image_name: String,
    pub kind: &'static str,
    pub error: String,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<RegistrationFailure>,
}

impl RunReport {
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: now,
            finished_at: now,
            attempted: 0,
            succeeded: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, image_name: &str, error: &DomainError) {
        self.attempted += 1;
        self.failures.push(RegistrationFailure {
            image_name: image_name.to_string(),
            kind: error.kind(),
            error: error.to_string(),
        });
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.image_name.as_str()).collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self.finished_at - self.started_at;
        writeln!(
            f,
            "Run {}: {} attempted, {} succeeded, {} failed ({:.1}s)",
            self.run_id,
            self.attempted,
            self.succeeded,
            self.failed(),
            elapsed.num_milliseconds() as f64 / 1000.0
        )?;
        for failure in &self.failures {
            writeln!(f, "  {} [{}]: {}", failure.image_name, failure.kind, failure.error)?;
        }
        Ok(())
    }
}
