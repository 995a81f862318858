use crate::application::register_item::RegisterItemUseCase;
use crate::domain::entities::catalog_record::CatalogRecord;
use crate::domain::entities::run_report::RunReport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// Registers records one at a time. A failing record is logged and recorded
/// in the report; the loop always moves on to the next one.
pub struct BatchRunUseCase {
    register: Arc<RegisterItemUseCase>,
    pacing: Duration,
}

impl BatchRunUseCase {
    pub fn new(register: Arc<RegisterItemUseCase>, pacing: Duration) -> Self {
        Self { register, pacing }
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    pub async fn execute(&self, records: &[CatalogRecord]) -> RunReport {
        let mut report = RunReport::start();
        let total = records.len();

        for (i, record) in records.iter().enumerate() {
            match self.register.execute(record).await {
                Ok(()) => {
                    info!(image_name = %record.image_name, progress = i + 1, total, "Registered");
                    report.record_success();

                    // Throttle against the index's rate limit; nothing to wait for after the last item.
                    if i + 1 < total && !self.pacing.is_zero() {
                        tokio::time::sleep(self.pacing).await;
                    }
                }
                Err(e) => {
                    warn!(
                        image_name = %record.image_name,
                        image_path = %record.image_path,
                        kind = e.kind(),
                        error = %e,
                        "Registration failed"
                    );
                    report.record_failure(&record.image_name, &e);
                }
            }
        }

        report.finish()
    }
}
