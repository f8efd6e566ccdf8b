use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::workers::{JobMessage, JobProcessor, WorkerMetrics, WorkerResult};

/// One raw queue record as delivered to a worker invocation. The body is
/// opaque until this module interprets it.
#[derive(Debug, Clone)]
pub struct QueueRecord {
    pub body: String,
}

impl From<String> for QueueRecord {
    fn from(body: String) -> Self {
        Self { body }
    }
}

/// Why a record was acknowledged without being processed. Skipped records are
/// never redelivered: an empty or undecodable body will not get better on a
/// second attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EmptyBody,
    InvalidJson,
}

/// Disposition of a single record. `Err` from [`handle_record`] is the third
/// case: an operational failure that must be redelivered, not acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Processed { file_key: String },
    Skipped(SkipReason),
}

/// Wire shape returned by a completed worker invocation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchStatus {
    pub status: String,
}

impl BatchStatus {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Interpret one record body.
///
/// Empty bodies and undecodable JSON are acknowledged as skipped so they do
/// not loop forever as poison messages. Errors from the processor propagate
/// to the caller untouched.
pub async fn handle_record(
    record: &QueueRecord,
    processor: &dyn JobProcessor,
) -> WorkerResult<RecordOutcome> {
    if record.body.is_empty() {
        warn!("Skipping empty message");
        return Ok(RecordOutcome::Skipped(SkipReason::EmptyBody));
    }

    let job = match JobMessage::from_json(&record.body) {
        Ok(job) => job,
        Err(e) => {
            error!("Skipping invalid JSON message {:?}: {}", record.body, e);
            return Ok(RecordOutcome::Skipped(SkipReason::InvalidJson));
        }
    };

    info!("Processing file from object store: {}", job.file_key);
    processor.process(&job).await?;

    Ok(RecordOutcome::Processed {
        file_key: job.file_key,
    })
}

/// Run one batch through the processor, sequentially.
///
/// A skipped record never blocks its siblings. An operational error aborts
/// the remaining records and propagates so the delivery mechanism redelivers
/// the whole batch later.
pub async fn handle_batch(
    records: &[QueueRecord],
    processor: &dyn JobProcessor,
    metrics: &WorkerMetrics,
) -> WorkerResult<BatchStatus> {
    info!("Worker started processing batch of {}", records.len());

    for record in records {
        match handle_record(record, processor).await? {
            RecordOutcome::Processed { .. } => metrics.record_record_processed(),
            RecordOutcome::Skipped(SkipReason::EmptyBody) => metrics.record_record_skipped_empty(),
            RecordOutcome::Skipped(SkipReason::InvalidJson) => {
                metrics.record_record_discarded_invalid()
            }
        }
    }

    Ok(BatchStatus::success())
}
