use async_trait::async_trait;
use tracing::info;

use crate::workers::{JobMessage, WorkerResult};

/// The content-generation step performed once per job. A real implementation
/// would call out to the generation backend; failures it returns are treated
/// as operational and bubble out of the batch so the message is redelivered.
#[async_trait]
pub trait JobProcessor: Send + Sync {
    async fn process(&self, job: &JobMessage) -> WorkerResult<()>;
}

/// Stand-in processor: logs the generation step and does no work.
pub struct SimulatedContentGenerator;

#[async_trait]
impl JobProcessor for SimulatedContentGenerator {
    async fn process(&self, job: &JobMessage) -> WorkerResult<()> {
        info!("[SIMULATION] Content generated for {}", job.file_key);
        Ok(())
    }
}
