pub mod batch;
pub mod config;
pub mod content_worker;
pub mod error;
pub mod job;
pub mod main_worker;
pub mod metrics;
pub mod processor;
pub mod queue;

pub use batch::{BatchStatus, QueueRecord, RecordOutcome, SkipReason};
pub use config::WorkerConfig;
pub use content_worker::ContentWorker;
pub use error::{WorkerError, WorkerResult};
pub use job::{JobMessage, TASK_GENERATE_BLOG_POST, UNKNOWN_FILE_KEY};
pub use metrics::WorkerMetrics;
pub use processor::{JobProcessor, SimulatedContentGenerator};
pub use queue::{JobQueue, RedisQueue};
