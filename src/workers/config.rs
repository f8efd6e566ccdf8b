use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    // Consumer pool configuration
    pub content_worker_thread_enabled: bool,
    pub content_worker_consumer_thread_count: usize,
    pub content_worker_batch_size: usize,
    pub worker_consumer_wait_interval: Duration,
    pub redelivery_backoff: Duration,

    // Redis configuration
    pub redis_url: String,
    pub content_job_queue: String,

    // Shutdown configuration
    pub graceful_shutdown_timeout: Duration,
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            content_worker_thread_enabled: env::var("CONTENT_WORKER_THREAD_ENABLED")
                .unwrap_or_else(|_| "false".to_string())
                .parse()?,

            content_worker_consumer_thread_count: env::var("CONTENT_WORKER_CONSUMER_THREAD_COUNT")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,

            content_worker_batch_size: env::var("CONTENT_WORKER_BATCH_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,

            worker_consumer_wait_interval: Duration::from_millis(
                env::var("CONTENT_WORKER_WAIT_INTERVAL_IN_MILLISECONDS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()?,
            ),

            redelivery_backoff: Duration::from_millis(
                env::var("CONTENT_WORKER_REDELIVERY_BACKOFF_IN_MILLISECONDS")
                    .unwrap_or_else(|_| "1000".to_string())
                    .parse()?,
            ),

            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            content_job_queue: env::var("CONTENT_JOB_QUEUE")
                .unwrap_or_else(|_| "content_job_queue".to_string()),

            graceful_shutdown_timeout: Duration::from_secs(
                env::var("WORKER_GRACEFUL_SHUTDOWN_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()?,
            ),
        })
    }
}
