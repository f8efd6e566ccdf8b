use crate::workers::{
    ContentWorker, JobProcessor, WorkerConfig, WorkerError, WorkerMetrics, WorkerResult,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::time::timeout;
use tracing::{error, info};

/// MainWorker coordinates the consumer pool lifecycle
pub struct MainWorker {
    config: WorkerConfig,
    processor: Arc<dyn JobProcessor>,
    shutdown_signal: Arc<AtomicBool>,
    metrics: Arc<WorkerMetrics>,
    content_worker: Option<ContentWorker>,
}

impl MainWorker {
    pub fn new(config: WorkerConfig, processor: Arc<dyn JobProcessor>) -> Self {
        let shutdown_signal = Arc::new(AtomicBool::new(false));
        let metrics = Arc::new(WorkerMetrics::new());

        Self {
            config,
            processor,
            shutdown_signal,
            metrics,
            content_worker: None,
        }
    }

    /// Start the consumer pool if it is enabled in the configuration
    pub async fn start(&mut self) -> WorkerResult<()> {
        info!("Starting Content Worker System");

        // Periodic metrics dump
        let metrics_clone = self.metrics.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(300)).await;
                metrics_clone.log_metrics();
            }
        });

        if self.config.content_worker_thread_enabled {
            info!(
                "Initializing consumer pool with {} threads",
                self.config.content_worker_consumer_thread_count
            );

            let content_worker = ContentWorker::new(
                self.config.clone(),
                self.processor.clone(),
                self.shutdown_signal.clone(),
                self.metrics.clone(),
            );

            content_worker.start().await?;
            self.content_worker = Some(content_worker);

            info!("Consumer pool started successfully");
        } else {
            info!("Consumer pool is disabled");
        }

        info!("Content Worker System initialization complete");
        Ok(())
    }

    /// Signal all consumers to stop pulling new batches
    pub fn signal_shutdown(&self) {
        info!("Signaling shutdown to consumer pool");
        self.shutdown_signal.store(true, Ordering::SeqCst);
    }

    /// Wait for consumers to finish in-flight batches and shut down gracefully
    pub async fn await_shutdown(&self) -> WorkerResult<()> {
        let grace_period = self.config.graceful_shutdown_timeout;

        info!(
            "Waiting up to {:?} for workers to shutdown gracefully",
            grace_period
        );

        match timeout(grace_period, async {
            // Consumers observe the flag between batches; one polling interval
            // is enough for them to drain
            tokio::time::sleep(self.config.worker_consumer_wait_interval).await;
            Ok(())
        })
        .await
        {
            Ok(Ok(())) => {
                info!("Consumer pool shutdown gracefully");
                self.metrics.log_metrics();
                Ok(())
            }
            Ok(Err(e)) => {
                error!("Error during worker shutdown: {}", e);
                Err(e)
            }
            Err(_) => {
                error!("Worker shutdown timed out after {:?}", grace_period);
                Err(WorkerError::Shutdown)
            }
        }
    }

    pub fn metrics(&self) -> Arc<WorkerMetrics> {
        self.metrics.clone()
    }
}
