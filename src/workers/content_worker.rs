use crate::workers::{
    batch::{handle_batch, QueueRecord},
    JobProcessor, RedisQueue, WorkerConfig, WorkerMetrics, WorkerResult,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

/// ContentWorker consumes job batches from the Redis queue and runs them
/// through the content-generation processor
pub struct ContentWorker {
    config: WorkerConfig,
    processor: Arc<dyn JobProcessor>,
    shutdown_signal: Arc<AtomicBool>,
    metrics: Arc<WorkerMetrics>,
}

impl ContentWorker {
    pub fn new(
        config: WorkerConfig,
        processor: Arc<dyn JobProcessor>,
        shutdown_signal: Arc<AtomicBool>,
        metrics: Arc<WorkerMetrics>,
    ) -> Self {
        Self {
            config,
            processor,
            shutdown_signal,
            metrics,
        }
    }

    /// Start the consumer pool with the configured number of threads
    pub async fn start(&self) -> WorkerResult<()> {
        info!(
            "Starting ContentWorker with {} threads",
            self.config.content_worker_consumer_thread_count
        );

        let (tx, mut rx) = mpsc::channel(100);

        for i in 0..self.config.content_worker_consumer_thread_count {
            let worker_id = format!("worker-{}", i);
            let thread_config = self.config.clone();
            let thread_processor = self.processor.clone();
            let thread_shutdown = self.shutdown_signal.clone();
            let thread_tx = tx.clone();
            let thread_metrics = self.metrics.clone();

            tokio::spawn(async move {
                let result = Self::run_consumer(
                    worker_id,
                    thread_config,
                    thread_processor,
                    thread_shutdown,
                    thread_tx,
                    thread_metrics,
                )
                .await;

                if let Err(e) = result {
                    error!("Worker thread exited with error: {}", e);
                }
            });
        }

        // Drop the original sender so the channel can close when all senders are done
        drop(tx);

        tokio::spawn(async move {
            let mut completed_count = 0;
            while let Some(worker_id) = rx.recv().await {
                info!("Worker {} completed graceful shutdown", worker_id);
                completed_count += 1;
            }

            info!(
                "All {} worker threads completed graceful shutdown",
                completed_count
            );
        });

        Ok(())
    }

    #[instrument(skip(config, processor, shutdown_signal, completion_tx, metrics), fields(worker_id = %worker_id))]
    async fn run_consumer(
        worker_id: String,
        config: WorkerConfig,
        processor: Arc<dyn JobProcessor>,
        shutdown_signal: Arc<AtomicBool>,
        completion_tx: mpsc::Sender<String>,
        metrics: Arc<WorkerMetrics>,
    ) -> WorkerResult<()> {
        info!("Worker thread started");

        let queue = RedisQueue::new(&config.redis_url, config.content_job_queue.clone()).await?;

        // Periodically update the queue depth gauge
        let metrics_clone = metrics.clone();
        let queue_clone = queue.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(depth) = queue_clone.queue_length().await {
                    metrics_clone.update_queue_depth(depth);
                }
                sleep(std::time::Duration::from_secs(60)).await;
            }
        });

        loop {
            if shutdown_signal.load(Ordering::Relaxed) {
                info!("Shutdown signal received, stopping worker");
                break;
            }

            let batch_result = queue
                .dequeue_batch(
                    config.content_worker_batch_size,
                    config.worker_consumer_wait_interval,
                )
                .await;

            match batch_result {
                Ok(bodies) if bodies.is_empty() => {
                    debug!("No messages available, waiting for next batch");
                }
                Ok(bodies) => {
                    if let Err(e) =
                        Self::process_batch(&queue, &config, bodies, processor.as_ref(), &metrics)
                            .await
                    {
                        error!("Error processing batch: {}", e);
                    }
                }
                Err(e) => {
                    error!("Error dequeuing batch: {}", e);

                    // Brief delay before retrying to prevent tight loops on persistent errors
                    sleep(std::time::Duration::from_millis(1000)).await;
                }
            }
        }

        if let Err(e) = completion_tx.send(worker_id.clone()).await {
            error!("Failed to signal worker completion: {}", e);
        }

        info!("Worker thread exiting");
        Ok(())
    }

    /// Run one popped batch through the dispatch core. A propagated
    /// operational error pushes the whole batch back for a later invocation;
    /// acknowledged batches are simply not re-pushed.
    #[instrument(skip_all, fields(batch_size = bodies.len()))]
    async fn process_batch(
        queue: &RedisQueue,
        config: &WorkerConfig,
        bodies: Vec<String>,
        processor: &dyn JobProcessor,
        metrics: &WorkerMetrics,
    ) -> WorkerResult<()> {
        let start_time = Instant::now();
        let _timer = metrics.start_timer();
        metrics.record_batch_received();

        let records: Vec<QueueRecord> = bodies.iter().cloned().map(QueueRecord::from).collect();

        match handle_batch(&records, processor, metrics).await {
            Ok(status) => {
                info!(
                    "Batch of {} completed with status {:?} in {:?}",
                    records.len(),
                    status.status,
                    start_time.elapsed()
                );
                metrics.record_batch_succeeded();
                Ok(())
            }
            Err(e) => {
                error!("Batch failed, requesting redelivery: {}", e);
                metrics.record_batch_redelivered();
                queue.redeliver(&bodies).await?;

                sleep(config.redelivery_backoff).await;
                Err(e)
            }
        }
    }
}
