use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{info, warn};

use crate::workers::{JobMessage, WorkerResult};

/// Publish side of the job queue, kept behind a trait so the upload service
/// can be exercised against an in-memory fake.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn publish(&self, job: &JobMessage) -> WorkerResult<()>;
}

/// Redis-list backed job queue. Messages are raw JSON bodies; `LPUSH` on
/// publish and `BRPOP` on consume give FIFO delivery.
#[derive(Clone)]
pub struct RedisQueue {
    connection_manager: ConnectionManager,
    queue_name: String,
}

impl RedisQueue {
    pub async fn new(redis_url: &str, queue_name: String) -> WorkerResult<Self> {
        let client = Client::open(redis_url)?;
        let connection_manager = ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            queue_name,
        })
    }

    async fn push_body(&self, body: String) -> WorkerResult<()> {
        let mut conn = self.connection_manager.clone();
        conn.lpush::<_, _, ()>(&self.queue_name, body).await?;
        Ok(())
    }

    /// Pop up to `max` raw message bodies: one blocking pop bounded by
    /// `wait`, then a non-blocking drain of whatever else is ready.
    pub async fn dequeue_batch(&self, max: usize, wait: Duration) -> WorkerResult<Vec<String>> {
        let mut conn = self.connection_manager.clone();

        let first: Option<(String, String)> = conn
            .brpop(&self.queue_name, wait.as_secs_f64())
            .await?;

        let Some((_, body)) = first else {
            // Timeout reached, nothing queued
            return Ok(Vec::new());
        };

        let mut bodies = vec![body];
        if let Some(count) = NonZeroUsize::new(max.saturating_sub(1)) {
            let rest: Vec<String> = conn.rpop(&self.queue_name, Some(count)).await?;
            bodies.extend(rest);
        }

        Ok(bodies)
    }

    /// Push raw bodies back onto the queue so a later invocation sees the
    /// whole batch again.
    pub async fn redeliver(&self, bodies: &[String]) -> WorkerResult<()> {
        let mut conn = self.connection_manager.clone();
        for body in bodies {
            conn.lpush::<_, _, ()>(&self.queue_name, body).await?;
        }

        warn!(
            "Redelivered {} message(s) to {}",
            bodies.len(),
            self.queue_name
        );
        Ok(())
    }

    pub async fn queue_length(&self) -> WorkerResult<u64> {
        let mut conn = self.connection_manager.clone();
        let length: u64 = conn.llen(&self.queue_name).await?;
        Ok(length)
    }
}

#[async_trait]
impl JobQueue for RedisQueue {
    async fn publish(&self, job: &JobMessage) -> WorkerResult<()> {
        let body = job.to_json()?;
        self.push_body(body).await?;

        info!("Job for {} enqueued to {}", job.file_key, self.queue_name);
        Ok(())
    }
}
