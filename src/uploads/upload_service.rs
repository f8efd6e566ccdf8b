use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info};

use crate::{
    commons::{
        metrics_service::MetricsService,
        object_store::{ObjectStore, ObjectStoreError},
    },
    uploads::dto::UploadResponse,
    workers::{JobMessage, JobQueue, WorkerError},
};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Object store write failed: {0}")]
    Store(#[from] ObjectStoreError),

    #[error("Queue publish failed: {0}")]
    Publish(#[from] WorkerError),
}

/// Accepts an uploaded file, stores the blob under its original filename and
/// publishes exactly one job message referencing it.
///
/// The two side effects are independent external calls with no compensation:
/// a blob whose publish fails stays behind with no corresponding job.
pub struct UploadService {
    object_store: Arc<dyn ObjectStore>,
    job_queue: Arc<dyn JobQueue>,
    metrics: MetricsService,
}

impl UploadService {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        job_queue: Arc<dyn JobQueue>,
        metrics: MetricsService,
    ) -> Self {
        Self {
            object_store,
            job_queue,
            metrics,
        }
    }

    pub async fn upload(
        &self,
        file_key: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<UploadResponse, UploadError> {
        let start = std::time::Instant::now();
        let mut tags = HashMap::new();
        tags.insert("endpoint".to_string(), "upload".to_string());

        if let Err(e) = self
            .object_store
            .put_object(file_key, content, content_type)
            .await
        {
            self.metrics.increment("upload_error", Some(tags.clone()));
            error!("Failed to store {}: {}", file_key, e);
            return Err(e.into());
        }

        let job = JobMessage::new(file_key);
        if let Err(e) = self.job_queue.publish(&job).await {
            self.metrics.increment("upload_error", Some(tags.clone()));
            error!("Stored {} but failed to publish its job: {}", file_key, e);
            return Err(e.into());
        }

        self.metrics.increment("upload_success", Some(tags.clone()));
        self.metrics
            .timing("upload_duration", start.elapsed().as_millis() as f64, Some(tags));

        info!("File {} uploaded and queued", file_key);

        Ok(UploadResponse {
            message: "File uploaded and queued".to_string(),
            file: file_key.to_string(),
            queue_status: "Message sent to job queue".to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::commons::object_store::{ObjectStore, ObjectStoreError, ObjectStoreResult};
    use crate::workers::{JobMessage, JobQueue, WorkerError, WorkerResult};

    use super::MetricsService;

    pub fn test_metrics() -> MetricsService {
        MetricsService::new("127.0.0.1", 8125, "test")
    }

    #[derive(Default)]
    pub struct FakeObjectStore {
        pub objects: Mutex<HashMap<String, Vec<u8>>>,
        pub fail: bool,
    }

    #[async_trait]
    impl ObjectStore for FakeObjectStore {
        async fn put_object(
            &self,
            key: &str,
            content: Vec<u8>,
            _content_type: Option<&str>,
        ) -> ObjectStoreResult<()> {
            if self.fail {
                return Err(ObjectStoreError::Backend("connection refused".to_string()));
            }
            self.objects.lock().unwrap().insert(key.to_string(), content);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct FakeJobQueue {
        pub published: Mutex<Vec<JobMessage>>,
        pub fail: bool,
    }

    #[async_trait]
    impl JobQueue for FakeJobQueue {
        async fn publish(&self, job: &JobMessage) -> WorkerResult<()> {
            if self.fail {
                return Err(WorkerError::Processing("queue unavailable".to_string()));
            }
            self.published.lock().unwrap().push(job.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::test_support::{test_metrics, FakeJobQueue, FakeObjectStore};
    use super::*;
    use crate::workers::TASK_GENERATE_BLOG_POST;

    fn make_service(store: Arc<FakeObjectStore>, queue: Arc<FakeJobQueue>) -> UploadService {
        UploadService::new(store, queue, test_metrics())
    }

    #[tokio::test]
    async fn upload_stores_blob_and_publishes_exactly_one_job() {
        let store = Arc::new(FakeObjectStore::default());
        let queue = Arc::new(FakeJobQueue::default());
        let service = make_service(store.clone(), queue.clone());

        let response = service
            .upload("report.pdf", b"content".to_vec(), Some("application/pdf"))
            .await
            .unwrap();

        assert_eq!(response.file, "report.pdf");
        assert_eq!(store.objects.lock().unwrap().len(), 1);

        let published = queue.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].file_key, "report.pdf");
        assert_eq!(published[0].task, TASK_GENERATE_BLOG_POST);
    }

    #[tokio::test]
    async fn reupload_overwrites_blob_and_publishes_a_second_job() {
        let store = Arc::new(FakeObjectStore::default());
        let queue = Arc::new(FakeJobQueue::default());
        let service = make_service(store.clone(), queue.clone());

        service
            .upload("report.pdf", b"first".to_vec(), None)
            .await
            .unwrap();
        service
            .upload("report.pdf", b"second".to_vec(), None)
            .await
            .unwrap();

        let objects = store.objects.lock().unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects["report.pdf"], b"second".to_vec());
        assert_eq!(queue.published.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn store_failure_publishes_nothing() {
        let store = Arc::new(FakeObjectStore {
            fail: true,
            ..Default::default()
        });
        let queue = Arc::new(FakeJobQueue::default());
        let service = make_service(store, queue.clone());

        let result = service.upload("report.pdf", b"content".to_vec(), None).await;
        assert!(matches!(result, Err(UploadError::Store(_))));
        assert!(queue.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_leaves_the_blob_behind() {
        let store = Arc::new(FakeObjectStore::default());
        let queue = Arc::new(FakeJobQueue {
            fail: true,
            ..Default::default()
        });
        let service = make_service(store.clone(), queue);

        let result = service.upload("report.pdf", b"content".to_vec(), None).await;
        assert!(matches!(result, Err(UploadError::Publish(_))));

        // Orphan blob with no corresponding job: accepted gap, no compensation
        assert!(store.objects.lock().unwrap().contains_key("report.pdf"));
    }
}
