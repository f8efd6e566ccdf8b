use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("Object store request failed: {0}")]
    Backend(String),
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// Write-by-key blob storage. Same key overwrites; no collision handling.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> ObjectStoreResult<()>;
}

/// S3-compatible object store client (MinIO in local setups), configured with
/// static credentials and path-style addressing.
#[derive(Clone)]
pub struct ObjectStoreService {
    client: Client,
    bucket: String,
}

impl ObjectStoreService {
    pub async fn new(
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        region: &str,
    ) -> ObjectStoreResult<Self> {
        let credentials = Credentials::new(access_key, secret_key, None, None, "static");

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(config);

        // Fail fast when the bucket is unreachable or missing
        client
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(format!("{}", DisplayErrorContext(&e))))?;

        info!("Object store ready, bucket: {}", bucket);

        Ok(Self {
            client,
            bucket: bucket.to_string(),
        })
    }
}

#[async_trait]
impl ObjectStore for ObjectStoreService {
    async fn put_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> ObjectStoreResult<()> {
        let size = content.len();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content));

        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(format!("{}", DisplayErrorContext(&e))))?;

        debug!("Stored {} ({} bytes) in {}", key, size, self.bucket);
        Ok(())
    }
}
