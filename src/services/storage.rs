use s3::creds::Credentials;
use s3::{Bucket, Region};
use std::path::Path;

/// Client for the public artifact container (S3-compatible blob storage).
///
/// Keys are organized as `{folder}/{filename}` where the folder is the
/// couple's record id.
pub struct BlobStorage {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl BlobStorage {
    pub fn new(
        bucket_name: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        public_base_url: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint: endpoint.to_string(),
        };

        let credentials =
            Credentials::new(Some(access_key), Some(secret_key), None, None, None)
                .map_err(|e| StorageError::Config(e.to_string()))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upload bytes under `{folder}/{filename}` and return the public URL.
    pub async fn upload_bytes(
        &self,
        folder: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = format!("{}/{}", folder, filename);
        self.bucket
            .put_object_with_content_type(&key, data, content_type)
            .await
            .map_err(StorageError::S3)?;
        Ok(self.public_url(&key))
    }

    /// Upload a local file under `{folder}/{filename}` and return the
    /// public URL.
    pub async fn upload_file(
        &self,
        folder: &str,
        filename: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::Io(path.display().to_string(), e))?;
        self.upload_bytes(folder, filename, &data, content_type).await
    }

    /// Download object bytes by key.
    pub async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self.bucket.get_object(key).await.map_err(StorageError::S3)?;
        Ok(response.to_vec())
    }

    /// Delete an object by key.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.bucket.delete_object(key).await.map_err(StorageError::S3)?;
        Ok(())
    }

    /// Check bucket reachability (for health checks).
    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.bucket
            .list("health".to_string(), Some("/".to_string()))
            .await
            .map_err(StorageError::S3)?;
        Ok(())
    }

    /// Public URL for a stored key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Failed to read {0}: {1}")]
    Io(String, #[source] std::io::Error),
}
