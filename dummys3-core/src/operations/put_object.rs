use crate::{BucketStore, ObjectStore, Result, StorageObject, UploadPayload};
use std::sync::Arc;

#[derive(Clone)]
pub struct PutObjectOperation {
    bucket_store: Arc<BucketStore>,
    object_store: Arc<ObjectStore>,
}

#[derive(Debug, Clone)]
pub struct PutObjectOperationRequest {
    pub bucket: String,
    pub key: String,
    pub payload: UploadPayload,
}

impl PutObjectOperation {
    pub fn new(bucket_store: Arc<BucketStore>, object_store: Arc<ObjectStore>) -> Self {
        Self {
            bucket_store,
            object_store,
        }
    }

    pub async fn run(&self, request: PutObjectOperationRequest) -> Result<StorageObject> {
        let PutObjectOperationRequest {
            bucket,
            key,
            payload,
        } = request;

        let bucket = self.bucket_store.get(&bucket).await?;
        self.object_store.put(&bucket, &key, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    #[tokio::test]
    async fn test_put_into_missing_bucket() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        let operation = PutObjectOperation::new(
            Arc::new(BucketStore::new(root.clone())),
            Arc::new(ObjectStore::new(root.clone())),
        );

        let upload = temp_dir.path().join("upload");
        std::fs::write(&upload, b"data").unwrap();
        let request = PutObjectOperationRequest {
            bucket: "missing".to_string(),
            key: "k".to_string(),
            payload: UploadPayload {
                request_content_type: Some("multipart/form-data; boundary=b".to_string()),
                content_type: "text/plain".to_string(),
                temp_path: upload,
                header_names: Vec::new(),
            },
        };

        let result = operation.run(request).await;
        assert!(matches!(result, Err(StoreError::BucketNotFound(_))));
        assert!(!root.join("missing").exists());
    }
}
