use crate::{BucketStore, ObjectStore, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct DeleteObjectOperation {
    bucket_store: Arc<BucketStore>,
    object_store: Arc<ObjectStore>,
}

#[derive(Debug, Clone)]
pub struct DeleteObjectOperationRequest {
    pub bucket: String,
    pub key: String,
}

impl DeleteObjectOperation {
    pub fn new(bucket_store: Arc<BucketStore>, object_store: Arc<ObjectStore>) -> Self {
        Self {
            bucket_store,
            object_store,
        }
    }

    pub async fn run(&self, request: DeleteObjectOperationRequest) -> Result<()> {
        let DeleteObjectOperationRequest { bucket, key } = request;

        let bucket = self.bucket_store.get(&bucket).await?;
        self.object_store.delete(&bucket, &key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    #[tokio::test]
    async fn test_delete_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        let buckets = Arc::new(BucketStore::new(root.clone()));
        let objects = Arc::new(ObjectStore::new(root));
        let operation = DeleteObjectOperation::new(buckets.clone(), objects);

        let result = operation
            .run(DeleteObjectOperationRequest {
                bucket: "x".to_string(),
                key: "k".to_string(),
            })
            .await;
        assert!(matches!(result, Err(StoreError::BucketNotFound(_))));

        buckets.create("x").await.unwrap();
        let result = operation
            .run(DeleteObjectOperationRequest {
                bucket: "x".to_string(),
                key: "k".to_string(),
            })
            .await;
        assert!(matches!(result, Err(StoreError::ObjectNotFound { .. })));
    }
}
