use crate::{BucketStore, ListObjectsOptions, ObjectStore, Result, StorageObject};
use std::sync::Arc;

#[derive(Clone)]
pub struct ListObjectsOperation {
    bucket_store: Arc<BucketStore>,
    object_store: Arc<ObjectStore>,
}

#[derive(Debug, Clone)]
pub struct ListObjectsOperationRequest {
    pub bucket: String,
    pub prefix: Option<String>,
    pub max_keys: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ListObjectsOperationResult {
    pub bucket: String,
    pub prefix: Option<String>,
    pub objects: Vec<StorageObject>,
    pub is_truncated: bool,
}

impl ListObjectsOperation {
    pub fn new(bucket_store: Arc<BucketStore>, object_store: Arc<ObjectStore>) -> Self {
        Self {
            bucket_store,
            object_store,
        }
    }

    pub async fn run(
        &self,
        request: ListObjectsOperationRequest,
    ) -> Result<ListObjectsOperationResult> {
        let ListObjectsOperationRequest {
            bucket,
            prefix,
            max_keys,
        } = request;

        let bucket = self.bucket_store.get(&bucket).await?;
        let options = ListObjectsOptions {
            prefix: prefix.clone(),
        };
        let mut objects = self.object_store.list(&bucket, &options).await?;

        let is_truncated = match max_keys {
            Some(limit) if objects.len() > limit => {
                objects.truncate(limit);
                true
            }
            _ => false,
        };

        Ok(ListObjectsOperationResult {
            bucket: bucket.name,
            prefix,
            objects,
            is_truncated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StoreError, UploadPayload};

    #[tokio::test]
    async fn test_list_truncates_to_max_keys() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("root");
        std::fs::create_dir_all(&root).unwrap();
        let buckets = Arc::new(BucketStore::new(root.clone()));
        let objects = Arc::new(ObjectStore::new(root));
        let operation = ListObjectsOperation::new(buckets.clone(), objects.clone());

        let bucket = buckets.create("x").await.unwrap();
        let upload = temp_dir.path().join("upload");
        std::fs::write(&upload, b"-").unwrap();
        let payload = UploadPayload {
            request_content_type: Some("multipart/form-data; boundary=b".to_string()),
            content_type: "text/plain".to_string(),
            temp_path: upload,
            header_names: Vec::new(),
        };
        for key in ["c", "a", "b"] {
            objects.put(&bucket, key, &payload).await.unwrap();
        }

        let result = operation
            .run(ListObjectsOperationRequest {
                bucket: "x".to_string(),
                prefix: None,
                max_keys: Some(2),
            })
            .await
            .unwrap();
        let keys: Vec<&str> = result.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(result.is_truncated);

        let result = operation
            .run(ListObjectsOperationRequest {
                bucket: "x".to_string(),
                prefix: None,
                max_keys: Some(3),
            })
            .await
            .unwrap();
        assert_eq!(result.objects.len(), 3);
        assert!(!result.is_truncated);

        let result = operation
            .run(ListObjectsOperationRequest {
                bucket: "y".to_string(),
                prefix: None,
                max_keys: None,
            })
            .await;
        assert!(matches!(result, Err(StoreError::BucketNotFound(_))));
    }
}
