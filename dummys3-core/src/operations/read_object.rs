use crate::{BucketStore, ObjectStore, Result, StorageObject, StoreError};
use bytes::Bytes;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReadObjectOperation {
    bucket_store: Arc<BucketStore>,
    object_store: Arc<ObjectStore>,
}

#[derive(Debug, Clone)]
pub struct ReadObjectOperationRequest {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct ReadObjectOperationResult {
    pub object: StorageObject,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub enum ReadObjectOperationOutcome {
    Found(ReadObjectOperationResult),
    NotFound,
}

impl ReadObjectOperation {
    pub fn new(bucket_store: Arc<BucketStore>, object_store: Arc<ObjectStore>) -> Self {
        Self {
            bucket_store,
            object_store,
        }
    }

    /// A missing bucket is an error; a missing key is a `NotFound` outcome.
    pub async fn run(
        &self,
        request: ReadObjectOperationRequest,
    ) -> Result<ReadObjectOperationOutcome> {
        let ReadObjectOperationRequest { bucket, key } = request;

        let bucket = self.bucket_store.get(&bucket).await?;
        match self.object_store.get(&bucket, &key).await {
            Ok((object, body)) => Ok(ReadObjectOperationOutcome::Found(
                ReadObjectOperationResult { object, body },
            )),
            Err(StoreError::ObjectNotFound { .. }) => Ok(ReadObjectOperationOutcome::NotFound),
            Err(error) => Err(error),
        }
    }
}
