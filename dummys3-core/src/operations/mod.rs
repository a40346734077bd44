pub mod delete_object;
pub mod list_objects;
pub mod put_object;
pub mod read_object;

pub use delete_object::{DeleteObjectOperation, DeleteObjectOperationRequest};
pub use list_objects::{
    ListObjectsOperation, ListObjectsOperationRequest, ListObjectsOperationResult,
};
pub use put_object::{PutObjectOperation, PutObjectOperationRequest};
pub use read_object::{
    ReadObjectOperation, ReadObjectOperationOutcome, ReadObjectOperationRequest,
    ReadObjectOperationResult,
};
