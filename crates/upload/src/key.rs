//! Naming of upload destinations.

use uuid::Uuid;

/// AWS region hosting the upload buckets.
pub const REGION: &str = "us-east-2";

/// Bucket receiving uploads for `account_id`.
#[must_use]
pub fn bucket_name(account_id: u64) -> String {
    format!("{account_id}.buildpulse-uploads")
}

/// Object key for one upload under `repository_id`.
#[must_use]
pub fn object_key(repository_id: u64, upload_id: Uuid) -> String {
    format!("{repository_id}/buildpulse-{upload_id}.gz")
}

/// Object key with a freshly generated upload ID.
#[must_use]
pub fn new_object_key(repository_id: u64) -> String {
    object_key(repository_id, Uuid::new_v4())
}
