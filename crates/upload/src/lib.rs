//! Packaging and delivery of test results.
//!
//! - [`archive`] - in-memory `.tar.gz` assembly
//! - [`key`] - bucket and object key naming
//! - [`store`] - the [`ObjectStore`] seam with S3 and in-memory backends

pub mod archive;
pub mod error;
pub mod key;
pub mod store;

pub use archive::ArchiveBuilder;
pub use error::{Error, Result};
pub use key::{REGION, bucket_name, new_object_key, object_key};
pub use store::{Credentials, MemoryStore, ObjectStore, S3Store};
