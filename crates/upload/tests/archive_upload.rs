//! Archives built from a results tree land intact in the object store.

#![allow(clippy::unwrap_used)]

use buildpulse_upload::{ArchiveBuilder, MemoryStore, ObjectStore, bucket_name, new_object_key};
use flate2::read::GzDecoder;
use std::io::Read;
use tempfile::TempDir;

fn unpack(bytes: &[u8]) -> Vec<(String, Option<String>)> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let path = entry
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string();
            if entry.header().entry_type().is_dir() {
                return (path, None);
            }
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            (path, Some(contents))
        })
        .collect()
}

#[tokio::test]
async fn test_submission_layout_survives_upload() {
    let tmp = TempDir::new().unwrap();
    let report = tmp.path().join("report.xml");
    let coverage = tmp.path().join("lcov.info");
    std::fs::write(&report, "<testsuites/>").unwrap();
    std::fs::write(&coverage, "TN:\nend_of_record\n").unwrap();

    let mut builder = ArchiveBuilder::new();
    builder.add_bytes("buildpulse.yml", b":check: ci\n").unwrap();
    builder.add_bytes("buildpulse.log", b"INFO submit\n").unwrap();
    builder.add_file(&report, "test_results/unit/report.xml").unwrap();
    builder.add_file(&coverage, "coverage/lcov.info").unwrap();
    let archive = builder.finish().unwrap();

    let store = MemoryStore::new();
    let bucket = bucket_name(42);
    let key = new_object_key(7);
    store.put(&bucket, &key, archive).await.unwrap();

    let stored = store.get("42.buildpulse-uploads", &key).unwrap();
    assert_eq!(
        unpack(&stored),
        vec![
            ("buildpulse.yml".to_string(), Some(":check: ci\n".to_string())),
            ("buildpulse.log".to_string(), Some("INFO submit\n".to_string())),
            ("test_results".to_string(), None),
            ("test_results/unit".to_string(), None),
            (
                "test_results/unit/report.xml".to_string(),
                Some("<testsuites/>".to_string())
            ),
            ("coverage".to_string(), None),
            (
                "coverage/lcov.info".to_string(),
                Some("TN:\nend_of_record\n".to_string())
            ),
        ]
    );
}

#[test]
fn test_empty_archive_is_valid_gzip() {
    let archive = ArchiveBuilder::new().finish().unwrap();
    assert_eq!(&archive[..2], &[0x1f, 0x8b]);
    assert!(unpack(&archive).is_empty());
}
