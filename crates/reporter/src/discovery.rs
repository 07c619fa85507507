//! Locating test result and coverage files on disk.
//!
//! Inputs are plain paths or glob patterns. Directories are walked
//! recursively; only directory walks apply the file filter, so an explicit
//! file or a glob match is always taken as given.

use crate::cli::CliError;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A file found on disk and where it goes inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    /// Location on disk.
    pub source: PathBuf,
    /// Path relative to the archive section it belongs to.
    pub relative: PathBuf,
}

/// Whether `input` should be expanded as a glob rather than read as a path.
#[must_use]
pub fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// Whether `path` has an `.xml` extension, ignoring case.
#[must_use]
pub fn is_xml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

/// Find test result files: XML reports under directories, plus explicit
/// files and glob matches.
///
/// # Errors
///
/// Returns an error if an input is unreadable or an invalid pattern, or if
/// nothing at all is found.
pub fn test_results(inputs: &[String]) -> Result<Vec<Discovered>, CliError> {
    let found = discover(inputs, is_xml)?;
    if found.is_empty() {
        return Err(CliError::config_with_help(
            format!("no test result files found in: {}", inputs.join(", ")),
            "Point the reporter at a directory containing XML reports or a glob matching them",
        ));
    }
    Ok(found)
}

/// Find coverage files: everything under directories, plus explicit files
/// and glob matches.
///
/// # Errors
///
/// Returns an error if an input is unreadable or an invalid pattern.
pub fn coverage_files(inputs: &[String]) -> Result<Vec<Discovered>, CliError> {
    discover(inputs, |_| true)
}

fn discover(inputs: &[String], accept: fn(&Path) -> bool) -> Result<Vec<Discovered>, CliError> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for input in inputs {
        let matches = if is_pattern(input) {
            expand_pattern(input)?
        } else {
            expand_path(Path::new(input), accept)?
        };
        for item in matches {
            if seen.insert(item.source.clone()) {
                found.push(item);
            }
        }
    }

    debug!(count = found.len(), inputs = ?inputs, "Discovered files");
    Ok(found)
}

fn expand_path(path: &Path, accept: fn(&Path) -> bool) -> Result<Vec<Discovered>, CliError> {
    if path.is_file() {
        let relative = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| normalize(path));
        return Ok(vec![Discovered {
            source: path.to_path_buf(),
            relative,
        }]);
    }
    if !path.is_dir() {
        return Err(CliError::config(format!(
            "path does not exist: {}",
            path.display()
        )));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            CliError::other(format!("failed to read {}: {e}", path.display()))
        })?;
        if !entry.file_type().is_file() || !accept(entry.path()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(path)
            .map_or_else(|_| normalize(entry.path()), Path::to_path_buf);
        found.push(Discovered {
            source: entry.path().to_path_buf(),
            relative,
        });
    }
    Ok(found)
}

fn expand_pattern(pattern: &str) -> Result<Vec<Discovered>, CliError> {
    let paths = glob::glob(pattern).map_err(|e| {
        CliError::config(format!("invalid glob pattern \"{pattern}\": {e}"))
    })?;

    let mut found = Vec::new();
    for path in paths {
        let path = path.map_err(|e| CliError::other(format!("failed to read {pattern}: {e}")))?;
        if path.is_file() {
            found.push(Discovered {
                relative: normalize(&path),
                source: path,
            });
        }
    }
    Ok(found)
}

/// Keep only the normal components of `path`, so it nests safely.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "<testsuite/>").unwrap();
        path
    }

    fn relatives(found: &[Discovered]) -> Vec<String> {
        found
            .iter()
            .map(|d| d.relative.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_directory_walk_keeps_xml_only() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xml");
        touch(tmp.path(), "nested/b.XML");
        touch(tmp.path(), "nested/notes.txt");
        touch(tmp.path(), "nested/deeper/c.xml");

        let found = test_results(&[tmp.path().display().to_string()]).unwrap();
        assert_eq!(
            relatives(&found),
            vec!["a.xml", "nested/b.XML", "nested/deeper/c.xml"]
        );
    }

    #[test]
    fn test_explicit_file_taken_as_given() {
        let tmp = TempDir::new().unwrap();
        let file = touch(tmp.path(), "results.json");

        let found = test_results(&[file.display().to_string()]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, file);
        assert_eq!(found[0].relative, PathBuf::from("results.json"));
    }

    #[test]
    fn test_glob_pattern() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "one/report.xml");
        touch(tmp.path(), "two/report.xml");
        touch(tmp.path(), "two/other.txt");

        let pattern = format!("{}/*/report.xml", tmp.path().display());
        let found = test_results(&[pattern]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.relative.is_relative()));
        assert!(found.iter().all(|d| d.relative.ends_with("report.xml")));
    }

    #[test]
    fn test_duplicates_collapsed() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xml");
        let dir = tmp.path().display().to_string();
        let pattern = format!("{dir}/*.xml");

        let found = test_results(&[dir, pattern]).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_no_results_is_error() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "notes.txt");
        let err = test_results(&[tmp.path().display().to_string()]).unwrap_err();
        assert!(err.to_string().starts_with("no test result files found"));
    }

    #[test]
    fn test_missing_path_is_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing").display().to_string();
        let err = test_results(&[missing]).unwrap_err();
        assert!(err.to_string().starts_with("path does not exist"));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = coverage_files(&["[".to_string()]).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_coverage_accepts_any_file() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "lcov.info");
        touch(tmp.path(), "html/index.html");

        let found = coverage_files(&[tmp.path().display().to_string()]).unwrap();
        assert_eq!(relatives(&found), vec!["html/index.html", "lcov.info"]);
    }

    #[test]
    fn test_empty_coverage_is_fine() {
        assert!(coverage_files(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_drops_root_and_dots() {
        assert_eq!(
            normalize(Path::new("/tmp/./reports/../x.xml")),
            PathBuf::from("tmp/reports/x.xml")
        );
    }
}
