//! `test-reporter version`

use buildpulse_metadata::Version;

/// Identity of this binary.
#[must_use]
pub fn current() -> Version {
    Version {
        number: format!("v{}", env!("CARGO_PKG_VERSION")),
        commit: env!("BUILDPULSE_COMMIT").to_string(),
        os: std::env::consts::OS.to_string(),
        toolchain: env!("BUILDPULSE_RUSTC_VERSION").to_string(),
    }
}

/// Text printed by the `version` subcommand.
#[must_use]
pub fn get_version_info() -> String {
    current().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = get_version_info();
        assert!(info.starts_with(&format!(
            "BuildPulse Test Reporter v{} ({} ",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        )));
        assert!(info.ends_with(')'));
    }
}
