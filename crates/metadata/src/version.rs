//! Identity of the running reporter build.

use std::fmt;

/// Describes the reporter binary that produced a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Version {
    /// Release number, e.g. `v0.27.0`.
    pub number: String,
    /// Source commit the binary was built from.
    pub commit: String,
    /// Operating system the binary targets.
    pub os: String,
    /// Compiler that produced the binary.
    pub toolchain: String,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BuildPulse Test Reporter {} ({} {} {})",
            self.number, self.os, self.commit, self.toolchain
        )
    }
}
