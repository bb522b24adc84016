use zver_types::Version;

/// Typed selection failure, part of the wire contract: clients branch on
/// the numeric code, not the HTTP status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureCode {
    /// The Zig version predates even the oldest known support floor.
    Unsupported = 0,
    /// No ZLS builds exist for this release cycle yet.
    DevelopmentBuildUnsupported = 1,
    /// Builds exist, but none is compatible with this exact Zig nightly.
    DevelopmentBuildIncompatible = 2,
    /// ZLS for this tagged Zig minor has not been released.
    TaggedReleaseIncompatible = 3,
}

impl FailureCode {
    /// The numeric wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The user-visible message for this failure and the queried Zig
    /// version.
    pub fn message(self, zig_version: &Version) -> String {
        match self {
            Self::Unsupported => {
                format!("Zig {zig_version} is not supported by ZLS")
            }
            Self::DevelopmentBuildUnsupported => format!(
                "No builds for the {}.{} release cycle are currently available",
                zig_version.major, zig_version.minor
            ),
            Self::DevelopmentBuildIncompatible => {
                format!("Zig {zig_version} has no compatible ZLS build (yet)")
            }
            Self::TaggedReleaseIncompatible => format!(
                "ZLS {}.{} has not been released yet",
                zig_version.major, zig_version.minor
            ),
        }
    }
}
