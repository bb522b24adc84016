use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// How a (ZLS build, Zig version) pair behaved in CI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compatibility {
    /// The pair is incompatible.
    None,
    /// ZLS could not be built from source with that Zig, but the
    /// pre-built binary runs against it.
    OnlyRuntime,
    /// ZLS could be built with that Zig and ran against it.
    Full,
}

impl Compatibility {
    /// Wire string, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OnlyRuntime => "only-runtime",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compatibility {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "only-runtime" => Ok(Self::OnlyRuntime),
            "full" => Ok(Self::Full),
            _ => Err(TypeError::UnknownCompatibility(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_roundtrip() {
        for compat in [
            Compatibility::None,
            Compatibility::OnlyRuntime,
            Compatibility::Full,
        ] {
            assert_eq!(compat.as_str().parse::<Compatibility>().unwrap(), compat);
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Compatibility::OnlyRuntime).unwrap(),
            "\"only-runtime\""
        );
        let parsed: Compatibility = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(parsed, Compatibility::Full);
    }

    #[test]
    fn unknown_string_is_rejected() {
        let err = "sometimes".parse::<Compatibility>().unwrap_err();
        assert!(matches!(err, TypeError::UnknownCompatibility(_)));
    }
}
