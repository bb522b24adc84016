use std::fmt;

/// The compatibility regime a client asks for.
///
/// Clients that build ZLS from source ask for [`Full`](Self::Full);
/// clients that download the pre-built binary only need
/// [`OnlyRuntime`](Self::OnlyRuntime). `none` is a CI verdict, never a
/// query, so it has no variant here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompatibilityMode {
    OnlyRuntime,
    Full,
}

impl CompatibilityMode {
    /// Parse the wire string. Returns `None` for anything else,
    /// including `none`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "only-runtime" => Some(Self::OnlyRuntime),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnlyRuntime => "only-runtime",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
