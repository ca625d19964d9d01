use std::fmt;

/// Machine-readable error codes shared by every days error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FileOpenFailed,
    ReadFailed,
    WriteFailed,
    CapacityExceeded,
    InvalidField,
    UnsupportedDateLength,
    MalformedDate,
    InvalidRecord,
    InvalidKind,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::FileOpenFailed => "E1001",
            Self::ReadFailed => "E1002",
            Self::WriteFailed => "E1003",
            Self::CapacityExceeded => "E2001",
            Self::InvalidField => "E2002",
            Self::UnsupportedDateLength => "E3001",
            Self::MalformedDate => "E3002",
            Self::InvalidRecord => "E4001",
            Self::InvalidKind => "E4002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::FileOpenFailed => "Data file could not be opened",
            Self::ReadFailed => "Data file read failed",
            Self::WriteFailed => "Data file write failed",
            Self::CapacityExceeded => "Special day capacity exceeded",
            Self::InvalidField => "Invalid date or name field",
            Self::UnsupportedDateLength => "Unsupported date length",
            Self::MalformedDate => "Malformed date",
            Self::InvalidRecord => "Invalid record layout",
            Self::InvalidKind => "Invalid kind code",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::FileOpenFailed => {
                Some("Check that the current directory is writable and days.data is not a directory.")
            }
            Self::ReadFailed | Self::WriteFailed => Some("Check disk space and file permissions."),
            Self::CapacityExceeded => Some("At most 32 special days can be tracked."),
            Self::InvalidField => {
                Some("Dates are at most 20 bytes, names at most 36 bytes, without surrounding spaces.")
            }
            Self::UnsupportedDateLength | Self::MalformedDate => Some(
                "Use YYYY-MM-DD, optionally followed by HH, HH:MM or HH:MM:SS (e.g. 2018-11-30 16:27).",
            ),
            Self::InvalidRecord | Self::InvalidKind => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
