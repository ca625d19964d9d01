use crate::error::ErrorCode;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// Maximum byte length of the date field.
pub const DATE_WIDTH: usize = 20;

/// Maximum byte length of the name field.
pub const NAME_WIDTH: usize = 36;

/// The three kinds of special day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Birth,
    Memo,
    Countdown,
}

impl Kind {
    /// Every kind, in code order.
    pub const ALL: [Self; 3] = [Self::Birth, Self::Memo, Self::Countdown];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Birth => "birth",
            Self::Memo => "memo",
            Self::Countdown => "countdown",
        }
    }

    /// Integer code written to the data file.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Birth => 0,
            Self::Memo => 1,
            Self::Countdown => 2,
        }
    }

    /// Map a persisted code back to a kind. Codes outside `0..=2` are rejected.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Birth),
            1 => Some(Self::Memo),
            2 => Some(Self::Countdown),
            _ => None,
        }
    }

    /// Presentation label shown in tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Birth => "birthday",
            Self::Memo => "anniversary",
            Self::Countdown => "countdown",
        }
    }

    /// The kind after this one, wrapping around.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Birth => Self::Memo,
            Self::Memo => Self::Countdown,
            Self::Countdown => Self::Birth,
        }
    }

    /// The kind before this one, wrapping around.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Birth => Self::Countdown,
            Self::Memo => Self::Birth,
            Self::Countdown => Self::Memo,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "birth" | "birthday" | "0" => Ok(Self::Birth),
            "memo" | "anniversary" | "1" => Ok(Self::Memo),
            "countdown" | "2" => Ok(Self::Countdown),
            _ => Err(ParseEnumError {
                expected: "kind (birth, memo, countdown)",
                got: s.to_string(),
            }),
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

/// Which text field a [`FieldError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Name,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Date => "date",
            Self::Name => "name",
        })
    }
}

/// A date or name that cannot be stored in a fixed-width slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{field} is {len} bytes, at most {max} fit in a record")]
    TooLong { field: Field, len: usize, max: usize },

    #[error("{field} contains a control character")]
    ControlCharacter { field: Field },

    #[error("{field} has leading or trailing whitespace")]
    Padded { field: Field },
}

impl FieldError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidField
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// One tracked day.
///
/// Both text fields are checked on construction so that every value can be
/// written to a slot and read back unchanged. The date is not required to
/// parse: an unparseable date is kept and reported with the sentinel count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecialDay {
    date: String,
    name: String,
    kind: Kind,
}

impl SpecialDay {
    /// Build a day from its three fields.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] if either text field is wider than its column,
    /// contains a control character, or starts or ends with whitespace.
    pub fn new(
        date: impl Into<String>,
        name: impl Into<String>,
        kind: Kind,
    ) -> Result<Self, FieldError> {
        let date = date.into();
        let name = name.into();
        check_field(Field::Date, &date, DATE_WIDTH)?;
        check_field(Field::Name, &name, NAME_WIDTH)?;
        Ok(Self { date, name, kind })
    }

    /// The empty reference entry used to measure the record stride.
    #[must_use]
    pub const fn reference() -> Self {
        Self {
            date: String::new(),
            name: String::new(),
            kind: Kind::Birth,
        }
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }
}

fn check_field(field: Field, value: &str, max: usize) -> Result<(), FieldError> {
    if value.len() > max {
        return Err(FieldError::TooLong {
            field,
            len: value.len(),
            max,
        });
    }
    if value.chars().any(char::is_control) {
        return Err(FieldError::ControlCharacter { field });
    }
    if value.trim() != value {
        return Err(FieldError::Padded { field });
    }
    Ok(())
}
