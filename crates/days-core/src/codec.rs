//! Fixed-width text records for the data file.
//!
//! Every [`SpecialDay`] is stored as one line of three right-justified
//! fields separated by single spaces:
//!
//! ```text
//! <date: 20 bytes> <name: 36 bytes> <kind code>\n
//! ```
//!
//! Widths are byte widths. The record stride is not stored anywhere; it is
//! measured once by encoding an empty reference entry (see [`RecordCodec::new`]).

use crate::error::ErrorCode;
use crate::model::day::{DATE_WIDTH, FieldError, Kind, NAME_WIDTH, SpecialDay};

const NAME_START: usize = DATE_WIDTH + 1;
const NAME_END: usize = NAME_START + NAME_WIDTH;
const KIND_START: usize = NAME_END + 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while decoding one record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("record is not valid UTF-8")]
    NotUtf8,

    #[error("record does not end with a newline")]
    MissingNewline,

    #[error("record is {len} bytes, too short for the fixed layout")]
    TooShort { len: usize },

    #[error("expected a field separator at byte {column}")]
    MissingSeparator { column: usize },

    #[error("kind code '{raw}' is not one of 0, 1, 2")]
    InvalidKind { raw: String },

    #[error(transparent)]
    Field(#[from] FieldError),
}

impl DecodeError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidKind { .. } => ErrorCode::InvalidKind,
            Self::Field(_) => ErrorCode::InvalidField,
            Self::NotUtf8
            | Self::MissingNewline
            | Self::TooShort { .. }
            | Self::MissingSeparator { .. } => ErrorCode::InvalidRecord,
        }
    }
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Record encoder/decoder carrying the reference stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCodec {
    stride: usize,
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCodec {
    /// Measure the stride by encoding the empty reference entry.
    #[must_use]
    pub fn new() -> Self {
        let stride = encode(&SpecialDay::reference()).len();
        tracing::debug!(stride, "reference record length");
        Self { stride }
    }

    /// Byte length of one record.
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Absolute byte offset of slot `index`.
    #[must_use]
    pub const fn offset(&self, index: usize) -> u64 {
        (index as u64) * (self.stride as u64)
    }

    /// Encode a day into exactly one stride of text.
    #[must_use]
    pub fn encode(&self, day: &SpecialDay) -> String {
        let record = encode(day);
        debug_assert_eq!(record.len(), self.stride);
        record
    }

    /// Decode one record.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode(&self, record: &[u8]) -> Result<SpecialDay, DecodeError> {
        decode(record)
    }
}

/// Encode a day as a newline-terminated fixed-width line.
#[must_use]
pub fn encode(day: &SpecialDay) -> String {
    let mut line = String::with_capacity(KIND_START + 2);
    push_right_justified(&mut line, day.date(), DATE_WIDTH);
    line.push(' ');
    push_right_justified(&mut line, day.name(), NAME_WIDTH);
    line.push(' ');
    line.push(char::from(b'0' + day.kind().code()));
    line.push('\n');
    line
}

/// Decode a newline-terminated fixed-width line.
///
/// The date, name and kind code are cut at their fixed columns and stripped of
/// padding, so dates carrying an hour part keep their inner space.
///
/// # Errors
///
/// Returns [`DecodeError`] if the bytes are not UTF-8, the layout does not
/// match, the kind code is outside `0..=2`, or a field fails validation.
pub fn decode(record: &[u8]) -> Result<SpecialDay, DecodeError> {
    let text = std::str::from_utf8(record).map_err(|_| DecodeError::NotUtf8)?;
    let body = text.strip_suffix('\n').ok_or(DecodeError::MissingNewline)?;

    if body.len() <= KIND_START {
        return Err(DecodeError::TooShort { len: record.len() });
    }
    for column in [DATE_WIDTH, NAME_END] {
        if body.as_bytes()[column] != b' ' {
            return Err(DecodeError::MissingSeparator { column });
        }
    }

    // Separators are ASCII, so every cut below lands on a char boundary.
    let field = |start: usize, end: usize| {
        body.get(start..end)
            .map(str::trim)
            .ok_or(DecodeError::MissingSeparator { column: end })
    };
    let date = field(0, DATE_WIDTH)?;
    let name = field(NAME_START, NAME_END)?;
    let raw_kind = field(KIND_START, body.len())?;

    // Exactly one digit; `u8::from_str` would also take "+1" or "01".
    let kind = match raw_kind.as_bytes() {
        [digit @ b'0'..=b'9'] => Kind::from_code(digit - b'0'),
        _ => None,
    }
    .ok_or_else(|| DecodeError::InvalidKind {
        raw: raw_kind.to_string(),
    })?;

    Ok(SpecialDay::new(date, name, kind)?)
}

fn push_right_justified(out: &mut String, value: &str, width: usize) {
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(value.len())));
    out.push_str(value);
}
