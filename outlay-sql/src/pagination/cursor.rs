//! Cursor encoding/decoding for pagination.

use std::fmt;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use serde::{Deserialize, Serialize};

/// Maximum allowed cursor size in bytes (4KB).
/// This prevents DoS attacks via oversized cursor payloads.
const MAX_CURSOR_SIZE: usize = 4 * 1024;

/// Standard alphabet, padding optional.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// URL-safe alphabet, padding optional.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A single sortable value as it is written into a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorValue {
    /// Text value (timestamps, dates, ids).
    Text(String),
    /// Integer value, stringified before encoding.
    Int(i64),
}

impl fmt::Display for CursorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for CursorValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for CursorValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for CursorValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

/// Encode a single value: integers are stringified, then the UTF-8 bytes
/// are base64-encoded (standard alphabet, padded).
///
/// ```
/// use outlay_sql::{decode_value, encode_value};
///
/// let token = encode_value(1500);
/// assert_eq!(decode_value(&token).unwrap(), "1500");
/// ```
#[must_use]
pub fn encode_value(value: impl Into<CursorValue>) -> String {
    STANDARD.encode(value.into().to_string())
}

/// Decode a cursor token back to its UTF-8 payload text.
///
/// Accepts the standard and URL-safe alphabets, with or without padding.
/// The payload is not interpreted; callers coerce it to the type their sort
/// field needs.
pub fn decode_value(cursor: &str) -> Result<String, CursorError> {
    if cursor.len() > MAX_CURSOR_SIZE {
        return Err(CursorError::TooLarge);
    }
    let bytes = LENIENT_STANDARD
        .decode(cursor)
        .or_else(|_| LENIENT_URL_SAFE.decode(cursor))
        .map_err(|_| CursorError::InvalidBase64)?;
    String::from_utf8(bytes).map_err(|_| CursorError::InvalidUtf8)
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TuplePayload {
    v: String,
    id: String,
}

/// A position in an ordered result set.
///
/// Carries the sort-field value of the last item seen and, when produced by
/// this crate, the item's id as a tie-breaker. Cursors holding only a value
/// are what older clients round-trip; they decode with `id == None`.
///
/// # Security Note
///
/// Cursors use plain base64, **not encryption**. Do not put anything in a
/// cursor that the client may not read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "cursor must be encoded with .encode() or turned into a keyset bound"]
pub struct Cursor {
    /// Text form of the sort-field value.
    pub value: String,
    /// Id of the item the cursor points at, if known.
    pub id: Option<String>,
}

impl Cursor {
    /// Cursor holding only a sort value.
    pub fn new(value: impl Into<CursorValue>) -> Self {
        Self {
            value: value.into().to_string(),
            id: None,
        }
    }

    /// Attach the tie-breaking id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Encode to a transport-safe token.
    ///
    /// Value-only cursors encode exactly like [`encode_value`]; cursors with
    /// an id encode a small JSON object.
    #[must_use]
    pub fn encode(&self) -> String {
        match &self.id {
            None => encode_value(self.value.as_str()),
            Some(id) => {
                let payload = TuplePayload {
                    v: self.value.clone(),
                    id: id.clone(),
                };
                // Serializing two strings cannot fail
                let json = serde_json::to_string(&payload).unwrap_or_default();
                STANDARD.encode(json)
            },
        }
    }

    /// Decode a token produced by [`Cursor::encode`] or [`encode_value`].
    ///
    /// A payload starting with `{` is always read as a tuple, so a
    /// value-only cursor whose text starts with `{` does not decode.
    /// Timestamps, integers and dates never do.
    pub fn decode(encoded: &str) -> Result<Self, CursorError> {
        let text = decode_value(encoded)?;
        if text.starts_with('{') {
            let payload: TuplePayload =
                serde_json::from_str(&text).map_err(|_| CursorError::InvalidFormat)?;
            return Ok(Self {
                value: payload.v,
                id: Some(payload.id),
            });
        }
        Ok(Self {
            value: text,
            id: None,
        })
    }
}

/// Errors that can occur when parsing a cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CursorError {
    /// The base64 encoding is invalid.
    #[error("invalid base64 encoding in cursor")]
    InvalidBase64,
    /// The decoded bytes are not UTF-8.
    #[error("cursor payload is not valid UTF-8")]
    InvalidUtf8,
    /// The payload looks like a tuple cursor but is malformed.
    #[error("invalid cursor format")]
    InvalidFormat,
    /// The cursor exceeds the maximum allowed size.
    #[error("cursor exceeds maximum size ({}KB limit)", MAX_CURSOR_SIZE / 1024)]
    TooLarge,
}
