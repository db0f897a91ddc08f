use std::num::ParseFloatError;

use thiserror::Error;

use crate::sample::Sample;

/// Delimiter between the two endpoints of a range label, as in `vmrange="0.5...1.0"`.
pub const RANGE_DELIMITER: &str = "...";

/// Reasons a range label could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeParseError {
    /// The label value did not contain the range delimiter.
    #[error("missing `...` delimiter in range `{0}`")]
    MissingDelimiter(String),

    /// The start of the range was not a valid floating-point number.
    #[error("invalid range start `{text}`: {source}")]
    InvalidStart {
        /// Raw text of the start endpoint.
        text: String,
        /// Underlying parse failure.
        source: ParseFloatError,
    },

    /// The end of the range was not a valid floating-point number.
    #[error("invalid range end `{text}`: {source}")]
    InvalidEnd {
        /// Raw text of the end endpoint.
        text: String,
        /// Underlying parse failure.
        source: ParseFloatError,
    },
}

/// The two endpoints of a range label.
///
/// Both the raw text and the numeric value of each endpoint are kept: the numbers drive ordering
/// and gap detection, while the text is written back out verbatim as the `le` of the resulting
/// cumulative bucket, so that no precision is lost to float formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBounds<'a> {
    /// Raw text of the start endpoint.
    pub start_text: &'a str,

    /// Raw text of the end endpoint.
    pub end_text: &'a str,

    /// Numeric start endpoint.
    pub start: f64,

    /// Numeric end endpoint.
    pub end: f64,
}

/// Parses a range label value of the form `<start>...<end>`.
///
/// The value is split on the first occurrence of the delimiter, and both halves are parsed as
/// floating-point numbers using the standard Rust grammar, which is locale-independent and accepts
/// `inf`, `+Inf` and `-Inf`.
///
/// # Errors
///
/// If the delimiter is missing, or either endpoint is not a valid number, an error is returned
/// describing which part was invalid.
pub fn parse_range(range: &str) -> Result<RangeBounds<'_>, RangeParseError> {
    let (start_text, end_text) = range
        .split_once(RANGE_DELIMITER)
        .ok_or_else(|| RangeParseError::MissingDelimiter(range.to_string()))?;

    let start = start_text
        .parse::<f64>()
        .map_err(|source| RangeParseError::InvalidStart { text: start_text.to_string(), source })?;
    let end = end_text
        .parse::<f64>()
        .map_err(|source| RangeParseError::InvalidEnd { text: end_text.to_string(), source })?;

    Ok(RangeBounds { start_text, end_text, start, end })
}

/// A range bucket whose label has been successfully parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRange<'a> {
    /// Parsed endpoints of the range.
    pub bounds: RangeBounds<'a>,

    /// The sample the range was parsed from.
    pub source: &'a Sample,
}

impl<'a> ParsedRange<'a> {
    /// Parses the given range label value, attaching it to the sample it came from.
    ///
    /// # Errors
    ///
    /// See [`parse_range`].
    pub fn parse(range: &'a str, source: &'a Sample) -> Result<ParsedRange<'a>, RangeParseError> {
        parse_range(range).map(|bounds| ParsedRange { bounds, source })
    }

    /// Numeric start endpoint.
    pub fn start(&self) -> f64 {
        self.bounds.start
    }

    /// Numeric end endpoint.
    pub fn end(&self) -> f64 {
        self.bounds.end
    }

    /// Value of the source sample.
    pub fn value(&self) -> f64 {
        self.source.value
    }
}
