use crate::sample::Sample;

/// How a single input sample is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Classification<'a> {
    /// Already a cumulative bucket: copied to the output unchanged.
    Cumulative,

    /// A range bucket, carrying the raw value of its range label.
    Range(&'a str),

    /// Neither kind of bucket: dropped.
    Unrecognized,
}

/// Classifies a sample based on which of the two bucket labels it carries.
///
/// The range label takes precedence: a sample carrying both labels is treated as a range bucket.
pub(crate) fn classify<'a>(
    sample: &'a Sample,
    range_label: &str,
    bound_label: &str,
) -> Classification<'a> {
    match sample.labels.get(range_label) {
        Some(range) => Classification::Range(range),
        None if sample.labels.contains(bound_label) => Classification::Cumulative,
        None => Classification::Unrecognized,
    }
}
