//! Turns parsed range buckets into cumulative ("less than or equal") buckets.

use ordered_float::OrderedFloat;
use tracing::trace;

use crate::{range::ParsedRange, sample::Sample};

/// Bound used for the terminal bucket that closes out a histogram.
pub const INF_BOUND: &str = "+Inf";

/// Why a cumulative bucket was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BucketKind {
    /// Flattens a gap before a range into a plateau at the previous running total.
    Bridge,

    /// Closes a range at its upper bound.
    Range,

    /// Closes the whole histogram at `+Inf`.
    Terminal,
}

/// A cumulative bucket ready to be turned into an output sample.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CumulativeBucket<'a> {
    pub kind: BucketKind,
    pub bound: &'a str,
    pub value: f64,
    pub source: &'a Sample,
}

/// Right edge and running total of the last accumulated range.
#[derive(Debug, Clone, Copy)]
struct RunningState<'a> {
    last_end: f64,
    last_text: &'a str,
    last_value: f64,
    last_source: &'a Sample,
}

#[derive(Debug)]
enum State<'a> {
    Idle,
    Accumulating(RunningState<'a>),
}

/// Accumulates range buckets, in ascending order of their upper bound, into cumulative buckets.
///
/// Starts out idle, with a running total of zero.  Every range with a non-zero value moves the
/// right edge to its own upper bound and adds its value to the running total.  When a range does
/// not start where the previous one ended, a bridge bucket at the previous running total is
/// emitted at its start.  Ranges with a value of exactly zero are skipped entirely, and so end up
/// folded into a bridge in front of the next non-empty range.
///
/// Calling [`finish`](Accumulator::finish) closes the accumulator, which consumes it.
#[derive(Debug)]
pub(crate) struct Accumulator<'a> {
    state: State<'a>,
    buckets: Vec<CumulativeBucket<'a>>,
}

impl<'a> Accumulator<'a> {
    pub fn new() -> Self {
        Accumulator { state: State::Idle, buckets: Vec::new() }
    }

    fn last_value(&self) -> f64 {
        match &self.state {
            State::Idle => 0.0,
            State::Accumulating(running) => running.last_value,
        }
    }

    /// Accumulates a single range.
    ///
    /// Ranges must be pushed in ascending order of their upper bound.
    pub fn push(&mut self, range: &ParsedRange<'a>) {
        if range.value() == 0.0 {
            trace!(
                start = range.bounds.start_text,
                end = range.bounds.end_text,
                "Skipping empty range bucket."
            );
            return;
        }

        // Only a gap after an accumulated range is bridged; before that the running total is zero,
        // and a bucket at zero below the first non-empty range carries no information.
        if let State::Accumulating(running) = &self.state {
            if range.start() != running.last_end {
                self.buckets.push(CumulativeBucket {
                    kind: BucketKind::Bridge,
                    bound: range.bounds.start_text,
                    value: running.last_value,
                    source: range.source,
                });
            }
        }

        let value = self.last_value() + range.value();
        self.buckets.push(CumulativeBucket {
            kind: BucketKind::Range,
            bound: range.bounds.end_text,
            value,
            source: range.source,
        });

        self.state = State::Accumulating(RunningState {
            last_end: range.end(),
            last_text: range.bounds.end_text,
            last_value: value,
            last_source: range.source,
        });
    }

    /// Closes the histogram, returning every cumulative bucket generated.
    ///
    /// A terminal `+Inf` bucket is added unless the last range already extended to positive
    /// infinity, or the running total is zero.
    pub fn finish(mut self) -> Vec<CumulativeBucket<'a>> {
        if let State::Accumulating(running) = self.state {
            if running.last_end != f64::INFINITY && running.last_value != 0.0 {
                self.buckets.push(CumulativeBucket {
                    kind: BucketKind::Terminal,
                    bound: INF_BOUND,
                    value: running.last_value,
                    source: running.last_source,
                });
            } else {
                trace!(
                    last_bound = running.last_text,
                    "Histogram already closed, no terminal bucket."
                );
            }
        }

        self.buckets
    }
}

/// Sorts the given ranges by their upper bound and accumulates them as a single histogram.
///
/// Ranges with the same upper bound keep their relative input order.
pub(crate) fn accumulate<'a>(mut ranges: Vec<ParsedRange<'a>>) -> Vec<CumulativeBucket<'a>> {
    ranges.sort_by_key(|range| OrderedFloat(range.end()));

    let mut accumulator = Accumulator::new();
    for range in &ranges {
        accumulator.push(range);
    }
    accumulator.finish()
}

#[cfg(test)]
mod tests {
    use super::{accumulate, BucketKind, CumulativeBucket};
    use crate::{range::ParsedRange, LabelSet, Sample};

    fn samples(ranges: &[(&str, f64)]) -> Vec<Sample> {
        ranges
            .iter()
            .enumerate()
            .map(|(idx, (range, value))| {
                let labels = LabelSet::from_labels([
                    ("vmrange", range.to_string()),
                    ("idx", idx.to_string()),
                ]);
                Sample::new(labels, 1_000, *value)
            })
            .collect()
    }

    fn parse(samples: &[Sample]) -> Vec<ParsedRange<'_>> {
        samples
            .iter()
            .map(|s| {
                let range = s.labels.get("vmrange").expect("range label should be present");
                ParsedRange::parse(range, s).expect("range should parse")
            })
            .collect()
    }

    fn flatten<'a>(buckets: &[CumulativeBucket<'a>]) -> Vec<(BucketKind, &'a str, f64)> {
        buckets.iter().map(|b| (b.kind, b.bound, b.value)).collect()
    }

    #[test]
    fn test_contiguous_ranges() {
        let input = samples(&[("0...1", 1.0), ("1...2", 2.0), ("2...4", 3.0)]);
        let buckets = accumulate(parse(&input));

        assert_eq!(
            flatten(&buckets),
            vec![
                (BucketKind::Range, "1", 1.0),
                (BucketKind::Range, "2", 3.0),
                (BucketKind::Range, "4", 6.0),
                (BucketKind::Terminal, "+Inf", 6.0),
            ]
        );
    }

    #[test]
    fn test_gap_is_bridged() {
        let input = samples(&[("0...1", 5.0), ("2...3", 7.0)]);
        let buckets = accumulate(parse(&input));

        assert_eq!(
            flatten(&buckets),
            vec![
                (BucketKind::Range, "1", 5.0),
                (BucketKind::Bridge, "2", 5.0),
                (BucketKind::Range, "3", 12.0),
                (BucketKind::Terminal, "+Inf", 12.0),
            ]
        );

        // Bridges take their labels from the range that follows the gap.
        assert_eq!(buckets[1].source.labels.get("idx"), Some("1"));
        assert_eq!(buckets[3].source.labels.get("idx"), Some("1"));
    }

    #[test]
    fn test_leading_gap_is_not_bridged() {
        let input = samples(&[("1...2", 4.0)]);
        let buckets = accumulate(parse(&input));

        assert_eq!(
            flatten(&buckets),
            vec![(BucketKind::Range, "2", 4.0), (BucketKind::Terminal, "+Inf", 4.0)]
        );
    }

    #[test]
    fn test_zero_buckets_are_skipped() {
        let input = samples(&[("0...1", 0.0), ("1...2", 4.0)]);
        let buckets = accumulate(parse(&input));

        assert_eq!(
            flatten(&buckets),
            vec![(BucketKind::Range, "2", 4.0), (BucketKind::Terminal, "+Inf", 4.0)]
        );
    }

    #[test]
    fn test_zero_bucket_between_non_zero_buckets() {
        let input = samples(&[("0...1", 2.0), ("1...2", 0.0), ("2...3", 3.0)]);
        let buckets = accumulate(parse(&input));

        assert_eq!(
            flatten(&buckets),
            vec![
                (BucketKind::Range, "1", 2.0),
                (BucketKind::Bridge, "2", 2.0),
                (BucketKind::Range, "3", 5.0),
                (BucketKind::Terminal, "+Inf", 5.0),
            ]
        );
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_end() {
        let input = samples(&[("2...4", 3.0), ("0...1", 1.0), ("1...2", 2.0)]);
        let buckets = accumulate(parse(&input));

        let bounds = buckets.iter().map(|b| b.bound).collect::<Vec<_>>();
        assert_eq!(bounds, vec!["1", "2", "4", "+Inf"]);
    }

    #[test]
    fn test_infinite_last_range_has_no_terminal() {
        let input = samples(&[("0...1", 1.0), ("1...+Inf", 2.0)]);
        let buckets = accumulate(parse(&input));

        assert_eq!(
            flatten(&buckets),
            vec![(BucketKind::Range, "1", 1.0), (BucketKind::Range, "+Inf", 3.0)]
        );
    }

    #[test]
    fn test_all_zero_or_empty_input_produces_nothing() {
        assert!(accumulate(Vec::new()).is_empty());

        let input = samples(&[("0...1", 0.0), ("1...2", 0.0)]);
        assert!(accumulate(parse(&input)).is_empty());
    }

    #[test]
    fn test_zero_running_total_has_no_terminal() {
        let input = samples(&[("0...1", 2.0), ("1...2", -2.0)]);
        let buckets = accumulate(parse(&input));

        assert_eq!(
            flatten(&buckets),
            vec![(BucketKind::Range, "1", 2.0), (BucketKind::Range, "2", 0.0)]
        );
        assert!(buckets.iter().all(|b| b.kind != BucketKind::Terminal));
    }

    #[test]
    fn test_equal_ends_keep_input_order() {
        let input = samples(&[("1...2", 1.0), ("0...2", 2.0)]);
        let buckets = accumulate(parse(&input));

        let order = buckets
            .iter()
            .filter(|b| b.kind == BucketKind::Range)
            .map(|b| b.source.labels.get("idx"))
            .collect::<Vec<_>>();
        assert_eq!(order, vec![Some("0"), Some("1")]);
    }
}
