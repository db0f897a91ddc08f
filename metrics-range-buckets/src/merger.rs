use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    accumulator::{accumulate, BucketKind},
    builder::{BucketMergerBuilder, Grouping, DEFAULT_BOUND_LABEL, DEFAULT_RANGE_LABEL},
    classify::{classify, Classification},
    emitter::Emitter,
    label::{LabelSet, LabelSetBuilder},
    range::ParsedRange,
    sample::{Sample, Vector},
};

/// Converts range buckets into cumulative buckets.
///
/// Range buckets each count the observations falling into their own, disjoint interval, which is
/// carried in a range label of the form `vmrange="<start>...<end>"`.  Cumulative buckets count
/// every observation less than or equal to their upper bound, carried in an `le` label, and are
/// what Prometheus-style `histogram_quantile` expects.
///
/// For each call to [`merge`](BucketMerger::merge):
///
/// - samples that already carry a bound label, but no range label, are copied to the output as-is
/// - samples carrying a range label are parsed, sorted by their upper bound and accumulated into a
///   running total, with one output sample per range, bridging samples in front of any gap between
///   ranges, and a final `le="+Inf"` sample
/// - anything else, including range labels that cannot be parsed, is silently dropped
///
/// Range buckets with a value of zero never produce a sample of their own.
///
/// By default, all range buckets passed to a single call are treated as one histogram, and it is up
/// to the caller to only pass the buckets of one histogram at a time.  Use
/// [`Grouping::ByIdentity`] to have the merger split them up by their remaining labels instead.
///
/// A merger holds no state between calls, so a single instance can be shared freely between
/// threads and used for any number of evaluations.
#[derive(Debug, Clone)]
pub struct BucketMerger {
    range_label: Arc<str>,
    bound_label: Arc<str>,
    grouping: Grouping,
}

impl BucketMerger {
    /// Creates a new `BucketMerger` using the default label names and grouping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`BucketMergerBuilder`] for configuring a merger.
    pub fn builder() -> BucketMergerBuilder {
        BucketMergerBuilder::new()
    }

    pub(crate) fn from_parts(
        range_label: Arc<str>,
        bound_label: Arc<str>,
        grouping: Grouping,
    ) -> Self {
        BucketMerger { range_label, bound_label, grouping }
    }

    /// Name of the label carrying a range bucket's interval.
    pub fn range_label(&self) -> &str {
        &self.range_label
    }

    /// Name of the label carrying a cumulative bucket's upper bound.
    pub fn bound_label(&self) -> &str {
        &self.bound_label
    }

    /// How range buckets are split into histograms.
    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    /// Merges the samples of a single evaluation timestamp, appending the results to `out`.
    ///
    /// Pass-through samples are appended first, in input order, followed by the generated
    /// cumulative buckets.  Entries already in `out` are left untouched.
    ///
    /// This never fails: samples that cannot be handled are dropped, and everything else in the
    /// same input is still processed.
    pub fn merge(&self, input: &[Sample], out: &mut Vector) {
        let mut emitter = Emitter::new(self.range_label.clone(), self.bound_label.clone(), out);

        let mut candidates = Vec::new();
        let mut unrecognized = 0usize;
        for sample in input {
            match classify(sample, &self.range_label, &self.bound_label) {
                Classification::Cumulative => emitter.passthrough(sample),
                Classification::Range(range) => candidates.push((range, sample)),
                Classification::Unrecognized => {
                    trace!(labels = %sample.labels, "Dropping sample without bucket labels.");
                    unrecognized += 1;
                }
            }
        }
        let passthrough = emitter.emitted();

        let mut unparsable = 0usize;
        let ranges = candidates
            .into_iter()
            .filter_map(|(range, sample)| match ParsedRange::parse(range, sample) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    trace!(error = %e, labels = %sample.labels, "Dropping range bucket.");
                    unparsable += 1;
                    None
                }
            })
            .collect::<Vec<_>>();
        let parsed = ranges.len();

        let histograms = match self.grouping {
            Grouping::Caller => vec![ranges],
            Grouping::ByIdentity => self.group_by_identity(ranges),
        };
        let mut bridges = 0usize;
        for histogram in histograms {
            for bucket in accumulate(histogram) {
                if bucket.kind == BucketKind::Bridge {
                    bridges += 1;
                }
                emitter.bucket(&bucket);
            }
        }

        debug!(
            input = input.len(),
            passthrough,
            parsed,
            unrecognized,
            unparsable,
            bridges,
            emitted = emitter.emitted(),
            "Merged range buckets."
        );
    }

    /// Merges the samples of a single evaluation timestamp into a new vector.
    pub fn merge_to_vec(&self, input: &[Sample]) -> Vector {
        let mut out = Vec::with_capacity(input.len() + 1);
        self.merge(input, &mut out);
        out
    }

    fn group_by_identity<'a>(&self, ranges: Vec<ParsedRange<'a>>) -> Vec<Vec<ParsedRange<'a>>> {
        let mut groups: IndexMap<LabelSet, Vec<ParsedRange<'a>>> = IndexMap::new();
        for range in ranges {
            let identity = LabelSetBuilder::new(&range.source.labels)
                .del(self.range_label.clone())
                .del(self.bound_label.clone())
                .build();
            groups.entry(identity).or_default().push(range);
        }
        groups.into_values().collect()
    }
}

impl Default for BucketMerger {
    fn default() -> Self {
        BucketMerger::from_parts(
            Arc::from(DEFAULT_RANGE_LABEL),
            Arc::from(DEFAULT_BOUND_LABEL),
            Grouping::default(),
        )
    }
}
