use std::sync::Arc;

use crate::{
    accumulator::CumulativeBucket,
    label::LabelSetBuilder,
    sample::{Sample, Vector},
};

/// Appends output samples to a caller-supplied vector.
///
/// Every sample written gets a freshly built label set, derived from, but never sharing storage
/// with, the labels of the sample it came from.  Existing entries in the output are never read,
/// reordered or removed.
pub(crate) struct Emitter<'o> {
    range_label: Arc<str>,
    bound_label: Arc<str>,
    out: &'o mut Vector,
    emitted: usize,
}

impl<'o> Emitter<'o> {
    pub fn new(range_label: Arc<str>, bound_label: Arc<str>, out: &'o mut Vector) -> Self {
        Emitter { range_label, bound_label, out, emitted: 0 }
    }

    /// Copies an already-cumulative sample to the output unchanged.
    pub fn passthrough(&mut self, sample: &Sample) {
        let labels = LabelSetBuilder::new(&sample.labels).build();
        self.push(Sample::new(labels, sample.timestamp, sample.value));
    }

    /// Writes a cumulative bucket, replacing the range label of its source with the bound label.
    pub fn bucket(&mut self, bucket: &CumulativeBucket<'_>) {
        let labels = LabelSetBuilder::new(&bucket.source.labels)
            .del(self.range_label.clone())
            .set(self.bound_label.clone(), bucket.bound)
            .build();
        self.push(Sample::new(labels, bucket.source.timestamp, bucket.value));
    }

    fn push(&mut self, sample: Sample) {
        self.out.push(sample);
        self.emitted += 1;
    }

    /// Number of samples written so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::Emitter;
    use crate::{
        accumulator::{BucketKind, CumulativeBucket},
        LabelSet, Sample,
    };

    #[test]
    fn test_passthrough_copies_labels() {
        let source = Sample::new(LabelSet::from_labels([("le", "1"), ("job", "a")]), 10, 3.0);
        let existing = Sample::new(LabelSet::from_labels([("x", "y")]), 0, 0.0);
        let mut out = vec![existing.clone()];

        let mut emitter = Emitter::new("vmrange".into(), "le".into(), &mut out);
        emitter.passthrough(&source);
        assert_eq!(emitter.emitted(), 1);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], existing);
        assert_eq!(out[1], source);
        assert!(!out[1].labels.ptr_eq(&source.labels));
    }

    #[test]
    fn test_bucket_rewrites_labels() {
        let source = Sample::new(
            LabelSet::from_labels([("__name__", "foo_bucket"), ("vmrange", "1...2"), ("job", "a")]),
            10,
            3.0,
        );
        let bucket = CumulativeBucket {
            kind: BucketKind::Range,
            bound: "2",
            value: 7.0,
            source: &source,
        };

        let mut out = Vec::new();
        let mut emitter = Emitter::new("vmrange".into(), "le".into(), &mut out);
        emitter.bucket(&bucket);

        let expected = Sample::new(
            LabelSet::from_labels([("__name__", "foo_bucket"), ("le", "2"), ("job", "a")]),
            10,
            7.0,
        );
        assert_eq!(out, vec![expected]);
        assert_eq!(source.labels.get("vmrange"), Some("1...2"));
        assert_eq!(source.labels.get("le"), None);
    }
}
