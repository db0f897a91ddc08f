//! Conversion of range-bucket histograms into cumulative Prometheus-style buckets.
//!
//! Some metrics systems record histograms as a set of independent "range buckets": each series
//! counts the observations that fell into one disjoint interval, identified by a `vmrange` label
//! such as `vmrange="1.000e+00...1.136e+00"`.  Prometheus, and functions such as
//! `histogram_quantile`, instead expect cumulative buckets: each series counts every observation
//! less than or equal to the bound carried in its `le` label.
//!
//! [`BucketMerger`] performs that conversion over the samples of a single evaluation timestamp.
//! It is exposed to query engines as the `prometheus_buckets` function through the
//! [`VectorFunction`] trait, and can be registered alongside other functions in a
//! [`FunctionRegistry`].
//!
//! # Example
//!
//! ```
//! use metrics_range_buckets::{BucketMerger, LabelSet, Sample};
//!
//! let bucket = |range: &str, value: f64| {
//!     let labels = LabelSet::from_labels([("__name__", "latency_bucket"), ("vmrange", range)]);
//!     Sample::new(labels, 0, value)
//! };
//!
//! let out = BucketMerger::new().merge_to_vec(&[bucket("0...1", 5.0), bucket("2...3", 7.0)]);
//! let buckets = out
//!     .iter()
//!     .map(|s| (s.labels.get("le").unwrap_or_default(), s.value))
//!     .collect::<Vec<_>>();
//!
//! assert_eq!(buckets, vec![("1", 5.0), ("2", 5.0), ("3", 12.0), ("+Inf", 12.0)]);
//! ```
#![deny(missing_docs)]

mod accumulator;
pub use accumulator::INF_BOUND;

mod builder;
pub use builder::{
    BucketMergerBuilder, BuildError, Grouping, DEFAULT_BOUND_LABEL, DEFAULT_RANGE_LABEL,
};

mod classify;
mod emitter;

mod function;
pub use function::{CallError, FunctionSignature, VectorFunction, PROMETHEUS_BUCKETS};

mod label;
pub use label::{Label, LabelSet, LabelSetBuilder};

mod merger;
pub use merger::BucketMerger;

mod range;
pub use range::{parse_range, ParsedRange, RangeBounds, RangeParseError, RANGE_DELIMITER};

mod registry;
pub use registry::{FunctionRegistry, FunctionRegistryBuilder, RegistryError};

mod sample;
pub use sample::{Sample, Value, ValueType, Vector};
