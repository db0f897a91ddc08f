use std::sync::Arc;

use thiserror::Error;

use crate::merger::BucketMerger;

/// Default name of the label carrying a range bucket's interval.
pub const DEFAULT_RANGE_LABEL: &str = "vmrange";

/// Default name of the label carrying a cumulative bucket's upper bound.
pub const DEFAULT_BOUND_LABEL: &str = "le";

/// Errors that could occur while building a [`BucketMerger`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// A label name was empty.
    #[error("{which} label name cannot be empty")]
    EmptyLabelName {
        /// Which of the two labels was empty.
        which: &'static str,
    },

    /// The range label and the bound label were the same.
    #[error("range label and bound label must differ, both were `{0}`")]
    SameLabelName(String),
}

/// How range buckets are split into histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    /// Every range bucket in a single call belongs to the same histogram.
    ///
    /// Callers are responsible for only passing the buckets of one histogram at a time, typically
    /// by evaluating the function over a selector that matches a single series family.
    #[default]
    Caller,

    /// Range buckets are split into histograms by their labels, ignoring the range and bound
    /// labels.
    ///
    /// Histograms are processed in the order in which their first bucket appears in the input.
    ByIdentity,
}

/// Builder for a [`BucketMerger`].
#[derive(Debug, Clone)]
pub struct BucketMergerBuilder {
    range_label: String,
    bound_label: String,
    grouping: Grouping,
}

impl BucketMergerBuilder {
    /// Creates a new `BucketMergerBuilder` with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name of the label carrying a range bucket's interval.
    ///
    /// Defaults to `vmrange`.
    #[must_use]
    pub fn with_range_label<N>(mut self, name: N) -> Self
    where
        N: Into<String>,
    {
        self.range_label = name.into();
        self
    }

    /// Sets the name of the label carrying a cumulative bucket's upper bound.
    ///
    /// Defaults to `le`.
    #[must_use]
    pub fn with_bound_label<N>(mut self, name: N) -> Self
    where
        N: Into<String>,
    {
        self.bound_label = name.into();
        self
    }

    /// Sets how range buckets are split into histograms.
    ///
    /// See [`Grouping`] for more details.
    ///
    /// Defaults to [`Grouping::Caller`].
    #[must_use]
    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Builds the [`BucketMerger`].
    ///
    /// # Errors
    ///
    /// If either label name is empty, or both label names are the same, an error variant will be
    /// returned describing the error.
    pub fn build(self) -> Result<BucketMerger, BuildError> {
        if self.range_label.is_empty() {
            return Err(BuildError::EmptyLabelName { which: "range" });
        }
        if self.bound_label.is_empty() {
            return Err(BuildError::EmptyLabelName { which: "bound" });
        }
        if self.range_label == self.bound_label {
            return Err(BuildError::SameLabelName(self.range_label));
        }

        Ok(BucketMerger::from_parts(
            Arc::from(self.range_label),
            Arc::from(self.bound_label),
            self.grouping,
        ))
    }
}

impl Default for BucketMergerBuilder {
    fn default() -> Self {
        BucketMergerBuilder {
            range_label: DEFAULT_RANGE_LABEL.to_string(),
            bound_label: DEFAULT_BOUND_LABEL.to_string(),
            grouping: Grouping::default(),
        }
    }
}
