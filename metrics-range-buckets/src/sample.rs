use std::fmt;

use crate::label::LabelSet;

/// A single sample of a time series at one evaluation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Labels identifying the series.
    pub labels: LabelSet,

    /// Timestamp of the sample, in milliseconds.
    pub timestamp: i64,

    /// Value of the sample.
    pub value: f64,
}

impl Sample {
    /// Creates a new `Sample`.
    pub fn new(labels: LabelSet, timestamp: i64, value: f64) -> Sample {
        Sample { labels, timestamp, value }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @{}", self.labels, self.value, self.timestamp)
    }
}

/// A set of samples sharing the same evaluation timestamp.
pub type Vector = Vec<Sample>;

/// Type of a value passed to, or returned from, a query function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// An instant vector.
    Vector,

    /// A single floating-point number.
    Scalar,
}

impl ValueType {
    /// Gets the name of this value type as used in query diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Vector => "vector",
            ValueType::Scalar => "scalar",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value passed as an argument to a query function.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An instant vector.
    Vector(Vector),

    /// A single floating-point number.
    Scalar(f64),
}

impl Value {
    /// Gets the type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Vector(_) => ValueType::Vector,
            Value::Scalar(_) => ValueType::Scalar,
        }
    }
}

impl From<Vector> for Value {
    fn from(vector: Vector) -> Value {
        Value::Vector(vector)
    }
}

impl From<f64> for Value {
    fn from(scalar: f64) -> Value {
        Value::Scalar(scalar)
    }
}
