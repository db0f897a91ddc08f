use thiserror::Error;

use crate::{
    merger::BucketMerger,
    sample::{Value, ValueType, Vector},
};

/// Name under which [`BucketMerger`] is exposed to a query engine.
pub const PROMETHEUS_BUCKETS: &str = "prometheus_buckets";

/// Errors that could occur when calling a query function.
///
/// These only ever describe a mismatch between the function and how it was called; problems with
/// the data itself are handled by the function.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallError {
    /// No function is registered under the given name.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    /// The function was called with the wrong number of arguments.
    #[error("function `{name}` expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Name of the function.
        name: &'static str,
        /// Number of arguments the function accepts.
        expected: usize,
        /// Number of arguments given.
        actual: usize,
    },

    /// An argument had the wrong type.
    #[error("function `{name}` expects a {expected} for argument {position}, got a {actual}")]
    ArgumentType {
        /// Name of the function.
        name: &'static str,
        /// Zero-based position of the argument.
        position: usize,
        /// Type the function accepts at that position.
        expected: ValueType,
        /// Type given.
        actual: ValueType,
    },
}

/// Name and type signature of a query function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    /// Name of the function.
    pub name: &'static str,

    /// Types of the arguments, in order.
    pub arg_types: &'static [ValueType],

    /// Type of the returned value.
    pub return_type: ValueType,
}

impl FunctionSignature {
    /// Checks that the given arguments match this signature.
    ///
    /// # Errors
    ///
    /// If the number or type of the arguments does not match, an error variant will be returned
    /// describing the mismatch.
    pub fn check(&self, args: &[Value]) -> Result<(), CallError> {
        if args.len() != self.arg_types.len() {
            return Err(CallError::ArgumentCount {
                name: self.name,
                expected: self.arg_types.len(),
                actual: args.len(),
            });
        }

        for (position, (arg, expected)) in args.iter().zip(self.arg_types).enumerate() {
            let actual = arg.value_type();
            if actual != *expected {
                return Err(CallError::ArgumentType {
                    name: self.name,
                    position,
                    expected: *expected,
                    actual,
                });
            }
        }

        Ok(())
    }
}

/// A query function evaluated once per evaluation timestamp, producing an instant vector.
pub trait VectorFunction: Send + Sync {
    /// Gets the signature of this function.
    fn signature(&self) -> &FunctionSignature;

    /// Evaluates the function, appending its results to `out` and handing it back.
    ///
    /// Arguments have already been checked against [`signature`](VectorFunction::signature) when
    /// called through a [`FunctionRegistry`](crate::FunctionRegistry).
    ///
    /// # Errors
    ///
    /// If the arguments do not match the signature, an error variant will be returned.
    fn call(&self, args: &[Value], out: Vector) -> Result<Vector, CallError>;
}

static PROMETHEUS_BUCKETS_SIGNATURE: FunctionSignature = FunctionSignature {
    name: PROMETHEUS_BUCKETS,
    arg_types: &[ValueType::Vector],
    return_type: ValueType::Vector,
};

impl VectorFunction for BucketMerger {
    fn signature(&self) -> &FunctionSignature {
        &PROMETHEUS_BUCKETS_SIGNATURE
    }

    fn call(&self, args: &[Value], mut out: Vector) -> Result<Vector, CallError> {
        match args {
            [Value::Vector(input)] => {
                self.merge(input, &mut out);
                Ok(out)
            }
            _ => self.signature().check(args).map(|()| out),
        }
    }
}
