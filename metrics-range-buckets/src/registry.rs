use std::{collections::HashMap, fmt, sync::Arc};

use thiserror::Error;
use tracing::debug;

use crate::{
    function::{CallError, VectorFunction},
    merger::BucketMerger,
    sample::{Value, Vector},
};

/// Errors that could occur while building a [`FunctionRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A function was registered more than once under the same name.
    #[error("function `{0}` is already registered")]
    Duplicate(&'static str),
}

/// A fixed set of query functions, looked up by name.
///
/// The registry is assembled once, when the query engine is initialized, and cannot be changed
/// afterwards.  Engines that need a different set of functions build their own registry rather
/// than modifying a shared one.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: Arc<HashMap<&'static str, Arc<dyn VectorFunction>>>,
}

impl FunctionRegistry {
    /// Creates a [`FunctionRegistryBuilder`] for assembling a registry.
    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::default()
    }

    /// Creates a registry holding the functions provided by this crate.
    ///
    /// Currently, this is only `prometheus_buckets`, backed by a [`BucketMerger`] with the
    /// default configuration.
    pub fn with_defaults() -> Self {
        Self::builder()
            .register(BucketMerger::new())
            .expect("default functions should never have conflicting names")
            .build()
    }

    /// Gets the function registered under the given name, if any.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn VectorFunction>> {
        self.functions.get(name)
    }

    /// Returns `true` if a function is registered under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Names of all registered functions, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    /// Calls the function registered under the given name.
    ///
    /// The arguments are checked against the function's signature before it is called.
    ///
    /// # Errors
    ///
    /// If no function is registered under the given name, or the arguments do not match the
    /// function's signature, an error variant will be returned.
    pub fn call(&self, name: &str, args: &[Value], out: Vector) -> Result<Vector, CallError> {
        let function =
            self.get(name).ok_or_else(|| CallError::UnknownFunction(name.to_string()))?;
        function.signature().check(args)?;
        function.call(args, out)
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names().collect::<Vec<_>>();
        names.sort_unstable();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

/// Builder for a [`FunctionRegistry`].
#[derive(Default)]
pub struct FunctionRegistryBuilder {
    functions: HashMap<&'static str, Arc<dyn VectorFunction>>,
}

impl FunctionRegistryBuilder {
    /// Registers a function under the name given by its signature.
    ///
    /// # Errors
    ///
    /// If a function is already registered under the same name, an error will be returned.
    pub fn register<F>(mut self, function: F) -> Result<Self, RegistryError>
    where
        F: VectorFunction + 'static,
    {
        let name = function.signature().name;
        if self.functions.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }

        debug!(function = name, "Registered query function.");
        self.functions.insert(name, Arc::new(function));
        Ok(self)
    }

    /// Builds the registry.
    pub fn build(self) -> FunctionRegistry {
        FunctionRegistry { functions: Arc::new(self.functions) }
    }
}

#[cfg(test)]
mod tests {
    use super::{FunctionRegistry, RegistryError};
    use crate::{
        function::{FunctionSignature, PROMETHEUS_BUCKETS},
        BucketMerger, CallError, Grouping, Value, ValueType, Vector, VectorFunction,
    };

    struct Negate;

    static NEGATE: FunctionSignature = FunctionSignature {
        name: "negate",
        arg_types: &[ValueType::Vector],
        return_type: ValueType::Vector,
    };

    impl VectorFunction for Negate {
        fn signature(&self) -> &FunctionSignature {
            &NEGATE
        }

        fn call(&self, args: &[Value], mut out: Vector) -> Result<Vector, CallError> {
            if let [Value::Vector(input)] = args {
                out.extend(input.iter().cloned().map(|mut s| {
                    s.value = -s.value;
                    s
                }));
            }
            Ok(out)
        }
    }

    #[test]
    fn test_defaults() {
        let registry = FunctionRegistry::with_defaults();

        assert!(registry.contains(PROMETHEUS_BUCKETS));
        assert!(!registry.contains("histogram_quantile"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec![PROMETHEUS_BUCKETS]);
        assert_eq!(
            format!("{:?}", registry),
            "FunctionRegistry { functions: [\"prometheus_buckets\"] }"
        );

        // Defaults go through the same registration path as any other function.
        let registered = FunctionRegistry::builder()
            .register(BucketMerger::new())
            .expect("registration should succeed")
            .build();
        assert_eq!(format!("{:?}", registry), format!("{:?}", registered));
    }

    #[test]
    fn test_builder() {
        let merger = BucketMerger::builder()
            .with_grouping(Grouping::ByIdentity)
            .build()
            .expect("merger should build");
        let registry = FunctionRegistry::builder()
            .register(Negate)
            .and_then(|b| b.register(merger))
            .expect("registration should succeed")
            .build();

        assert!(registry.contains("negate"));
        assert!(registry.contains(PROMETHEUS_BUCKETS));
        let out = registry
            .call("negate", &[Value::Vector(Vec::new())], Vec::new())
            .expect("call should succeed");
        assert!(out.is_empty());
    }

    #[test]
    fn test_duplicate_registration() {
        let result = FunctionRegistry::builder()
            .register(BucketMerger::new())
            .and_then(|b| b.register(BucketMerger::new()));

        assert_eq!(result.err(), Some(RegistryError::Duplicate(PROMETHEUS_BUCKETS)));
    }

    #[test]
    fn test_call_errors() {
        let registry = FunctionRegistry::with_defaults();

        assert_eq!(
            registry.call("nope", &[], Vec::new()),
            Err(CallError::UnknownFunction("nope".to_string()))
        );
        assert_eq!(
            registry.call("negate", &[Value::Scalar(1.0)], Vec::new()),
            Err(CallError::UnknownFunction("negate".to_string()))
        );
        assert!(matches!(
            registry.call(PROMETHEUS_BUCKETS, &[Value::Scalar(1.0)], Vec::new()),
            Err(CallError::ArgumentType { position: 0, .. })
        ));
    }
}
