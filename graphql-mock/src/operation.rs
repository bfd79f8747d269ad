//! Per-operation root-value overrides.
//!
//! The operation table maps named operations to the root value GraphQL
//! execution starts from. Entries are either a static value or a handler
//! invoked with the request variables; a handler may fail to simulate a
//! server-side GraphQL error.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json_bytes::Value;

use crate::graphql;
use crate::json_ext::Object;

/// An operation handler: receives the request variables and produces the root
/// value, or a GraphQL error to be returned in the response `errors` array.
pub type OperationFn = Arc<dyn Fn(&Object) -> Result<Value, graphql::Error> + Send + Sync>;

/// An operation table entry.
#[derive(Clone)]
pub enum OperationMock {
    /// A static root value.
    Value(Value),
    /// A handler invoked with the request variables.
    Handler(OperationFn),
}

impl OperationMock {
    /// Wraps a handler function.
    pub fn handler(
        f: impl Fn(&Object) -> Result<Value, graphql::Error> + Send + Sync + 'static,
    ) -> Self {
        OperationMock::Handler(Arc::new(f))
    }
}

impl From<Value> for OperationMock {
    fn from(value: Value) -> Self {
        OperationMock::Value(value)
    }
}

/// The outcome of root-value resolution.
///
/// A handler failure is captured here as an explicit variant rather than
/// re-thrown, so the interceptor can turn it into the response `errors`
/// array without any error-likeness guessing at response time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RootValue {
    /// The root value execution starts field resolution from.
    Data(Value),
    /// A simulated server-side GraphQL error.
    SimulatedError(graphql::Error),
}

impl RootValue {
    pub(crate) fn empty() -> Self {
        RootValue::Data(Value::Object(Object::default()))
    }
}

/// Mapping from operation name to its configured root-value override.
#[derive(Clone, Default)]
pub struct OperationTable {
    entries: IndexMap<String, OperationMock>,
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override for the given operation name, replacing any previous
    /// entry.
    pub fn insert(&mut self, operation_name: impl Into<String>, mock: impl Into<OperationMock>) {
        self.entries.insert(operation_name.into(), mock.into());
    }

    /// Chaining variant of [`OperationTable::insert`].
    pub fn with_operation(
        mut self,
        operation_name: impl Into<String>,
        mock: impl Into<OperationMock>,
    ) -> Self {
        self.insert(operation_name, mock);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shallow-merges `overrides` into `self`: new names are added, colliding
    /// names are overwritten. Operation entries never deep-merge.
    pub(crate) fn extend(&mut self, overrides: &OperationTable) {
        for (name, mock) in &overrides.entries {
            self.entries.insert(name.clone(), mock.clone());
        }
    }

    /// Computes the root value for the named operation.
    ///
    /// A missing or unconfigured operation name yields an empty object,
    /// meaning "let default mocking apply with no override". A handler error
    /// is captured into [`RootValue::SimulatedError`], not propagated.
    pub(crate) fn resolve_root(
        &self,
        operation_name: Option<&str>,
        variables: &Object,
    ) -> RootValue {
        let Some(name) = operation_name else {
            return RootValue::empty();
        };
        match self.entries.get(name) {
            None => RootValue::empty(),
            Some(OperationMock::Value(value)) => RootValue::Data(value.clone()),
            Some(OperationMock::Handler(handler)) => match handler(variables) {
                Ok(value) => RootValue::Data(value),
                Err(error) => RootValue::SimulatedError(error),
            },
        }
    }
}
