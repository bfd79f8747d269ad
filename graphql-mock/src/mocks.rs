//! Mock and resolver tables.
//!
//! A [`MockTable`] maps schema type names to the synthetic value produced for
//! instances of that type during execution; a [`ResolverTable`] maps type
//! names to per-field resolver functions that feed field resolution directly.
//! Both support the same layered-override merge used to combine base mocks
//! with per-test overrides.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json_bytes::Value;

use crate::json_ext::Object;

/// A value-producing mock function. Invoked once per mocked instance.
pub type MockFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// A mock table entry: a literal value, or a function producing one.
#[derive(Clone)]
pub enum MockValue {
    /// A literal JSON value returned for every instance.
    Json(Value),
    /// A function invoked for each instance.
    Func(MockFn),
}

impl MockValue {
    /// Wraps a producing function.
    pub fn func(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        MockValue::Func(Arc::new(f))
    }
}

impl From<Value> for MockValue {
    fn from(value: Value) -> Self {
        MockValue::Json(value)
    }
}

/// A mock table with every entry normalized to a producing function,
/// insertion order preserved.
pub type ResolvedMocks = IndexMap<String, MockFn>;

/// Mapping from schema type name to the mock producing values of that type.
#[derive(Clone, Default)]
pub struct MockTable {
    entries: IndexMap<String, MockValue>,
}

impl MockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mock for the given type name, replacing any previous entry.
    pub fn insert(&mut self, type_name: impl Into<String>, mock: impl Into<MockValue>) {
        self.entries.insert(type_name.into(), mock.into());
    }

    /// Chaining variant of [`MockTable::insert`].
    pub fn with_mock(mut self, type_name: impl Into<String>, mock: impl Into<MockValue>) -> Self {
        self.insert(type_name, mock);
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&MockValue> {
        self.entries.get(type_name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalizes every entry to a producing function.
    ///
    /// Functions pass through; literals are captured in a closure returning a
    /// clone of the literal. Pure: `self` is unchanged, key order is
    /// preserved, and nested object values are not recursed into.
    pub fn resolve(&self) -> ResolvedMocks {
        self.entries
            .iter()
            .map(|(type_name, mock)| {
                let func = match mock {
                    MockValue::Func(f) => f.clone(),
                    MockValue::Json(value) => {
                        let value = value.clone();
                        Arc::new(move || value.clone()) as MockFn
                    }
                };
                (type_name.clone(), func)
            })
            .collect()
    }

    /// Merges `overrides` over `self` into a new table, one level deep.
    ///
    /// Override entries win ties. When both sides of a colliding key hold
    /// plain JSON objects the merged entry is their shallow union (override
    /// fields winning); any other pairing, including arrays and functions on
    /// either side, replaces the base entry wholesale. Neither table is
    /// mutated.
    pub fn merge(&self, overrides: &MockTable) -> MockTable {
        let mut entries = self.entries.clone();
        for (key, value) in &overrides.entries {
            match (entries.get_mut(key), value) {
                (
                    Some(MockValue::Json(Value::Object(existing))),
                    MockValue::Json(Value::Object(incoming)),
                ) => {
                    for (inner_key, inner_value) in incoming {
                        existing.insert(inner_key.clone(), inner_value.clone());
                    }
                }
                _ => {
                    entries.insert(key.clone(), value.clone());
                }
            }
        }
        MockTable { entries }
    }
}

/// A field resolver: receives the coerced field arguments and produces the
/// field value, or an error message that becomes a GraphQL field error.
pub type FieldResolver = Arc<dyn Fn(&Object) -> Result<Value, String> + Send + Sync>;

/// The per-field resolvers configured for one type.
pub type FieldResolvers = IndexMap<String, FieldResolver>;

/// A resolver table entry: a map of field resolvers, or a factory invoked
/// with the resolved mock store to produce one.
#[derive(Clone)]
pub enum ResolverEntry {
    Fields(FieldResolvers),
    Factory(Arc<dyn Fn(&ResolvedMocks) -> FieldResolvers + Send + Sync>),
}

/// Mapping from schema type name to field resolvers, structurally parallel to
/// [`MockTable`] but feeding GraphQL field resolution directly rather than
/// mock-value generation.
#[derive(Clone, Default)]
pub struct ResolverTable {
    entries: IndexMap<String, ResolverEntry>,
}

impl ResolverTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one field resolver under the given type name.
    pub fn insert(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: impl Fn(&Object) -> Result<Value, String> + Send + Sync + 'static,
    ) {
        let entry = self
            .entries
            .entry(type_name.into())
            .or_insert_with(|| ResolverEntry::Fields(FieldResolvers::default()));
        if let ResolverEntry::Fields(fields) = entry {
            fields.insert(field_name.into(), Arc::new(resolver));
        } else {
            let mut fields = FieldResolvers::default();
            fields.insert(field_name.into(), Arc::new(resolver));
            *entry = ResolverEntry::Fields(fields);
        }
    }

    /// Chaining variant of [`ResolverTable::insert`].
    pub fn with_resolver(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: impl Fn(&Object) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.insert(type_name, field_name, resolver);
        self
    }

    /// Installs a resolver-generating factory for the given type name,
    /// replacing any previous entry. The factory receives the resolved mock
    /// store when the type is first resolved in a request.
    pub fn with_factory(
        mut self,
        type_name: impl Into<String>,
        factory: impl Fn(&ResolvedMocks) -> FieldResolvers + Send + Sync + 'static,
    ) -> Self {
        self.entries
            .insert(type_name.into(), ResolverEntry::Factory(Arc::new(factory)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the resolver for `type_name.field_name`, materializing a
    /// factory entry against the given mock store if necessary.
    pub(crate) fn field_resolver(
        &self,
        type_name: &str,
        field_name: &str,
        mocks: &ResolvedMocks,
    ) -> Option<FieldResolver> {
        match self.entries.get(type_name)? {
            ResolverEntry::Fields(fields) => fields.get(field_name).cloned(),
            ResolverEntry::Factory(factory) => factory(mocks).get(field_name).cloned(),
        }
    }

    /// Merges `overrides` over `self` into a new table.
    ///
    /// Same shape as [`MockTable::merge`]: colliding per-field maps take
    /// their shallow union with override fields winning; a factory on either
    /// side replaces wholesale.
    pub fn merge(&self, overrides: &ResolverTable) -> ResolverTable {
        let mut entries = self.entries.clone();
        for (key, value) in &overrides.entries {
            match (entries.get_mut(key), value) {
                (Some(ResolverEntry::Fields(existing)), ResolverEntry::Fields(incoming)) => {
                    for (field, resolver) in incoming {
                        existing.insert(field.clone(), resolver.clone());
                    }
                }
                _ => {
                    entries.insert(key.clone(), value.clone());
                }
            }
        }
        ResolverTable { entries }
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn literals_resolve_to_producers_returning_the_literal() {
        let table = MockTable::new()
            .with_mock("EnumField", json!("CAT"))
            .with_mock("User", json!({"name": "A"}))
            .with_mock("Count", json!(3));
        let resolved = table.resolve();
        assert_eq!(
            resolved.keys().collect::<Vec<_>>(),
            vec!["EnumField", "User", "Count"],
        );
        assert_eq!(resolved["EnumField"](), json!("CAT"));
        assert_eq!(resolved["User"](), json!({"name": "A"}));
        assert_eq!(resolved["Count"](), json!(3));
    }

    #[test]
    fn functions_pass_through_resolution() {
        let table = MockTable::new().with_mock("Now", MockValue::func(|| json!(1234)));
        assert_eq!(table.resolve()["Now"](), json!(1234));
    }

    #[test]
    fn disjoint_merge_is_a_union() {
        let base = MockTable::new().with_mock("A", json!(1));
        let overrides = MockTable::new().with_mock("B", json!(2));
        let merged = base.merge(&overrides).resolve();
        assert_eq!(merged["A"](), json!(1));
        assert_eq!(merged["B"](), json!(2));
    }

    #[test]
    fn colliding_objects_take_their_shallow_union() {
        let base = MockTable::new().with_mock("User", json!({"name": "A", "age": 30}));
        let overrides = MockTable::new().with_mock("User", json!({"name": "B"}));
        assert_eq!(
            base.merge(&overrides).resolve()["User"](),
            json!({"name": "B", "age": 30}),
        );
    }

    #[test]
    fn colliding_arrays_are_replaced_wholesale() {
        let base = MockTable::new().with_mock("Tags", json!(["a", "b"]));
        let overrides = MockTable::new().with_mock("Tags", json!(["c"]));
        assert_eq!(base.merge(&overrides).resolve()["Tags"](), json!(["c"]));
    }

    #[test]
    fn an_override_primitive_replaces_a_base_object() {
        let base = MockTable::new().with_mock("Value", json!({"kept": true}));
        let overrides = MockTable::new().with_mock("Value", json!(42));
        assert_eq!(base.merge(&overrides).resolve()["Value"](), json!(42));
    }

    #[test]
    fn an_override_function_replaces_a_base_object() {
        let base = MockTable::new().with_mock("User", json!({"name": "A"}));
        let overrides = MockTable::new().with_mock("User", MockValue::func(|| json!({"name": "F"})));
        assert_eq!(
            base.merge(&overrides).resolve()["User"](),
            json!({"name": "F"}),
        );
    }

    #[test]
    fn merge_does_not_mutate_its_inputs() {
        let base = MockTable::new().with_mock("User", json!({"name": "A"}));
        let overrides = MockTable::new().with_mock("User", json!({"name": "B"}));
        let _ = base.merge(&overrides);
        assert_eq!(base.resolve()["User"](), json!({"name": "A"}));
        assert_eq!(overrides.resolve()["User"](), json!({"name": "B"}));
    }

    #[test]
    fn resolver_tables_merge_per_field() {
        let base = ResolverTable::new()
            .with_resolver("User", "name", |_| Ok(json!("base")))
            .with_resolver("User", "age", |_| Ok(json!(30)));
        let overrides = ResolverTable::new().with_resolver("User", "name", |_| Ok(json!("override")));
        let merged = base.merge(&overrides);
        let mocks = ResolvedMocks::default();
        let name = merged.field_resolver("User", "name", &mocks).unwrap();
        let age = merged.field_resolver("User", "age", &mocks).unwrap();
        assert_eq!(name(&Object::default()), Ok(json!("override")));
        assert_eq!(age(&Object::default()), Ok(json!(30)));
    }

    #[test]
    fn a_factory_sees_the_resolved_mock_store() {
        let table = ResolverTable::new().with_factory("Query", |mocks| {
            let greeting = mocks["Greeting"]();
            let mut fields = FieldResolvers::default();
            fields.insert(
                "greeting".to_owned(),
                Arc::new(move |_: &Object| Ok(greeting.clone())) as FieldResolver,
            );
            fields
        });
        let mocks = MockTable::new().with_mock("Greeting", json!("hi")).resolve();
        let resolver = table.field_resolver("Query", "greeting", &mocks).unwrap();
        assert_eq!(resolver(&Object::default()), Ok(json!("hi")));
    }
}
