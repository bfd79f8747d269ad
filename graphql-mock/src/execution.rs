//! Query execution against a mocked schema.
//!
//! Per field, resolution consults in order: the object's explicit data (the
//! operation root value at the top level, nested values below), the
//! configured resolver table, the seed produced by the mock configured for
//! the object's own type, the mock table keyed by the field's named return
//! type, and finally canned defaults derived from the schema type kind.

use apollo_compiler::ExecutableDocument;
use apollo_compiler::Schema;
use apollo_compiler::ast::OperationType;
use apollo_compiler::ast::Type;
use apollo_compiler::resolvers::Execution;
use apollo_compiler::resolvers::FieldError;
use apollo_compiler::resolvers::ObjectValue;
use apollo_compiler::resolvers::ResolveInfo;
use apollo_compiler::resolvers::ResolvedValue;
use apollo_compiler::response::GraphQLError;
use apollo_compiler::response::JsonMap;
use apollo_compiler::response::JsonValue;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::validation::Valid;

use crate::graphql;
use crate::mocks::ResolvedMocks;
use crate::mocks::ResolverTable;

/// Unmocked list fields resolve to this many generated elements.
const MOCKED_LIST_LENGTH: usize = 2;

/// Everything field resolution can draw from, for the duration of one request.
struct MockStore<'a> {
    schema: &'a Valid<Schema>,
    mocks: ResolvedMocks,
    resolvers: &'a ResolverTable,
}

/// Executes the request's operation against the mocked schema, seeded with
/// the given root data map.
pub(crate) fn execute(
    schema: &Valid<Schema>,
    request: &graphql::Request,
    root: JsonMap,
    mocks: ResolvedMocks,
    resolvers: &ResolverTable,
) -> Result<graphql::Response, Vec<GraphQLError>> {
    let query = request.query.as_deref().unwrap_or("");
    let doc = ExecutableDocument::parse_and_validate(schema, query, "request.graphql")
        .map_err(|e| e.errors.iter().map(|e| e.to_json()).collect::<Vec<_>>())?;
    let operation = doc
        .operations
        .get(request.operation_name.as_deref())
        .map_err(|e| vec![e.to_graphql_error(&doc.sources)])?;
    let store = MockStore {
        schema,
        mocks,
        resolvers,
    };
    let initial_value = MockedObject::new(
        &store,
        root_type_name(schema, operation.operation_type),
        root,
    );
    let result = Execution::new(schema, &doc)
        .operation(operation)
        .raw_variable_values(&request.variables)
        .execute_sync(&initial_value);
    match result {
        Ok(response) => Ok(graphql::Response::builder()
            .data(JsonValue::from(response.data))
            .errors(response.errors.into_iter().map(Into::into).collect())
            .build()),
        Err(request_error) => Err(vec![request_error.to_graphql_error(&doc.sources)]),
    }
}

fn root_type_name(schema: &Valid<Schema>, operation_type: OperationType) -> String {
    match schema.root_operation(operation_type) {
        Some(name) => name.as_str().to_owned(),
        None => match operation_type {
            OperationType::Query => "Query".to_owned(),
            OperationType::Mutation => "Mutation".to_owned(),
            OperationType::Subscription => "Subscription".to_owned(),
        },
    }
}

/// A GraphQL object backed by an explicit data map and the seed its own
/// type's mock produced, falling back to return-type mocks for fields neither
/// provides.
struct MockedObject<'a> {
    store: &'a MockStore<'a>,
    type_name: String,
    data: JsonMap,
    seed: JsonMap,
}

impl<'a> MockedObject<'a> {
    /// An instance of `type_name` carrying explicit data, seeded from the
    /// type's own mock when one is configured and produces an object.
    fn new(store: &'a MockStore<'a>, type_name: String, explicit: JsonMap) -> Self {
        let seed = store
            .mocks
            .get(&type_name)
            .map(|mock| mock())
            .and_then(|value| value.as_object().cloned())
            .unwrap_or_default();
        MockedObject {
            store,
            type_name,
            data: explicit,
            seed,
        }
    }

    /// An instance whose seed was already produced by the caller, with no
    /// explicit data.
    fn seeded(store: &'a MockStore<'a>, type_name: String, seed: JsonMap) -> Self {
        MockedObject {
            store,
            type_name,
            data: JsonMap::new(),
            seed,
        }
    }
}

impl ObjectValue for MockedObject<'_> {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn resolve_field<'a>(
        &'a self,
        info: &'a ResolveInfo<'a>,
    ) -> Result<ResolvedValue<'a>, FieldError> {
        let field_name = info.field_name();
        let field_ty = &info.field_definition().ty;

        // Explicit data wins: the root value at the top level, nested
        // response data below.
        if let Some(value) = self.data.get(field_name) {
            return resolve_data_value(self.store, field_ty, value.clone());
        }

        // Resolvers override mocked values, but never explicit data.
        if let Some(resolver) =
            self.store
                .resolvers
                .field_resolver(&self.type_name, field_name, &self.store.mocks)
        {
            let value = resolver(info.arguments()).map_err(|message| FieldError { message })?;
            return resolve_data_value(self.store, field_ty, value);
        }

        if let Some(value) = self.seed.get(field_name) {
            return resolve_data_value(self.store, field_ty, value.clone());
        }

        resolve_mocked(self.store, field_ty)
    }
}

/// Turns a concrete JSON value into a resolved value against the field's
/// declared type: objects recurse, arrays map element-wise, leaves pass
/// through.
fn resolve_data_value<'a>(
    store: &'a MockStore<'a>,
    ty: &'a Type,
    value: JsonValue,
) -> Result<ResolvedValue<'a>, FieldError> {
    match value {
        JsonValue::Object(map) => {
            let type_name = concrete_type_name(&map, ty);
            Ok(ResolvedValue::object(MockedObject::new(
                store, type_name, map,
            )))
        }
        JsonValue::Array(values) => {
            let item_ty = list_item_type(ty);
            Ok(ResolvedValue::List(Box::new(
                values
                    .into_iter()
                    .map(move |item| resolve_data_value(store, item_ty, item)),
            )))
        }
        json => Ok(ResolvedValue::leaf(json)),
    }
}

/// Resolves a field with no explicit data: the mock table for the field's
/// named return type, then canned defaults by type kind. List fields produce
/// [`MOCKED_LIST_LENGTH`] generated elements.
fn resolve_mocked<'a>(
    store: &'a MockStore<'a>,
    ty: &'a Type,
) -> Result<ResolvedValue<'a>, FieldError> {
    if matches!(ty, Type::List(_) | Type::NonNullList(_)) {
        let item_ty = list_item_type(ty);
        return Ok(ResolvedValue::List(Box::new(
            (0..MOCKED_LIST_LENGTH).map(move |_| resolve_mocked_item(store, item_ty)),
        )));
    }
    resolve_mocked_item(store, ty)
}

fn resolve_mocked_item<'a>(
    store: &'a MockStore<'a>,
    ty: &'a Type,
) -> Result<ResolvedValue<'a>, FieldError> {
    let type_name = ty.inner_named_type().as_str();
    if let Some(mock) = store.mocks.get(type_name) {
        // An object-producing mock becomes the instance's seed, so field
        // resolvers still apply to it; anything else is the value itself.
        return match mock() {
            JsonValue::Object(map) => {
                let concrete = concrete_type_name(&map, ty);
                Ok(ResolvedValue::object(MockedObject::seeded(
                    store, concrete, map,
                )))
            }
            value => resolve_data_value(store, ty, value),
        };
    }
    default_for_type(store, type_name)
}

fn default_for_type<'a>(
    store: &'a MockStore<'a>,
    type_name: &str,
) -> Result<ResolvedValue<'a>, FieldError> {
    match store.schema.types.get(type_name) {
        Some(ExtendedType::Scalar(_)) => Ok(ResolvedValue::leaf(default_scalar(type_name))),
        Some(ExtendedType::Enum(enum_type)) => match enum_type.values.keys().next() {
            Some(value) => Ok(ResolvedValue::leaf(value.as_str())),
            None => Ok(ResolvedValue::leaf(JsonValue::Null)),
        },
        Some(ExtendedType::Object(_)) => Ok(ResolvedValue::object(MockedObject::new(
            store,
            type_name.to_owned(),
            JsonMap::new(),
        ))),
        Some(ExtendedType::Interface(_)) => {
            let implementer = store.schema.types.iter().find_map(|(name, ty)| match ty {
                ExtendedType::Object(object)
                    if object
                        .implements_interfaces
                        .iter()
                        .any(|interface| interface.name.as_str() == type_name) =>
                {
                    Some(name.as_str())
                }
                _ => None,
            });
            match implementer {
                Some(concrete) => Ok(ResolvedValue::object(MockedObject::new(
                    store,
                    concrete.to_owned(),
                    JsonMap::new(),
                ))),
                None => Err(FieldError {
                    message: format!("interface '{type_name}' has no implementing object type"),
                }),
            }
        }
        Some(ExtendedType::Union(union_type)) => match union_type.members.iter().next() {
            Some(member) => Ok(ResolvedValue::object(MockedObject::new(
                store,
                member.name.as_str().to_owned(),
                JsonMap::new(),
            ))),
            None => Err(FieldError {
                message: format!("union '{type_name}' has no members"),
            }),
        },
        Some(ExtendedType::InputObject(_)) | None => Ok(ResolvedValue::leaf(JsonValue::Null)),
    }
}

fn default_scalar(name: &str) -> JsonValue {
    match name {
        "Int" => 42.into(),
        "Float" => 4.2.into(),
        "String" => "Hello World".into(),
        "Boolean" => false.into(),
        "ID" => "1".into(),
        _ => JsonValue::Null,
    }
}

fn concrete_type_name(map: &JsonMap, ty: &Type) -> String {
    match map.get("__typename").and_then(JsonValue::as_str) {
        Some(type_name) => type_name.to_owned(),
        None => ty.inner_named_type().as_str().to_owned(),
    }
}

fn list_item_type(ty: &Type) -> &Type {
    match ty {
        Type::List(inner) | Type::NonNullList(inner) => inner,
        other => other,
    }
}
