//! Schema sources and executable schema construction.
//!
//! A mock session accepts its schema in whichever shape the test author has
//! at hand: SDL text, an ordered list of SDL fragments, or the JSON result of
//! a standard introspection query. All three normalize to a single SDL string
//! before being compiled into an executable schema.

use std::sync::Arc;

use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;
use cynic_introspection::IntrospectionQuery;

use crate::error::SetupError;

/// The schema for a mock session, in one of the accepted input shapes.
#[derive(Clone, Debug)]
pub enum SchemaSource {
    /// Raw SDL text, used as-is.
    Sdl(String),
    /// An ordered sequence of SDL fragments, concatenated in order.
    Fragments(Vec<String>),
    /// The JSON value of an introspection result (the `{"__schema": …}` object).
    Introspection(serde_json::Value),
}

impl SchemaSource {
    /// Normalize this source to a single SDL string.
    ///
    /// Textual input is returned as-is and fragments are joined in order.
    /// An introspection result is rebuilt into a client schema and printed
    /// back to SDL. The caller-supplied value is never mutated.
    pub fn into_sdl(self) -> Result<String, SetupError> {
        match self {
            SchemaSource::Sdl(sdl) => Ok(sdl),
            SchemaSource::Fragments(fragments) => Ok(fragments.join("\n\n")),
            SchemaSource::Introspection(value) => {
                let introspection: IntrospectionQuery = serde_json::from_value(value)
                    .map_err(|err| SetupError::InvalidIntrospection {
                        message: err.to_string(),
                    })?;
                let schema =
                    introspection
                        .into_schema()
                        .map_err(|err| SetupError::InvalidIntrospection {
                            message: err.to_string(),
                        })?;
                Ok(schema.to_sdl())
            }
        }
    }

    /// Normalize, then compile into a validated executable schema.
    pub(crate) fn build(self) -> Result<Arc<Valid<Schema>>, SetupError> {
        let sdl = self.into_sdl()?;
        Schema::parse_and_validate(&sdl, "schema.graphql")
            .map(Arc::new)
            .map_err(|err| SetupError::InvalidSchema {
                message: err.errors.to_string(),
            })
    }
}

impl From<&str> for SchemaSource {
    fn from(sdl: &str) -> Self {
        SchemaSource::Sdl(sdl.to_owned())
    }
}

impl From<String> for SchemaSource {
    fn from(sdl: String) -> Self {
        SchemaSource::Sdl(sdl)
    }
}

impl From<Vec<String>> for SchemaSource {
    fn from(fragments: Vec<String>) -> Self {
        SchemaSource::Fragments(fragments)
    }
}

impl From<Vec<&str>> for SchemaSource {
    fn from(fragments: Vec<&str>) -> Self {
        SchemaSource::Fragments(fragments.into_iter().map(str::to_owned).collect())
    }
}

impl From<serde_json::Value> for SchemaSource {
    fn from(introspection: serde_json::Value) -> Self {
        SchemaSource::Introspection(introspection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdl_text_is_returned_as_is() {
        let sdl = "type Query { pong: Boolean }";
        assert_eq!(SchemaSource::from(sdl).into_sdl().unwrap(), sdl);
    }

    #[test]
    fn fragments_are_joined_in_order() {
        let source = SchemaSource::from(vec![
            "type Query { user: User }",
            "type User { name: String }",
        ]);
        assert_eq!(
            source.into_sdl().unwrap(),
            "type Query { user: User }\n\ntype User { name: String }",
        );
    }

    #[test]
    fn invalid_introspection_is_a_setup_error() {
        let source = SchemaSource::Introspection(serde_json::json!({"not": "a schema"}));
        match source.into_sdl() {
            Err(SetupError::InvalidIntrospection { .. }) => {}
            other => panic!("expected InvalidIntrospection, got {other:?}"),
        }
    }

    #[test]
    fn invalid_sdl_is_a_setup_error() {
        let source = SchemaSource::from("type Query { pong: Missing }");
        match source.build() {
            Err(SetupError::InvalidSchema { .. }) => {}
            other => panic!("expected InvalidSchema, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn valid_sdl_compiles() {
        let schema = SchemaSource::from("type Query { pong: Boolean }")
            .build()
            .unwrap();
        assert!(schema.types.contains_key("Query"));
    }
}
