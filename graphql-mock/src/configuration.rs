//! Mock session configuration.

use std::time::Duration;

use crate::mocks::MockTable;
use crate::mocks::ResolverTable;
use crate::operation::OperationTable;
use crate::schema::SchemaSource;

/// Requests are matched against this endpoint when none is configured. Also
/// serves as the registry key for sessions with neither a name nor an
/// endpoint.
pub const DEFAULT_ENDPOINT: &str = "/graphql";

/// Configuration for one mock session.
///
/// Built once per interceptor installation; subsequent steps of the same test
/// mutate the installed session through [`crate::SessionOverrides`], not by
/// rebuilding this.
#[derive(Clone, Default)]
pub struct Configuration {
    pub(crate) name: Option<String>,
    pub(crate) endpoint: Option<String>,
    pub(crate) delay: Option<Duration>,
    pub(crate) operations: OperationTable,
    pub(crate) mocks: MockTable,
    pub(crate) resolvers: ResolverTable,
    pub(crate) schema: Option<SchemaSource>,
}

#[buildstructor::buildstructor]
impl Configuration {
    /// Returns a builder that builds a session [`Configuration`].
    ///
    /// Builder methods:
    ///
    /// * `.name(impl Into<`[`String`]`>)`
    ///   Optional.
    ///   The registry key for this session; defaults to the endpoint.
    ///
    /// * `.endpoint(impl Into<`[`String`]`>)`
    ///   Optional.
    ///   The substring a POST URL must contain to be intercepted. Defaults to
    ///   [`DEFAULT_ENDPOINT`].
    ///
    /// * `.delay(`[`Duration`]`)`
    ///   Optional.
    ///   Artificial delay applied before every mocked response. Defaults to
    ///   zero.
    ///
    /// * `.operations(`[`OperationTable`]`)`, `.mocks(`[`MockTable`]`)`,
    ///   `.resolvers(`[`ResolverTable`]`)`
    ///   Optional, default to empty tables.
    ///
    /// * `.schema(impl Into<`[`SchemaSource`]`>)`
    ///   Required at installation time unless the base configuration
    ///   supplies one.
    ///
    /// * `.build()`
    ///   Finishes the builder and returns a [`Configuration`].
    #[builder(visibility = "pub")]
    fn new(
        name: Option<String>,
        endpoint: Option<String>,
        delay: Option<Duration>,
        operations: Option<OperationTable>,
        mocks: Option<MockTable>,
        resolvers: Option<ResolverTable>,
        schema: Option<SchemaSource>,
    ) -> Self {
        Self {
            name,
            endpoint,
            delay,
            operations: operations.unwrap_or_default(),
            mocks: mocks.unwrap_or_default(),
            resolvers: resolvers.unwrap_or_default(),
            schema,
        }
    }
}

impl Configuration {
    /// The key this session registers under: its name, else its endpoint,
    /// else the fixed default.
    pub(crate) fn session_key(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned())
    }

    pub(crate) fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned())
    }

    pub(crate) fn delay(&self) -> Duration {
        self.delay.unwrap_or(Duration::ZERO)
    }

    /// Layers this per-test configuration over the process-wide base
    /// configuration: scalar fields fall back to the base, tables merge with
    /// this configuration winning.
    pub(crate) fn layered_over(self, base: &Configuration) -> Configuration {
        let mut operations = base.operations.clone();
        operations.extend(&self.operations);
        Configuration {
            name: self.name.or_else(|| base.name.clone()),
            endpoint: self.endpoint.or_else(|| base.endpoint.clone()),
            delay: self.delay.or(base.delay),
            operations,
            mocks: base.mocks.merge(&self.mocks),
            resolvers: base.resolvers.merge(&self.resolvers),
            schema: self.schema.or_else(|| base.schema.clone()),
        }
    }
}
