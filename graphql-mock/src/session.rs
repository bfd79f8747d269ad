//! Session-scoped mock state.
//!
//! A [`MockSession`] is the mutable record behind one interceptor
//! installation. It is created by [`crate::MockHarness::mock_graphql`] and
//! updated in place by later test steps through [`SessionOverrides`]; a new
//! installation is made for every test, so nothing survives teardown.

use std::sync::Arc;
use std::time::Duration;

use apollo_compiler::Schema;
use apollo_compiler::validation::Valid;
use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::configuration::Configuration;
use crate::error::SetupError;
use crate::mocks::MockTable;
use crate::mocks::ResolverTable;
use crate::operation::OperationTable;

/// The shared session registry, keyed by session name.
pub(crate) type Sessions = Arc<Mutex<IndexMap<String, MockSession>>>;

struct SessionState {
    endpoint: String,
    delay: Duration,
    schema: Arc<Valid<Schema>>,
    operations: OperationTable,
    mocks: MockTable,
    resolvers: ResolverTable,
}

/// A handle on one installed mock session.
///
/// Clones share the same underlying state; the handle returned at
/// installation time and the one retrieved by name later in the test refer to
/// the same session.
#[derive(Clone)]
pub struct MockSession {
    state: Arc<Mutex<SessionState>>,
}

impl MockSession {
    pub(crate) fn new(configuration: Configuration) -> Result<Self, SetupError> {
        let schema = configuration
            .schema
            .clone()
            .ok_or(SetupError::SchemaRequired)?
            .build()?;
        Ok(Self {
            state: Arc::new(Mutex::new(SessionState {
                endpoint: configuration.endpoint(),
                delay: configuration.delay(),
                schema,
                operations: configuration.operations,
                mocks: configuration.mocks,
                resolvers: configuration.resolvers,
            })),
        })
    }

    /// The endpoint substring this session intercepts.
    pub fn endpoint(&self) -> String {
        self.state.lock().endpoint.clone()
    }

    /// Applies a partial reconfiguration to this session.
    ///
    /// The delay is replaced wholesale (zero when omitted); the operation
    /// table is shallow-merged with plain override-wins; mock and resolver
    /// tables merge one level deep with overrides winning.
    pub fn apply_overrides(&self, overrides: SessionOverrides) {
        let mut state = self.state.lock();
        state.delay = overrides.delay.unwrap_or(Duration::ZERO);
        state.operations.extend(&overrides.operations);
        state.mocks = state.mocks.merge(&overrides.mocks);
        state.resolvers = state.resolvers.merge(&overrides.resolvers);
    }

    /// Clones the current state for handling one request, so that in-flight
    /// requests are unaffected by later overrides.
    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            endpoint: state.endpoint.clone(),
            delay: state.delay,
            schema: state.schema.clone(),
            operations: state.operations.clone(),
            mocks: state.mocks.clone(),
            resolvers: state.resolvers.clone(),
        }
    }
}

pub(crate) struct SessionSnapshot {
    pub(crate) endpoint: String,
    pub(crate) delay: Duration,
    pub(crate) schema: Arc<Valid<Schema>>,
    pub(crate) operations: OperationTable,
    pub(crate) mocks: MockTable,
    pub(crate) resolvers: ResolverTable,
}

/// A partial reconfiguration applied to an installed session.
#[derive(Clone, Default)]
pub struct SessionOverrides {
    pub(crate) delay: Option<Duration>,
    pub(crate) operations: OperationTable,
    pub(crate) mocks: MockTable,
    pub(crate) resolvers: ResolverTable,
}

#[buildstructor::buildstructor]
impl SessionOverrides {
    /// Returns a builder that builds [`SessionOverrides`] from any subset of
    /// delay, operations, mocks and resolvers.
    #[builder(visibility = "pub")]
    fn new(
        delay: Option<Duration>,
        operations: Option<OperationTable>,
        mocks: Option<MockTable>,
        resolvers: Option<ResolverTable>,
    ) -> Self {
        Self {
            delay,
            operations: operations.unwrap_or_default(),
            mocks: mocks.unwrap_or_default(),
            resolvers: resolvers.unwrap_or_default(),
        }
    }
}
