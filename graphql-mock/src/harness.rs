//! Test-runner integration.
//!
//! [`MockHarness`] is the surface a test-automation harness drives: one call
//! installs a fully configured mock session, another applies incremental
//! overrides to an already-installed session identified by name. The
//! process-wide base mock table and base configuration live here too, each
//! settable exactly once during global suite initialization.

use std::sync::Arc;
use std::sync::OnceLock;

use crate::configuration::Configuration;
use crate::configuration::DEFAULT_ENDPOINT;
use crate::error::SetupError;
use crate::intercept::InterceptLayer;
use crate::intercept::InterceptService;
use crate::mocks::MockTable;
use crate::session::MockSession;
use crate::session::SessionOverrides;
use crate::session::Sessions;

static BASE_MOCKS: OnceLock<MockTable> = OnceLock::new();
static BASE_CONFIGURATION: OnceLock<Configuration> = OnceLock::new();

/// Registers the process-wide base mock table.
///
/// Callable at most once per process lifetime; the base mocks are merged
/// under every session's own mocks on each intercepted request. A second
/// call fails and leaves the original table untouched.
pub fn set_base_mocks(mocks: MockTable) -> Result<(), SetupError> {
    BASE_MOCKS
        .set(mocks)
        .map_err(|_| SetupError::BaseMocksAlreadySet)
}

/// Registers the process-wide base configuration.
///
/// Callable at most once per process lifetime; every installation layers its
/// per-test configuration over this one. A second call fails and leaves the
/// original untouched.
pub fn set_base_configuration(configuration: Configuration) -> Result<(), SetupError> {
    BASE_CONFIGURATION
        .set(configuration)
        .map_err(|_| SetupError::BaseConfigurationAlreadySet)
}

pub(crate) fn base_mocks() -> Option<&'static MockTable> {
    BASE_MOCKS.get()
}

fn base_configuration() -> Option<&'static Configuration> {
    BASE_CONFIGURATION.get()
}

/// The per-test mock harness.
///
/// Create one per test, install sessions on it, and wrap the test's outbound
/// HTTP client with [`MockHarness::intercept`] (or [`MockHarness::layer`]).
/// Dropping the harness at test teardown destroys every session it
/// registered.
#[derive(Clone, Default)]
pub struct MockHarness {
    sessions: Sessions,
}

impl MockHarness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a mock session from a full configuration.
    ///
    /// The per-test configuration is layered over the base configuration if
    /// one was registered; fails fast with [`SetupError::SchemaRequired`]
    /// when no schema is resolvable from either. The session registers under
    /// its name (else endpoint, else the default key) and the returned handle
    /// can be used for later overrides directly.
    pub fn mock_graphql(&self, configuration: Configuration) -> Result<MockSession, SetupError> {
        let effective = match base_configuration() {
            Some(base) => configuration.layered_over(base),
            None => configuration,
        };
        let key = effective.session_key();
        let endpoint = effective.endpoint();
        let session = MockSession::new(effective)?;
        tracing::info!(name = %key, endpoint = %endpoint, "installed graphql mock session");
        self.sessions.lock().insert(key, session.clone());
        Ok(session)
    }

    /// Applies incremental overrides to an installed session.
    ///
    /// `name` is the key the session registered under; pass `None` for the
    /// default session.
    pub fn mock_graphql_ops(
        &self,
        name: Option<&str>,
        overrides: SessionOverrides,
    ) -> Result<(), SetupError> {
        let key = name.unwrap_or(DEFAULT_ENDPOINT);
        let sessions = self.sessions.lock();
        let session = sessions.get(key).ok_or_else(|| SetupError::UnknownSession {
            name: key.to_owned(),
        })?;
        session.apply_overrides(overrides);
        Ok(())
    }

    /// Retrieves the handle of an installed session by its registry key.
    pub fn session(&self, name: &str) -> Option<MockSession> {
        self.sessions.lock().get(name).cloned()
    }

    /// A layer wrapping any client service with this harness's interceptor.
    pub fn layer(&self) -> InterceptLayer {
        InterceptLayer::new(Arc::clone(&self.sessions))
    }

    /// Wraps the given client service with this harness's interceptor.
    pub fn intercept<S>(&self, inner: S) -> InterceptService<S> {
        use tower::Layer;
        self.layer().layer(inner)
    }
}
