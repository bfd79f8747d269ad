//! Intercepts outbound GraphQL requests inside a test harness and substitutes
//! locally computed mock responses.
//!
//! Test setup declares a schema and per-operation mock data once; the
//! interceptor wraps the test's outbound HTTP client as a [`tower::Layer`]
//! and short-circuits every POST targeting the configured endpoint, so no
//! mocked request ever reaches a real backend. Everything else passes
//! through untouched.
//!
//! ```no_run
//! use graphql_mock::Configuration;
//! use graphql_mock::MockHarness;
//! use graphql_mock::OperationMock;
//! use graphql_mock::OperationTable;
//! use serde_json_bytes::json;
//!
//! # fn client() -> impl tower::Service<
//! #     http::Request<bytes::Bytes>,
//! #     Response = http::Response<bytes::Bytes>,
//! #     Error = tower::BoxError,
//! # > + Send + 'static { unimplemented!() }
//! # fn main() -> Result<(), graphql_mock::SetupError> {
//! let harness = MockHarness::new();
//! harness.mock_graphql(
//!     Configuration::builder()
//!         .schema("type Query { pong: Boolean }")
//!         .operations(
//!             OperationTable::new()
//!                 .with_operation("Ping", OperationMock::handler(|_| Ok(json!({"pong": true})))),
//!         )
//!         .build(),
//! )?;
//! let service = harness.intercept(client());
//! # let _ = service;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

mod configuration;
mod execution;
mod harness;
mod intercept;
mod mocks;
mod operation;
mod schema;
mod session;

pub mod error;
pub mod graphql;
pub mod json_ext;

pub use configuration::Configuration;
pub use configuration::DEFAULT_ENDPOINT;
pub use error::SetupError;
pub use harness::MockHarness;
pub use harness::set_base_configuration;
pub use harness::set_base_mocks;
pub use intercept::InterceptLayer;
pub use intercept::InterceptService;
pub use mocks::FieldResolver;
pub use mocks::FieldResolvers;
pub use mocks::MockFn;
pub use mocks::MockTable;
pub use mocks::MockValue;
pub use mocks::ResolvedMocks;
pub use mocks::ResolverEntry;
pub use mocks::ResolverTable;
pub use operation::OperationFn;
pub use operation::OperationMock;
pub use operation::OperationTable;
pub use operation::RootValue;
pub use schema::SchemaSource;
pub use session::MockSession;
pub use session::SessionOverrides;
