//! Request interception.
//!
//! [`InterceptService`] wraps an inner HTTP client service and short-circuits
//! every POST whose URL contains a registered session endpoint, responding
//! with a locally computed mock response; everything else passes through to
//! the inner service untouched. Matching requests never reach the real
//! network.

use std::task::Poll;

use bytes::Bytes;
use futures::future::BoxFuture;
use http::StatusCode;
use serde_json_bytes::Value;
use tower::BoxError;
use tower::Layer;
use tower::Service;

use crate::execution;
use crate::graphql;
use crate::harness;
use crate::json_ext::Object;
use crate::operation::RootValue;
use crate::session::MockSession;
use crate::session::SessionSnapshot;
use crate::session::Sessions;

/// Layers [`InterceptService`] over an inner client service.
///
/// Obtained from [`crate::MockHarness::layer`]; sessions installed after the
/// layer is applied are still visible to the wrapped service.
#[derive(Clone)]
pub struct InterceptLayer {
    sessions: Sessions,
}

impl InterceptLayer {
    pub(crate) fn new(sessions: Sessions) -> Self {
        Self { sessions }
    }
}

impl<S> Layer<S> for InterceptLayer {
    type Service = InterceptService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptService {
            sessions: self.sessions.clone(),
            inner,
        }
    }
}

/// The interceptor itself, a [`tower::Service`] over buffered HTTP requests.
#[derive(Clone)]
pub struct InterceptService<S> {
    sessions: Sessions,
    inner: S,
}

impl<S> InterceptService<S> {
    /// Finds the first registered session whose endpoint the request targets,
    /// in installation order.
    fn matching_session(&self, req: &http::Request<Bytes>) -> Option<MockSession> {
        if req.method() != http::Method::POST {
            return None;
        }
        let url = req.uri().to_string();
        self.sessions
            .lock()
            .values()
            .find(|session| url.contains(&session.endpoint()))
            .cloned()
    }
}

impl<S> Service<http::Request<Bytes>> for InterceptService<S>
where
    S: Service<http::Request<Bytes>, Response = http::Response<Bytes>, Error = BoxError>
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = http::Response<Bytes>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<Bytes>) -> Self::Future {
        match self.matching_session(&req) {
            None => {
                tracing::debug!(uri = %req.uri(), method = %req.method(), "passing request through");
                Box::pin(self.inner.call(req))
            }
            Some(session) => {
                let snapshot = session.snapshot();
                Box::pin(async move { respond(snapshot, req).await })
            }
        }
    }
}

/// Runs the full mock pipeline for one intercepted request: decode the
/// envelope, resolve the root value, execute, apply the delay, respond.
async fn respond(
    session: SessionSnapshot,
    req: http::Request<Bytes>,
) -> Result<http::Response<Bytes>, BoxError> {
    // A malformed body is deliberately unhandled here: the error propagates
    // to the calling test.
    let request: graphql::Request = serde_json::from_slice(req.body())?;
    tracing::debug!(
        endpoint = %session.endpoint,
        operation_name = ?request.operation_name,
        "intercepted graphql request"
    );

    let root = session
        .operations
        .resolve_root(request.operation_name.as_deref(), &request.variables);
    let response = match root {
        RootValue::SimulatedError(error) => graphql::Response::builder()
            .data(Value::Object(Object::default()))
            .error(error)
            .build(),
        RootValue::Data(value) => {
            // Base mocks merge under the session's own; resolver tables are
            // per-session only.
            let mocks = match harness::base_mocks() {
                Some(base) => base.merge(&session.mocks),
                None => session.mocks.clone(),
            };
            let root = value.as_object().cloned().unwrap_or_default();
            let result = execution::execute(
                &session.schema,
                &request,
                root,
                mocks.resolve(),
                &session.resolvers,
            );
            match result {
                Ok(response) => response,
                Err(errors) => graphql::Response::builder()
                    .errors(errors.into_iter().map(Into::into).collect())
                    .build(),
            }
        }
    };

    if !session.delay.is_zero() {
        tokio::time::sleep(session.delay).await;
    }

    let body = Bytes::from(serde_json::to_vec(&response)?);
    Ok(http::Response::builder()
        .status(StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body)
        .expect("response is valid; qed"))
}
