use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::MethodRouter,
};
use http_body::{Body as _, Frame, SizeHint};
use ldlmt_core::{Admission, AdmissionGate, ErrorMetadata, GateError, WeightedGate};

use crate::error::HttpGateError;

/// Load limiting middleware
///
/// Runs the admission protocol of the [`WeightedGate`] in state before the inner
/// handler. Admitted requests are handed to `next` untouched and the handler's response
/// is returned as-is. The gate's capacity stays held until the response body has been
/// fully sent, has failed, or has been dropped, so a streaming body counts against the
/// gate for as long as it streams.
/// Rejected requests never reach the handler and get `503 Service Unavailable` with a
/// plain-text body.
///
/// ```rust,ignore
/// let gate = Arc::new(AdmissionGate::new(10, 50, Duration::from_millis(200)));
/// let app = Router::new().route(
///     "/reports",
///     get(reports).route_layer(axum::middleware::from_fn_with_state(
///         gate.weighted(4),
///         load_limit_middleware,
///     )),
/// );
/// ```
pub async fn load_limit_middleware(
    State(limit): State<WeightedGate>,
    request: Request,
    next: Next,
) -> Response {
    let admission = match limit.admit().await {
        Ok(admission) => admission,
        Err(err) => {
            log_rejection(&err, limit.weight(), request.method().as_str(), request.uri().path());
            return HttpGateError(err).into_response();
        }
    };

    next.run(request).await.map(|body| {
        Body::new(AdmittedBody {
            inner: body,
            admission: Some(admission),
        })
    })
}

/// Wrap one route's handlers with `gate`, charging `weight` capacity units per request.
///
/// Every route wrapped with the same gate draws from the same waiter and capacity pools.
pub fn apply<S>(gate: &Arc<AdmissionGate>, weight: u32, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(axum::middleware::from_fn_with_state(
        gate.weighted(weight),
        load_limit_middleware,
    ))
}

// Rejections are expected under load and always recoverable, hence a single level.
fn log_rejection(error: &GateError, weight: u32, method: &str, path: &str) {
    tracing::warn!(
        error = %error,
        error_code = error.error_code(),
        weight,
        method,
        path,
        "Request rejected by load limiter"
    );
}

/// Response body that owns the request's [`Admission`].
///
/// The admission is released on the final frame or the first error, and otherwise
/// when the body is dropped.
struct AdmittedBody {
    inner: Body,
    admission: Option<Admission>,
}

impl http_body::Body for AdmittedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let frame = ready!(Pin::new(&mut this.inner).poll_frame(cx));
        if !matches!(frame, Some(Ok(_))) {
            this.admission.take();
        }
        Poll::Ready(frame)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
