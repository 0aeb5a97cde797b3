//! HTTP error response conversion
//!
//! `IntoResponse` cannot be implemented for `ldlmt_core::GateError` here because of the
//! orphan rule, so rejections go through the [`HttpGateError`] wrapper.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ldlmt_core::{ErrorMetadata, GateError};

/// Wrapper type for GateError to implement IntoResponse
#[derive(Debug)]
pub struct HttpGateError(pub GateError);

impl From<GateError> for HttpGateError {
    fn from(err: GateError) -> Self {
        HttpGateError(err)
    }
}

impl IntoResponse for HttpGateError {
    /// Plain-text rejection: status from the error metadata (503), fixed short body.
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);

        (status, self.0.client_message()).into_response()
    }
}
