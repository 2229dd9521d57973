//! Success envelope shared by every handler: `{"status": <code>, "data": <payload>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    code: StatusCode,
    status: u16,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(code: StatusCode, data: T) -> Self {
        Self {
            code,
            status: code.as_u16(),
            data,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, data)
    }
}

impl ApiResponse<()> {
    /// Acknowledgement with `"data": null`.
    pub fn ack() -> Self {
        Self::new(StatusCode::OK, ())
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}
