use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// `{code, message, data}` envelope; the HTTP status mirrors `code`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, "Success", data)
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, data)
    }

    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, "Created", data)
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope with `data: null`.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::created(5)).unwrap();
        assert_eq!(value, serde_json::json!({"code": 201, "message": "Created", "data": 5}));

        let value = serde_json::to_value(ApiResponse::message("Cart cleared")).unwrap();
        assert_eq!(value["data"], serde_json::Value::Null);
    }

    #[test]
    fn test_status_mirrors_code() {
        let response = ApiResponse::created("x").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
