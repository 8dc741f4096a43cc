use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::{DomainError, StockShortfall};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Insufficient stock")]
    Stock(Vec<StockShortfall>),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            DomainError::InvalidInput(msg) => AppError::Validation(msg),
            DomainError::InsufficientStock(items) => AppError::Stock(items),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Forbidden(msg) => AppError::Forbidden(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Stock(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AppError::Stock(items) => builder.json(serde_json::json!({
                "error": self.to_string(),
                "items": items
            })),
            AppError::Internal(detail) => {
                log::error!("request failed: {detail}");
                builder.json(serde_json::json!({
                    "error": "Internal server error"
                }))
            }
            _ => builder.json(serde_json::json!({
                "error": self.to_string()
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    async fn body_json(err: AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body())
            .await
            .expect("readable body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (AppError::NotFound("Order x not found".to_string()), StatusCode::NOT_FOUND),
            (AppError::Validation("bad".to_string()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::Stock(vec![]), StatusCode::CONFLICT),
            (AppError::Conflict("dup".to_string()), StatusCode::CONFLICT),
            (AppError::Forbidden("no".to_string()), StatusCode::FORBIDDEN),
            (AppError::Unauthorized("who".to_string()), StatusCode::UNAUTHORIZED),
            (AppError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.error_response().status(), status, "{err:?}");
        }
    }

    #[test]
    fn domain_errors_map_to_app_errors() {
        let app_err: AppError = DomainError::NotFound("Product 9".to_string()).into();
        assert!(matches!(app_err, AppError::NotFound(ref m) if m == "Product 9 not found"));

        let app_err: AppError = DomainError::InvalidInput("bad value".to_string()).into();
        assert!(matches!(app_err, AppError::Validation(_)));

        let app_err: AppError = DomainError::Forbidden("admin may not ViewActivityLog".to_string()).into();
        assert!(matches!(app_err, AppError::Forbidden(_)));

        let app_err: AppError = DomainError::Internal("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[actix_web::test]
    async fn stock_errors_list_every_short_line() {
        let body = body_json(AppError::Stock(vec![StockShortfall {
            product_id: 4,
            name: "Precision Grinder".to_string(),
            requested: 3,
            available: 1,
        }]))
        .await;
        assert_eq!(body["error"], "Insufficient stock");
        assert_eq!(body["items"][0]["product_id"], 4);
        assert_eq!(body["items"][0]["available"], 1);
    }

    #[actix_web::test]
    async fn internal_errors_hide_details() {
        let body = body_json(AppError::Internal("connection refused".to_string())).await;
        assert_eq!(body["error"], "Internal server error");
    }
}
