use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, RuntimeErr};
use serde_json::{Value, json};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Prize {0} not found")]
    PrizeNotFound(i32),

    #[error("Prize \"{prize_name}\" has insufficient stock (remaining {remaining})")]
    InsufficientStock { prize_name: String, remaining: i32 },

    #[error("Not enough eligible participants (remaining {available})")]
    InsufficientParticipants { available: usize },

    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// 可整体重试的数据库错误码:
/// PostgreSQL 死锁 (40P01) / 序列化失败 (40001), SQLite BUSY (5, 261, 517) / LOCKED (6)
const RETRYABLE_DB_CODES: [&str; 6] = ["40P01", "40001", "5", "261", "517", "6"];

fn retryable_db_error(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Exec(e) | DbErr::Query(e) | DbErr::Conn(e) => e,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sea_orm::SqlxError::Database(db_err)) => {
            let code = db_err.code()?;
            RETRYABLE_DB_CODES
                .contains(&code.as_ref())
                .then(|| format!("{} (code {code})", db_err.message()))
        }
        _ => None,
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match retryable_db_error(&err) {
            Some(reason) => AppError::ConcurrencyConflict(reason),
            None => AppError::DatabaseError(err),
        }
    }
}

impl AppError {
    /// 业务错误附带的实际可用数量, 便于调用方调整请求
    fn details(&self) -> Option<Value> {
        match self {
            AppError::InsufficientStock {
                prize_name,
                remaining,
            } => Some(json!({ "prize_name": prize_name, "remaining": remaining })),
            AppError::InsufficientParticipants { available } => {
                Some(json!({ "available": available }))
            }
            AppError::PrizeNotFound(id) => Some(json!({ "prize_id": id })),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::PrizeNotFound(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "PRIZE_NOT_FOUND",
                self.to_string(),
            ),
            AppError::InsufficientStock { .. } => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INSUFFICIENT_PRIZE_STOCK",
                self.to_string(),
            ),
            AppError::InsufficientParticipants { .. } => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INSUFFICIENT_PARTICIPANTS",
                self.to_string(),
            ),
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::JwtError(err) => {
                log::warn!("Token rejected: {err}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    "Invalid access token".to_string(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::PermissionDenied => {
                log::warn!("Permission denied");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Permission denied".to_string(),
                )
            }
            AppError::ConcurrencyConflict(msg) => {
                log::warn!("Concurrency conflict: {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "CONCURRENCY_CONFLICT",
                    "Concurrent update detected, please retry".to_string(),
                )
            }
            AppError::DatabaseError(err @ (DbErr::Conn(_) | DbErr::ConnectionAcquire(_))) => {
                log::error!("Store unavailable: {err}");
                (
                    actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "Store unavailable".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            AppError::InternalError(_) => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": error_code,
            "message": message
        });
        if let Some(details) = self.details() {
            error["details"] = details;
        }

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": error
        }))
    }
}
