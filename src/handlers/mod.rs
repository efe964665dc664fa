pub mod auth;
pub mod draw;
pub mod participant;
pub mod prize;

pub use auth::auth_config;
pub use draw::draw_config;
pub use participant::participant_config;
pub use prize::prize_config;

use crate::error::{AppError, AppResult};
use crate::models::AuthContext;
use actix_web::{HttpMessage, HttpRequest};

/// 从请求扩展中获取调用方（中间件在鉴权后注入）
fn auth_context(req: &HttpRequest) -> AppResult<AuthContext> {
    req.extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}
