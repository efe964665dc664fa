use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use crate::utils::Claims;

/// 已鉴权的调用方
///
/// 由鉴权中间件根据 access token 构造, 由 handler 显式传给 service。
/// service 只依据这里的角色做权限判断, 不读取任何请求上下文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// 访客登录时为空
    pub user_id: Option<i32>,
    pub username: String,
    pub role: UserRole,
}

impl AuthContext {
    pub fn admin(user_id: i32, username: &str) -> Self {
        Self {
            user_id: Some(user_id),
            username: username.to_string(),
            role: UserRole::Admin,
        }
    }

    pub fn guest() -> Self {
        Self {
            user_id: None,
            username: "Guest".to_string(),
            role: UserRole::Guest,
        }
    }

    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.parse::<i32>().ok(),
            username: claims.username.clone(),
            role: claims.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "P@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub role: UserRole,
}
