use crate::config::BootstrapConfig;
use crate::entities::{UserRole, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest};
use crate::utils::{GUEST_SUBJECT, JwtService, hash_password, validate_password, verify_password};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// 账号密码登录, 只允许启用状态的账号
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(request.username.trim()))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        let is_valid = verify_password(&request.password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        let access_token = self.jwt_service.generate_access_token(
            &user.id.to_string(),
            &user.username,
            user.role,
        )?;

        log::info!("User {} logged in as {}", user.username, user.role);
        Ok(AuthResponse {
            access_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            username: user.username,
            display_name: user.display_name,
            role: user.role,
        })
    }

    /// 访客登录: 只能查看结果
    pub fn guest_login(&self) -> AppResult<AuthResponse> {
        let access_token =
            self.jwt_service
                .generate_access_token(GUEST_SUBJECT, "Guest", UserRole::Guest)?;
        Ok(AuthResponse {
            access_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            username: "Guest".to_string(),
            display_name: None,
            role: UserRole::Guest,
        })
    }

    /// 启动时确保引导管理员存在; 返回是否新建
    pub async fn ensure_default_admin(&self, bootstrap: &BootstrapConfig) -> AppResult<bool> {
        let exists = users::Entity::find()
            .filter(users::Column::Username.eq(bootstrap.admin_username.as_str()))
            .one(&self.pool)
            .await?
            .is_some();
        if exists {
            return Ok(false);
        }

        validate_password(&bootstrap.admin_password)?;
        let now = Utc::now();
        users::ActiveModel {
            username: Set(bootstrap.admin_username.clone()),
            password_hash: Set(hash_password(&bootstrap.admin_password)?),
            display_name: Set(bootstrap.admin_display_name.clone()),
            role: Set(UserRole::Admin),
            is_active: Set(true),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Created bootstrap admin account {}", bootstrap.admin_username);
        Ok(true)
    }
}
