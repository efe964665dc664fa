use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::prize_entity;

pub const DEFAULT_PRIZE_COLOR: &str = "#00d4ff";

/// 奖品完整信息 (remaining 为计算值)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub qr_code: Option<String>,
    pub image_path: Option<String>,
    pub is_grand: bool,
    pub quantity: i32,
    pub claimed_count: i32,
    pub remaining: i32,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<prize_entity::Model> for PrizeResponse {
    fn from(m: prize_entity::Model) -> Self {
        let remaining = m.remaining();
        PrizeResponse {
            id: m.id,
            name: m.name,
            description: m.description,
            color: m.color,
            qr_code: m.qr_code,
            image_path: m.image_path,
            is_grand: m.is_grand,
            quantity: m.quantity,
            claimed_count: m.claimed_count,
            remaining,
            created_at: m.created_at,
        }
    }
}

/// 奖品列表过滤条件
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PrizeQuery {
    /// 只看大奖 / 只看普通奖
    pub is_grand: Option<bool>,
    /// 只返回还有剩余名额的奖品
    pub available: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePrizeRequest {
    #[schema(example = "Bike")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "#ff6b35")]
    pub color: Option<String>,
    pub qr_code: Option<String>,
    pub image_path: Option<String>,
    #[serde(default)]
    pub is_grand: bool,
    /// 默认 1
    pub quantity: Option<i32>,
}

/// 所有字段可选, 只更新提供的字段
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePrizeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub qr_code: Option<String>,
    pub image_path: Option<String>,
    pub is_grand: Option<bool>,
    pub quantity: Option<i32>,
}
