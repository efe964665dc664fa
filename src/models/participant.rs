use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::participant_entity;

/// 可参与抽奖的人员 (列表展示)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub image_path: Option<String>,
}

impl From<participant_entity::Model> for ParticipantResponse {
    fn from(m: participant_entity::Model) -> Self {
        ParticipantResponse {
            id: m.id,
            name: m.name,
            phone: m.phone,
            image_path: m.image_path,
        }
    }
}

/// 后台管理页使用的完整人员信息 (含中奖状态)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantDetailResponse {
    pub id: i32,
    pub name: String,
    pub phone: Option<String>,
    pub image_path: Option<String>,
    pub is_winner: bool,
    pub prize_id: Option<i32>,
    pub won_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<participant_entity::Model> for ParticipantDetailResponse {
    fn from(m: participant_entity::Model) -> Self {
        ParticipantDetailResponse {
            id: m.id,
            name: m.name,
            phone: m.phone,
            image_path: m.image_path,
            is_winner: m.is_winner,
            prize_id: m.prize_id,
            won_at: m.won_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateParticipantRequest {
    #[schema(example = "Somchai")]
    pub name: String,
    #[schema(example = "0812345678")]
    pub phone: Option<String>,
    /// 由媒体服务返回的图片路径
    #[schema(example = "uploads/participants/20240101_120000_a.png")]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkParticipantsRequest {
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkParticipantsResponse {
    /// 实际创建的人数 (空白名字被跳过)
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}
