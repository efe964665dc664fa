use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::draw_history_entity;
use crate::error::{AppError, AppResult};

use super::{ParticipantResponse, PrizeResponse};

/// 抽奖请求
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpinRequest {
    /// 选中的奖品
    pub prize_id: Option<i32>,
    /// 本次抽出的人数 (默认 1)
    pub count: Option<i64>,
}

impl SpinRequest {
    pub fn new(prize_id: i32, count: i64) -> Self {
        Self {
            prize_id: Some(prize_id),
            count: Some(count),
        }
    }

    /// 校验并返回 (prize_id, count)
    pub fn validate(&self) -> AppResult<(i32, i32)> {
        let prize_id = self
            .prize_id
            .ok_or_else(|| AppError::ValidationError("Please select a prize first".into()))?;
        let count = self.count.unwrap_or(1);
        if count < 1 {
            return Err(AppError::ValidationError(
                "Count must be a positive integer".into(),
            ));
        }
        let count = i32::try_from(count)
            .map_err(|_| AppError::ValidationError("Count is too large".into()))?;
        Ok((prize_id, count))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct SpinWinner {
    pub winner_id: i32,
    pub winner_name: String,
    pub prize_id: i32,
    pub prize_name: String,
    pub is_grand: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SpinResponse {
    /// 按抽中顺序排列
    pub winners: Vec<SpinWinner>,
    /// 抽奖后奖品剩余名额
    pub prize_remaining: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ResetSummary {
    pub participants_reset: u64,
    pub prizes_reset: u64,
    pub history_deleted: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
pub struct ClearSummary {
    pub participants_deleted: u64,
    pub prizes_deleted: u64,
    pub history_deleted: u64,
}

/// 抽奖历史记录
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub id: i32,
    pub participant_name: String,
    pub prize_name: String,
    pub is_grand: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<draw_history_entity::Model> for HistoryEntryResponse {
    fn from(m: draw_history_entity::Model) -> Self {
        HistoryEntryResponse {
            id: m.id,
            participant_name: m.participant_name,
            prize_name: m.prize_name,
            is_grand: m.is_grand,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub per_page: Option<u32>,
}

/// 结果页 (访客可见)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResultsResponse {
    /// 新的在前
    pub history: Vec<HistoryEntryResponse>,
    pub non_winners: Vec<ParticipantResponse>,
    pub unclaimed_prizes: Vec<PrizeResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoardParticipant {
    pub id: i32,
    pub name: String,
    pub image_path: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoardPrize {
    pub id: i32,
    pub name: String,
    pub is_grand: bool,
    /// 已解析的展示颜色
    pub color: String,
    pub qr_code: String,
    pub image_path: String,
    pub quantity: i32,
    pub remaining: i32,
}

/// 抽奖页数据
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpinBoardResponse {
    pub total_participants: u64,
    pub participants: Vec<BoardParticipant>,
    pub grand_prizes: Vec<BoardPrize>,
    pub normal_prizes: Vec<BoardPrize>,
    pub total_grand_remaining: i64,
    pub total_normal_remaining: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spin_request_defaults_count_to_one() {
        let req: SpinRequest = serde_json::from_str(r#"{"prize_id": 3}"#).unwrap();
        assert_eq!(req.validate().unwrap(), (3, 1));
    }

    #[test]
    fn test_spin_request_rejects_missing_prize_and_bad_count() {
        let req = SpinRequest {
            prize_id: None,
            count: Some(1),
        };
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));

        assert!(matches!(
            SpinRequest::new(1, 0).validate(),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            SpinRequest::new(1, -4).validate(),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            SpinRequest::new(1, i64::from(i32::MAX) + 1).validate(),
            Err(AppError::ValidationError(_))
        ));
    }
}
