use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽奖历史实体
/// 说明:
/// - 每个中奖者一条记录, 只追加不修改
/// - participant_name / prize_name / is_grand 为抽奖时刻的快照,
///   之后修改奖品或删除参与者都不影响历史
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "draw_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub participant_name: String,
    pub prize_name: String,
    pub is_grand: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
