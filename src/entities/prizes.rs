use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 奖品实体
/// 概念说明:
/// - quantity: 奖品总名额
/// - claimed_count: 已抽出的名额 (只由抽奖引擎递增, reset 归零)
/// - remaining / is_available 为派生值, 不落库
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// 展示颜色 (为空时由 color_for 回退)
    pub color: Option<String>,
    /// 查询用的二维码编号
    pub qr_code: Option<String>,
    pub image_path: Option<String>,
    /// 大奖分类
    pub is_grand: bool,
    pub quantity: i32,
    pub claimed_count: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 剩余名额
    pub fn remaining(&self) -> i32 {
        self.quantity - self.claimed_count
    }

    pub fn is_available(&self) -> bool {
        self.remaining() > 0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
