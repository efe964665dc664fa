use crate::entities::participant_entity as participants;
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthContext, BulkParticipantsResponse, CreateParticipantRequest, CreatedResponse,
    ParticipantDetailResponse, ParticipantResponse,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// 批量登记时每条 INSERT 的最大行数
const BULK_INSERT_BATCH: usize = 1000;

#[derive(Clone)]
pub struct ParticipantService {
    pool: DatabaseConnection,
}

/// 去掉首尾空白, 空串视为未填写
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ParticipantService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 可参与抽奖的人员 (未中奖)
    pub async fn list_eligible(&self, ctx: &AuthContext) -> AppResult<Vec<ParticipantResponse>> {
        ctx.require_admin()?;
        let list = participants::Entity::find()
            .filter(participants::Column::IsWinner.eq(false))
            .order_by_asc(participants::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 全部人员 (后台管理页)
    pub async fn list_all(&self, ctx: &AuthContext) -> AppResult<Vec<ParticipantDetailResponse>> {
        ctx.require_admin()?;
        let list = participants::Entity::find()
            .order_by_asc(participants::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn add(
        &self,
        ctx: &AuthContext,
        req: CreateParticipantRequest,
    ) -> AppResult<CreatedResponse> {
        ctx.require_admin()?;
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Name is required".into()));
        }

        let model = participants::ActiveModel {
            name: Set(name.to_string()),
            phone: Set(non_blank(req.phone)),
            image_path: Set(non_blank(req.image_path)),
            is_winner: Set(false),
            prize_id: Set(None),
            won_at: Set(None),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(CreatedResponse { id: model.id })
    }

    /// 批量登记: 每个去空白后非空的名字创建一人, 空白行直接跳过
    pub async fn add_bulk(
        &self,
        ctx: &AuthContext,
        names: &[String],
    ) -> AppResult<BulkParticipantsResponse> {
        ctx.require_admin()?;
        let now = Utc::now();
        let rows: Vec<participants::ActiveModel> = names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(|n| participants::ActiveModel {
                name: Set(n.to_string()),
                is_winner: Set(false),
                created_at: Set(Some(now)),
                ..Default::default()
            })
            .collect();

        let count = rows.len() as u64;
        if count > 0 {
            // 分批插入, 避免超过数据库单条语句的绑定参数上限
            let txn = self.pool.begin().await?;
            let mut rows = rows.into_iter().peekable();
            while rows.peek().is_some() {
                let batch: Vec<_> = rows.by_ref().take(BULK_INSERT_BATCH).collect();
                participants::Entity::insert_many(batch).exec(&txn).await?;
            }
            txn.commit().await?;
        }
        log::info!("{} registered {count} participant(s) in bulk", ctx.username);
        Ok(BulkParticipantsResponse { count })
    }

    /// 删除人员; 已有的抽奖历史快照保留
    pub async fn delete(&self, ctx: &AuthContext, id: i32) -> AppResult<()> {
        ctx.require_admin()?;
        let result = participants::Entity::delete_by_id(id)
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Participant {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::{admin, guest, setup_db};

    #[tokio::test]
    async fn test_bulk_skips_blank_names() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let names: Vec<String> = ["  Alice ", "", "   ", "Bob", "\t", "Carol"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let created = service.add_bulk(&admin(), &names).await.unwrap();
        assert_eq!(created.count, 3);

        let list = service.list_eligible(&admin()).await.unwrap();
        let got: Vec<&str> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(got, vec!["Alice", "Bob", "Carol"]);
    }

    #[tokio::test]
    async fn test_bulk_registers_large_roster_in_batches() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let total = BULK_INSERT_BATCH * 2 + 500;
        let names: Vec<String> = (0..total).map(|i| format!("Guest {i}")).collect();

        let created = service.add_bulk(&admin(), &names).await.unwrap();
        assert_eq!(created.count, total as u64);

        let list = service.list_eligible(&admin()).await.unwrap();
        assert_eq!(list.len(), total);
        assert_eq!(list[0].name, "Guest 0");
        assert_eq!(list[total - 1].name, format!("Guest {}", total - 1));
    }

    #[tokio::test]
    async fn test_bulk_with_only_blank_names_creates_nothing() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        let created = service
            .add_bulk(&admin(), &[" ".to_string(), String::new()])
            .await
            .unwrap();
        assert_eq!(created.count, 0);
        assert!(service.list_all(&admin()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_and_delete_participant() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());

        assert!(matches!(
            service
                .add(
                    &admin(),
                    CreateParticipantRequest {
                        name: "  ".into(),
                        phone: None,
                        image_path: None,
                    },
                )
                .await,
            Err(AppError::ValidationError(_))
        ));

        let created = service
            .add(
                &admin(),
                CreateParticipantRequest {
                    name: "Dave".into(),
                    phone: Some("".into()),
                    image_path: Some("uploads/participants/dave.png".into()),
                },
            )
            .await
            .unwrap();

        let all = service.list_all(&admin()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].phone, None);
        assert!(!all[0].is_winner);

        service.delete(&admin(), created.id).await.unwrap();
        assert!(matches!(
            service.delete(&admin(), created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_guest_cannot_manage_participants() {
        let db = setup_db().await;
        let service = ParticipantService::new(db.clone());
        assert!(matches!(
            service.add_bulk(&guest(), &["x".to_string()]).await,
            Err(AppError::PermissionDenied)
        ));
        assert!(matches!(
            service.list_eligible(&guest()).await,
            Err(AppError::PermissionDenied)
        ));
    }
}
