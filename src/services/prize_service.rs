use crate::entities::prize_entity as prizes;
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthContext, CreatePrizeRequest, CreatedResponse, DEFAULT_PRIZE_COLOR, PrizeQuery,
    PrizeResponse, UpdatePrizeRequest,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Clone)]
pub struct PrizeService {
    pool: DatabaseConnection,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError("Prize name is required".into()));
    }
    Ok(name.to_string())
}

fn validate_quantity(quantity: i32) -> AppResult<i32> {
    if quantity < 1 {
        return Err(AppError::ValidationError(
            "Quantity must be at least 1".into(),
        ));
    }
    Ok(quantity)
}

impl PrizeService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 奖品列表, 可按大奖分类和是否还有名额过滤
    pub async fn list(
        &self,
        ctx: &AuthContext,
        query: &PrizeQuery,
    ) -> AppResult<Vec<PrizeResponse>> {
        ctx.require_admin()?;
        let mut select = prizes::Entity::find();
        if let Some(is_grand) = query.is_grand {
            select = select.filter(prizes::Column::IsGrand.eq(is_grand));
        }
        if query.available.unwrap_or(false) {
            select = select.filter(
                Expr::col(prizes::Column::ClaimedCount).lt(Expr::col(prizes::Column::Quantity)),
            );
        }
        let list = select
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn create(
        &self,
        ctx: &AuthContext,
        req: CreatePrizeRequest,
    ) -> AppResult<CreatedResponse> {
        ctx.require_admin()?;
        let name = validate_name(&req.name)?;
        let quantity = validate_quantity(req.quantity.unwrap_or(1))?;
        let now = Utc::now();

        let model = prizes::ActiveModel {
            name: Set(name),
            description: Set(non_blank(req.description)),
            color: Set(Some(
                req.color
                    .map(|c| c.trim().to_string())
                    .unwrap_or_else(|| DEFAULT_PRIZE_COLOR.to_string()),
            )),
            qr_code: Set(non_blank(req.qr_code)),
            image_path: Set(non_blank(req.image_path)),
            is_grand: Set(req.is_grand),
            quantity: Set(quantity),
            claimed_count: Set(0),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Prize \"{}\" ({}) created by {} with {} slot(s)",
            model.name,
            model.id,
            ctx.username,
            model.quantity
        );
        Ok(CreatedResponse { id: model.id })
    }

    /// 更新奖品
    ///
    /// 单条条件 UPDATE: 新的 quantity 不得小于当前 claimed_count,
    /// 与并发抽奖同时进行时也不会出现剩余名额为负。
    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: i32,
        req: UpdatePrizeRequest,
    ) -> AppResult<PrizeResponse> {
        ctx.require_admin()?;

        let mut update = prizes::Entity::update_many()
            .col_expr(prizes::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(prizes::Column::Id.eq(id));

        if let Some(name) = &req.name {
            update = update.col_expr(prizes::Column::Name, Expr::value(validate_name(name)?));
        }
        if let Some(description) = req.description {
            update = update.col_expr(
                prizes::Column::Description,
                Expr::value(non_blank(Some(description))),
            );
        }
        if let Some(color) = req.color {
            update = update.col_expr(prizes::Column::Color, Expr::value(color.trim().to_string()));
        }
        if let Some(qr_code) = req.qr_code {
            update = update.col_expr(prizes::Column::QrCode, Expr::value(non_blank(Some(qr_code))));
        }
        if let Some(image_path) = req.image_path {
            update = update.col_expr(
                prizes::Column::ImagePath,
                Expr::value(non_blank(Some(image_path))),
            );
        }
        if let Some(is_grand) = req.is_grand {
            update = update.col_expr(prizes::Column::IsGrand, Expr::value(is_grand));
        }
        if let Some(quantity) = req.quantity {
            let quantity = validate_quantity(quantity)?;
            update = update
                .col_expr(prizes::Column::Quantity, Expr::value(quantity))
                .filter(prizes::Column::ClaimedCount.lte(quantity));
        }

        let result = update.exec(&self.pool).await?;
        let current = prizes::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prize {id} not found")))?;

        if result.rows_affected == 0 {
            return Err(AppError::ValidationError(format!(
                "Quantity cannot be lower than the {} slot(s) already drawn",
                current.claimed_count
            )));
        }
        Ok(current.into())
    }

    /// 删除奖品; 已有中奖者时拒绝 (需先 reset)
    pub async fn delete(&self, ctx: &AuthContext, id: i32) -> AppResult<()> {
        ctx.require_admin()?;
        let result = prizes::Entity::delete_many()
            .filter(prizes::Column::Id.eq(id))
            .filter(prizes::Column::ClaimedCount.eq(0))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 1 {
            log::info!("Prize {id} deleted by {}", ctx.username);
            return Ok(());
        }

        match prizes::Entity::find_by_id(id).one(&self.pool).await? {
            None => Err(AppError::NotFound(format!("Prize {id} not found"))),
            Some(p) => Err(AppError::ValidationError(format!(
                "Prize \"{}\" already has {} winner(s), reset the draw before deleting it",
                p.name, p.claimed_count
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::{admin, guest, insert_participants, setup_db};
    use crate::models::SpinRequest;
    use crate::services::DrawService;

    fn create_req(name: &str, quantity: Option<i32>, is_grand: bool) -> CreatePrizeRequest {
        CreatePrizeRequest {
            name: name.into(),
            description: None,
            color: None,
            qr_code: None,
            image_path: None,
            is_grand,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_and_filters() {
        let db = setup_db().await;
        let service = PrizeService::new(db.clone());

        let bike = service
            .create(&admin(), create_req("Bike", None, true))
            .await
            .unwrap();
        service
            .create(&admin(), create_req("Cup", Some(3), false))
            .await
            .unwrap();
        assert!(matches!(
            service.create(&admin(), create_req("Zero", Some(0), false)).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service.create(&admin(), create_req(" ", None, false)).await,
            Err(AppError::ValidationError(_))
        ));

        let all = service.list(&admin(), &PrizeQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, bike.id);
        assert_eq!(all[0].quantity, 1);
        assert_eq!(all[0].remaining, 1);
        assert_eq!(all[0].color.as_deref(), Some(DEFAULT_PRIZE_COLOR));

        let grand = service
            .list(
                &admin(),
                &PrizeQuery {
                    is_grand: Some(true),
                    available: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(grand.len(), 1);
        assert_eq!(grand[0].name, "Bike");

        // 抽完 Bike 后 available 过滤掉它
        insert_participants(&db, &["A", "B"]).await;
        DrawService::new(db.clone(), 3)
            .spin(&admin(), &SpinRequest::new(bike.id, 1))
            .await
            .unwrap();
        let available = service
            .list(
                &admin(),
                &PrizeQuery {
                    is_grand: None,
                    available: Some(true),
                },
            )
            .await
            .unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].name, "Cup");
    }

    #[tokio::test]
    async fn test_update_cannot_drop_quantity_below_claimed() {
        let db = setup_db().await;
        let service = PrizeService::new(db.clone());
        let created = service
            .create(&admin(), create_req("Cup", Some(3), false))
            .await
            .unwrap();
        insert_participants(&db, &["A", "B", "C"]).await;
        DrawService::new(db.clone(), 3)
            .spin(&admin(), &SpinRequest::new(created.id, 2))
            .await
            .unwrap();

        let rejected = service
            .update(
                &admin(),
                created.id,
                UpdatePrizeRequest {
                    quantity: Some(1),
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(rejected, Err(AppError::ValidationError(_))));

        // 拒绝时其它字段也未被修改
        let unchanged = service.list(&admin(), &PrizeQuery::default()).await.unwrap();
        assert_eq!(unchanged[0].name, "Cup");
        assert_eq!(unchanged[0].quantity, 3);

        let updated = service
            .update(
                &admin(),
                created.id,
                UpdatePrizeRequest {
                    quantity: Some(2),
                    color: Some("#123456".into()),
                    description: Some("".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 2);
        assert_eq!(updated.remaining, 0);
        assert_eq!(updated.color.as_deref(), Some("#123456"));
        assert_eq!(updated.description, None);

        assert!(matches!(
            service
                .update(&admin(), created.id + 50, UpdatePrizeRequest::default())
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_refused_while_prize_has_winners() {
        let db = setup_db().await;
        let service = PrizeService::new(db.clone());
        let draw = DrawService::new(db.clone(), 3);
        let created = service
            .create(&admin(), create_req("Cup", Some(2), false))
            .await
            .unwrap();
        insert_participants(&db, &["A"]).await;
        draw.spin(&admin(), &SpinRequest::new(created.id, 1))
            .await
            .unwrap();

        assert!(matches!(
            service.delete(&admin(), created.id).await,
            Err(AppError::ValidationError(_))
        ));

        draw.reset(&admin()).await.unwrap();
        service.delete(&admin(), created.id).await.unwrap();
        assert!(matches!(
            service.delete(&admin(), created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(&guest(), created.id).await,
            Err(AppError::PermissionDenied)
        ));
    }
}
