use crate::entities::{
    draw_history_entity as history, participant_entity as participants,
    prize_entity as prizes,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthContext, BoardParticipant, BoardPrize, ClearSummary, HistoryEntryResponse,
    HistoryPageResponse, HistoryQuery, PaginatedResponse, PaginationParams, ParticipantResponse,
    PrizeResponse, ResetSummary, ResultsResponse, SpinBoardResponse, SpinRequest, SpinResponse,
    SpinWinner,
};
use crate::utils::{color_for, pick_winners};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::future::Future;

/// 遇到 ConcurrencyConflict 时整体重试 op, 最多 max_attempts 次
async fn retry_on_conflict<T, F, Fut>(max_attempts: u32, label: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Err(AppError::ConcurrencyConflict(reason)) if attempt < max_attempts => {
                log::warn!("{label} conflicted (attempt {attempt}/{max_attempts}): {reason}");
            }
            other => return other,
        }
    }
}

/// 抽奖引擎
///
/// 无状态: 每次调用都在一个事务内重新读取奖品与候选人, 计算后一次性写回。
/// 事务对象在出错或请求被取消时随 drop 回滚, 不会留下部分结果。
#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
    max_attempts: u32,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection, max_attempts: u32) -> Self {
        Self {
            pool,
            max_attempts: max_attempts.max(1),
        }
    }

    /// 抽奖 (Spin)
    ///
    /// 逻辑:
    /// 1. 校验调用方为管理员、参数合法
    /// 2. 锁定奖品行, 校验剩余名额
    /// 3. 读取未中奖人员, 无放回等概率抽取 count 人
    /// 4. 条件更新: 名额不足或中奖人已被他人抽走时视为并发冲突
    /// 5. 追加历史快照并提交
    ///
    /// 并发冲突时整次重试, 超过 max_attempts 后返回 ConcurrencyConflict。
    pub async fn spin(&self, ctx: &AuthContext, req: &SpinRequest) -> AppResult<SpinResponse> {
        ctx.require_admin()?;
        let (prize_id, count) = req.validate()?;

        let label = format!("Spin on prize {prize_id}");
        let result = retry_on_conflict(self.max_attempts, &label, move || {
            self.try_spin(prize_id, count)
        })
        .await?;

        log::info!(
            "Spin on prize {prize_id} by {} drew {} winner(s), {} remaining",
            ctx.username,
            result.winners.len(),
            result.prize_remaining
        );
        Ok(result)
    }

    async fn try_spin(&self, prize_id: i32, count: i32) -> AppResult<SpinResponse> {
        let txn = self.pool.begin().await?;

        let prize = Self::lock_prize(&txn, prize_id)
            .await?
            .ok_or(AppError::PrizeNotFound(prize_id))?;

        let remaining = prize.remaining();
        if remaining < count {
            return Err(AppError::InsufficientStock {
                prize_name: prize.name,
                remaining,
            });
        }

        let eligible = participants::Entity::find()
            .filter(participants::Column::IsWinner.eq(false))
            .order_by_asc(participants::Column::Id)
            .all(&txn)
            .await?;

        let wanted = count as usize;
        if eligible.len() < wanted {
            return Err(AppError::InsufficientParticipants {
                available: eligible.len(),
            });
        }

        // ThreadRng 不能跨 await 持有
        let winners: Vec<participants::Model> = {
            let mut rng = rand::thread_rng();
            pick_winners(&mut rng, &eligible, wanted)
                .into_iter()
                .cloned()
                .collect()
        };

        let now = Utc::now();
        Self::claim_slots(&txn, &prize, count).await?;
        Self::mark_winners(&txn, &winners, prize.id, now).await?;

        let entries: Vec<history::ActiveModel> = winners
            .iter()
            .map(|w| history::ActiveModel {
                participant_name: Set(w.name.clone()),
                prize_name: Set(prize.name.clone()),
                is_grand: Set(prize.is_grand),
                created_at: Set(Some(now)),
                ..Default::default()
            })
            .collect();
        history::Entity::insert_many(entries).exec(&txn).await?;

        txn.commit().await?;

        let results = winners
            .into_iter()
            .map(|w| SpinWinner {
                winner_id: w.id,
                winner_name: w.name,
                prize_id: prize.id,
                prize_name: prize.name.clone(),
                is_grand: prize.is_grand,
            })
            .collect();

        Ok(SpinResponse {
            winners: results,
            prize_remaining: remaining - count,
        })
    }

    /// 锁定奖品行后再读取, 串行化同一奖品上的抽奖。
    ///
    /// PostgreSQL 用 FOR UPDATE。SQLite 没有行锁, 先执行一次空更新拿到库级写锁,
    /// 后来的事务在 busy_timeout 内排队, 拿到锁后读到的是已提交的名额。
    async fn lock_prize(
        txn: &DatabaseTransaction,
        prize_id: i32,
    ) -> AppResult<Option<prizes::Model>> {
        let query = prizes::Entity::find_by_id(prize_id);
        let prize = match txn.get_database_backend() {
            DbBackend::Postgres | DbBackend::MySql => query.lock_exclusive().one(txn).await?,
            DbBackend::Sqlite => {
                prizes::Entity::update_many()
                    .col_expr(
                        prizes::Column::ClaimedCount,
                        Expr::col(prizes::Column::ClaimedCount).into(),
                    )
                    .filter(prizes::Column::Id.eq(prize_id))
                    .exec(txn)
                    .await?;
                query.one(txn).await?
            }
        };
        Ok(prize)
    }

    /// 原子扣减名额 (where claimed_count + count <= quantity)
    async fn claim_slots(
        txn: &DatabaseTransaction,
        prize: &prizes::Model,
        count: i32,
    ) -> AppResult<()> {
        let result = prizes::Entity::update_many()
            .col_expr(
                prizes::Column::ClaimedCount,
                Expr::col(prizes::Column::ClaimedCount).add(count),
            )
            .col_expr(prizes::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(prizes::Column::Id.eq(prize.id))
            .filter(
                Expr::col(prizes::Column::ClaimedCount)
                    .lte(Expr::col(prizes::Column::Quantity).sub(count)),
            )
            .exec(txn)
            .await?;

        if result.rows_affected != 1 {
            return Err(AppError::ConcurrencyConflict(format!(
                "prize {} slots changed during draw",
                prize.id
            )));
        }
        Ok(())
    }

    /// 只更新仍未中奖的人, 影响行数不符说明有人被并发抽走
    async fn mark_winners(
        txn: &DatabaseTransaction,
        winners: &[participants::Model],
        prize_id: i32,
        won_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let ids: Vec<i32> = winners.iter().map(|w| w.id).collect();
        let result = participants::Entity::update_many()
            .col_expr(participants::Column::IsWinner, Expr::value(true))
            .col_expr(participants::Column::PrizeId, Expr::value(Some(prize_id)))
            .col_expr(participants::Column::WonAt, Expr::value(Some(won_at)))
            .filter(participants::Column::Id.is_in(ids))
            .filter(participants::Column::IsWinner.eq(false))
            .exec(txn)
            .await?;

        if result.rows_affected != winners.len() as u64 {
            return Err(AppError::ConcurrencyConflict(format!(
                "{} of {} selected participants are no longer eligible",
                (winners.len() as u64).saturating_sub(result.rows_affected),
                winners.len()
            )));
        }
        Ok(())
    }

    /// 重置抽奖状态: 保留人员和奖品, 清空中奖标记、已抽名额与历史。幂等。
    pub async fn reset(&self, ctx: &AuthContext) -> AppResult<ResetSummary> {
        ctx.require_admin()?;
        let summary =
            retry_on_conflict(self.max_attempts, "Reset", move || self.reset_once()).await?;

        log::info!(
            "Draw reset by {}: {} participant(s), {} prize(s), {} history row(s)",
            ctx.username,
            summary.participants_reset,
            summary.prizes_reset,
            summary.history_deleted
        );
        Ok(summary)
    }

    // 所有写操作都先动奖品再动人员, 与 spin 的加锁顺序一致
    async fn reset_once(&self) -> AppResult<ResetSummary> {
        let txn = self.pool.begin().await?;

        let prizes_reset = prizes::Entity::update_many()
            .col_expr(prizes::Column::ClaimedCount, Expr::value(0))
            .exec(&txn)
            .await?
            .rows_affected;

        let participants_reset = Self::revert_all_winners(&txn).await?;

        let history_deleted = history::Entity::delete_many()
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        Ok(ResetSummary {
            participants_reset,
            prizes_reset,
            history_deleted,
        })
    }

    async fn revert_all_winners(txn: &DatabaseTransaction) -> AppResult<u64> {
        let result = participants::Entity::update_many()
            .col_expr(participants::Column::IsWinner, Expr::value(false))
            .col_expr(participants::Column::PrizeId, Expr::value(Option::<i32>::None))
            .col_expr(
                participants::Column::WonAt,
                Expr::value(Option::<DateTime<Utc>>::None),
            )
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }

    /// 删除全部人员、奖品与历史 (不可恢复)
    pub async fn clear_all(&self, ctx: &AuthContext) -> AppResult<ClearSummary> {
        ctx.require_admin()?;
        let summary =
            retry_on_conflict(self.max_attempts, "Clear all", move || self.clear_all_once())
                .await?;
        log::info!("All draw data cleared by {}: {summary:?}", ctx.username);
        Ok(summary)
    }

    async fn clear_all_once(&self) -> AppResult<ClearSummary> {
        let txn = self.pool.begin().await?;

        let prizes_deleted = prizes::Entity::delete_many()
            .exec(&txn)
            .await?
            .rows_affected;
        let participants_deleted = participants::Entity::delete_many()
            .exec(&txn)
            .await?
            .rows_affected;
        let history_deleted = history::Entity::delete_many()
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        Ok(ClearSummary {
            participants_deleted,
            prizes_deleted,
            history_deleted,
        })
    }

    /// 删除全部人员与历史; 奖品保留, 已抽名额归零 (对应的中奖人已不存在)
    pub async fn clear_participants(&self, ctx: &AuthContext) -> AppResult<ClearSummary> {
        ctx.require_admin()?;
        let summary = retry_on_conflict(self.max_attempts, "Clear participants", move || {
            self.clear_participants_once()
        })
        .await?;
        log::info!("Participants cleared by {}: {summary:?}", ctx.username);
        Ok(summary)
    }

    async fn clear_participants_once(&self) -> AppResult<ClearSummary> {
        let txn = self.pool.begin().await?;

        prizes::Entity::update_many()
            .col_expr(prizes::Column::ClaimedCount, Expr::value(0))
            .exec(&txn)
            .await?;
        let participants_deleted = participants::Entity::delete_many()
            .exec(&txn)
            .await?
            .rows_affected;
        let history_deleted = history::Entity::delete_many()
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        Ok(ClearSummary {
            participants_deleted,
            history_deleted,
            ..Default::default()
        })
    }

    /// 删除全部奖品与历史; 人员保留并恢复为可抽状态
    pub async fn clear_prizes(&self, ctx: &AuthContext) -> AppResult<ClearSummary> {
        ctx.require_admin()?;
        let summary = retry_on_conflict(self.max_attempts, "Clear prizes", move || {
            self.clear_prizes_once()
        })
        .await?;
        log::info!("Prizes cleared by {}: {summary:?}", ctx.username);
        Ok(summary)
    }

    async fn clear_prizes_once(&self) -> AppResult<ClearSummary> {
        let txn = self.pool.begin().await?;

        let prizes_deleted = prizes::Entity::delete_many()
            .exec(&txn)
            .await?
            .rows_affected;
        Self::revert_all_winners(&txn).await?;
        let history_deleted = history::Entity::delete_many()
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        Ok(ClearSummary {
            prizes_deleted,
            history_deleted,
            ..Default::default()
        })
    }

    /// 分页获取抽奖历史（倒序）
    pub async fn list_history(
        &self,
        _ctx: &AuthContext,
        query: &HistoryQuery,
    ) -> AppResult<HistoryPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset();
        let limit = params.get_limit();

        let base_query = history::Entity::find();
        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(history::Column::CreatedAt)
            .order_by_desc(history::Column::Id)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            params.get_page(),
            limit,
            total,
        ))
    }

    /// 结果页: 历史 (倒序)、未中奖人员、仍有名额的奖品。访客可见。
    pub async fn results(&self, _ctx: &AuthContext) -> AppResult<ResultsResponse> {
        let history_rows = history::Entity::find()
            .order_by_desc(history::Column::CreatedAt)
            .order_by_desc(history::Column::Id)
            .all(&self.pool)
            .await?;

        let non_winners = participants::Entity::find()
            .filter(participants::Column::IsWinner.eq(false))
            .order_by_asc(participants::Column::Id)
            .all(&self.pool)
            .await?;

        let unclaimed_prizes = prizes::Entity::find()
            .filter(
                Expr::col(prizes::Column::ClaimedCount).lt(Expr::col(prizes::Column::Quantity)),
            )
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;

        Ok(ResultsResponse {
            history: history_rows
                .into_iter()
                .map(HistoryEntryResponse::from)
                .collect(),
            non_winners: non_winners
                .into_iter()
                .map(ParticipantResponse::from)
                .collect(),
            unclaimed_prizes: unclaimed_prizes
                .into_iter()
                .map(PrizeResponse::from)
                .collect(),
        })
    }

    /// 抽奖页: 候选人员与按大奖 / 普通奖分组的可用奖品 (含展示颜色)
    pub async fn spin_board(&self, ctx: &AuthContext) -> AppResult<SpinBoardResponse> {
        ctx.require_admin()?;

        let total_participants = participants::Entity::find().count(&self.pool).await?;
        let eligible = participants::Entity::find()
            .filter(participants::Column::IsWinner.eq(false))
            .order_by_asc(participants::Column::Id)
            .all(&self.pool)
            .await?;

        let available: Vec<prizes::Model> = prizes::Entity::find()
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?
            .into_iter()
            .filter(prizes::Model::is_available)
            .collect();

        let (grand, normal): (Vec<_>, Vec<_>) = available.into_iter().partition(|p| p.is_grand);
        let grand_prizes = Self::board_prizes(grand, true);
        let normal_prizes = Self::board_prizes(normal, false);

        Ok(SpinBoardResponse {
            total_participants,
            participants: eligible
                .into_iter()
                .map(|p| BoardParticipant {
                    id: p.id,
                    name: p.name,
                    image_path: p.image_path.unwrap_or_default(),
                })
                .collect(),
            total_grand_remaining: grand_prizes.iter().map(|p| i64::from(p.remaining)).sum(),
            total_normal_remaining: normal_prizes.iter().map(|p| i64::from(p.remaining)).sum(),
            grand_prizes,
            normal_prizes,
        })
    }

    fn board_prizes(list: Vec<prizes::Model>, is_grand: bool) -> Vec<BoardPrize> {
        list.into_iter()
            .enumerate()
            .map(|(i, p)| BoardPrize {
                color: color_for(&p, i, is_grand),
                remaining: p.remaining(),
                id: p.id,
                name: p.name,
                is_grand: p.is_grand,
                qr_code: p.qr_code.unwrap_or_default(),
                image_path: p.image_path.unwrap_or_default(),
                quantity: p.quantity,
            })
            .collect()
    }
}
