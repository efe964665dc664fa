use sea_orm_migration::prelude::*;

/// Prizes (奖品表)
#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    Name,
    Description,
    Color,
    QrCode,
    ImagePath,
    IsGrand,
    Quantity,
    ClaimedCount,
    CreatedAt,
    UpdatedAt,
}

/// Participants (参与者)
#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
    Name,
    Phone,
    ImagePath,
    IsWinner,
    PrizeId,
    WonAt,
    CreatedAt,
}

/// Draw history (抽奖历史快照)
#[derive(DeriveIden)]
enum DrawHistory {
    Table,
    Id,
    ParticipantName,
    PrizeName,
    IsGrand,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// claimed_count 只由抽奖引擎递增、由 reset 归零；remaining 不落库。
/// 外键只在建表时声明 (SQLite 不支持 ALTER TABLE ADD FOREIGN KEY)。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Prizes::Description).string_len(500).null())
                    .col(ColumnDef::new(Prizes::Color).string_len(20).null())
                    .col(ColumnDef::new(Prizes::QrCode).string_len(200).null())
                    .col(ColumnDef::new(Prizes::ImagePath).string_len(500).null())
                    .col(
                        ColumnDef::new(Prizes::IsGrand)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Prizes::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Prizes::ClaimedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Prizes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_is_grand")
                    .table(Prizes::Table)
                    .col(Prizes::IsGrand)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Participants::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Participants::Phone).string_len(20).null())
                    .col(
                        ColumnDef::new(Participants::ImagePath)
                            .string_len(500)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Participants::IsWinner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Participants::PrizeId).integer().null())
                    .col(
                        ColumnDef::new(Participants::WonAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Participants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participants_prize")
                            .from(Participants::Table, Participants::PrizeId)
                            .to(Prizes::Table, Prizes::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // 抽奖时按 is_winner 过滤可参与人员
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_participants_is_winner")
                    .table(Participants::Table)
                    .col(Participants::IsWinner)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DrawHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawHistory::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DrawHistory::ParticipantName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawHistory::PrizeName)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawHistory::IsGrand)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DrawHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_history_created_at")
                    .table(DrawHistory::Table)
                    .col(DrawHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：历史 -> 参与者 -> 奖品
        manager
            .drop_table(Table::drop().if_exists().table(DrawHistory::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Participants::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Prizes::Table).to_owned())
            .await?;

        Ok(())
    }
}
