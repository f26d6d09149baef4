//! Engagement event log migration
//!
//! Creates the append-only engagement_events table with the enrichment
//! columns (visitor hash, referrer domain, geo, device) and the indexes
//! used by per-card and time-range queries.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EngagementEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EngagementEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EngagementEvents::EventId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(EngagementEvents::CardId).uuid().not_null())
                    .col(ColumnDef::new(EngagementEvents::Kind).string_len(32).not_null())
                    .col(
                        ColumnDef::new(EngagementEvents::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EngagementEvents::UserAgent).text().null())
                    .col(ColumnDef::new(EngagementEvents::VisitorHash).string_len(24).null())
                    .col(ColumnDef::new(EngagementEvents::Referrer).string_len(255).null())
                    .col(ColumnDef::new(EngagementEvents::Country).string_len(64).null())
                    .col(ColumnDef::new(EngagementEvents::CountryCode).string_len(2).null())
                    .col(ColumnDef::new(EngagementEvents::Region).string_len(100).null())
                    .col(ColumnDef::new(EngagementEvents::City).string_len(100).null())
                    .col(ColumnDef::new(EngagementEvents::Latitude).double().null())
                    .col(ColumnDef::new(EngagementEvents::Longitude).double().null())
                    .col(ColumnDef::new(EngagementEvents::GeoSource).string_len(16).null())
                    .col(ColumnDef::new(EngagementEvents::DeviceType).string_len(16).null())
                    .col(ColumnDef::new(EngagementEvents::SessionId).string_len(64).null())
                    .col(ColumnDef::new(EngagementEvents::Channel).string_len(64).null())
                    .col(ColumnDef::new(EngagementEvents::Metadata).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_engagement_events_card")
                            .from(EngagementEvents::Table, EngagementEvents::CardId)
                            .to(Cards::Table, Cards::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // card_id index for per-card scans
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_engagement_events_card")
                    .table(EngagementEvents::Table)
                    .col(EngagementEvents::CardId)
                    .to_owned(),
            )
            .await?;

        // occurred_at index for time-range queries
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_engagement_events_occurred_at")
                    .table(EngagementEvents::Table)
                    .col(EngagementEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        // composite index for per-card time-series queries
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_engagement_events_card_time")
                    .table(EngagementEvents::Table)
                    .col(EngagementEvents::CardId)
                    .col(EngagementEvents::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_engagement_events_card_time").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_engagement_events_occurred_at")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_engagement_events_card").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EngagementEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EngagementEvents {
    #[sea_orm(iden = "engagement_events")]
    Table,
    Id,
    EventId,
    CardId,
    Kind,
    OccurredAt,
    UserAgent,
    VisitorHash,
    Referrer,
    Country,
    CountryCode,
    Region,
    City,
    Latitude,
    Longitude,
    GeoSource,
    DeviceType,
    SessionId,
    Channel,
    Metadata,
}

#[derive(DeriveIden)]
enum Cards {
    #[sea_orm(iden = "cards")]
    Table,
    Id,
}
