//! 创建团队插件权限表

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TeamPluginPermissions::Table)
                    .if_not_exists()
                    .col(
                        // SQLite rowid alias, 64-bit
                        ColumnDef::new(TeamPluginPermissions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TeamPluginPermissions::TeamId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeamPluginPermissions::PluginId)
                            .string_len(190)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeamPluginPermissions::LastModified)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeamPluginPermissions::PageAccess)
                            .string_len(200)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // team_id 索引，按团队查询权限
        manager
            .create_index(
                Index::create()
                    .name("idx_ws_team_plugin_permissions_team_id")
                    .table(TeamPluginPermissions::Table)
                    .col(TeamPluginPermissions::TeamId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(TeamPluginPermissions::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum TeamPluginPermissions {
    #[sea_orm(iden = "ws_team_plugin_permissions")]
    Table,
    Id,
    TeamId,
    PluginId,
    LastModified,
    PageAccess,
}
