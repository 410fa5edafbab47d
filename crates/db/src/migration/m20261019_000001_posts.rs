//! Posts table under its default name.

use sea_orm_migration::prelude::*;

use crate::schema::{DEFAULT_POSTS_TABLE, create_posts_table_sql, drop_posts_table_sql};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(&create_posts_table_sql(DEFAULT_POSTS_TABLE)?)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(&drop_posts_table_sql(DEFAULT_POSTS_TABLE)?)
            .await?;
        Ok(())
    }
}
