//! `SeaORM` Entity for the posts table.
//!
//! The physical table name is configurable; repositories address it by name
//! and use this entity for column identifiers and row decoding.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: Uuid,
    pub owner_id: String,
    pub created_at: DateTimeUtc,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub published_at: Option<DateTimeUtc>,
    pub is_published: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub attachment_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
