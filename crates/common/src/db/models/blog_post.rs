//! Blog post entity (knowledge hub)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog_posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text", unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,

    /// Free-text category used for the tag filter.
    #[sea_orm(column_type = "Text", nullable)]
    pub tag: Option<String>,

    pub is_published: bool,

    /// Defaults to the submission time when the form leaves it blank.
    pub published_at: DateTimeWithTimeZone,

    #[sea_orm(column_type = "Text", nullable)]
    pub featured_image_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub featured_image_path: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
