//! Evaluation entity (case studies / completed works)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// URL-safe identifier; unique among records used for public routing.
    #[sea_orm(column_type = "Text", unique)]
    pub slug: String,

    #[sea_orm(column_name = "type", column_type = "Text", nullable)]
    pub kind: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub sector: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub location: Option<String>,

    /// Free text, not strictly numeric ("2021", "2019-2020").
    #[sea_orm(column_type = "Text", nullable)]
    pub year: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,

    pub is_published: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub report_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub report_file_path: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub cover_image_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub cover_image_path: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
