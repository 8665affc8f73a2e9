//! Contact inquiry entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_inquiries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub organisation: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub email: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub role: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub service_type: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub timeframe: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub referral: Option<String>,

    /// Timing / budget note from the form's "constraints" field.
    #[sea_orm(column_type = "Text", nullable)]
    pub constraints_note: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub preferred_contact: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub location: Option<String>,

    pub is_reviewed: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub attachment_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub attachment_path: Option<String>,

    /// Entry-point tag, e.g. "website-contact" for the JSON API path.
    #[sea_orm(column_type = "Text", nullable)]
    pub source: Option<String>,

    /// Captured only on the JSON API path, for abuse monitoring.
    #[sea_orm(column_type = "Text", nullable)]
    pub ip_address: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
