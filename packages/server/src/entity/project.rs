use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,

    /// NULL for projects without a published client.
    pub client_id: Option<i32>,
    #[sea_orm(belongs_to, from = "client_id", to = "id")]
    pub client: BelongsTo<Option<super::client::Entity>>,

    pub service_id: Option<i32>,
    #[sea_orm(belongs_to, from = "service_id", to = "id")]
    pub service: BelongsTo<Option<super::service::Entity>>,

    pub description: String,
    pub project_date: Option<Date>,
    /// One of: Ongoing, Completed
    pub status: String,
    /// Upload reference (`/uploads/projects/...`).
    pub thumbnail: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
