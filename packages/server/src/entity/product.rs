use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,

    pub service_id: i32,
    #[sea_orm(belongs_to, from = "service_id", to = "id")]
    pub service: HasOne<super::service::Entity>,

    pub description: Option<String>,
    /// Selling points, stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub features: serde_json::Value,

    /// Upload references (`/uploads/products/...`).
    pub thumbnail: Option<String>,
    pub detail_image: Option<String>,

    pub is_active: bool,

    #[sea_orm(has_many)]
    pub price_options: HasMany<super::price_option::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
