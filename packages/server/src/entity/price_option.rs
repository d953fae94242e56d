use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A pricing tier shown on a product page.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_option")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub product_id: i32,
    #[sea_orm(belongs_to, from = "product_id", to = "id")]
    pub product: HasOne<super::product::Entity>,

    pub name: String,
    pub price: f64,
    /// What the tier includes, stored as a JSON array of strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub features: serde_json::Value,
    pub whatsapp_url: Option<String>,
    pub is_best_value: bool,
    pub display_order: i32,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
