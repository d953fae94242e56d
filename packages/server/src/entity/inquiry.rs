use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A message submitted through the public contact form.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inquiry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: Option<String>,
    pub message: String,
    /// One of: New, Processed, Closed
    pub status: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
