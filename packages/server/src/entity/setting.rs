use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single site-wide configuration value. Upsert-only lifecycle.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "setting")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub key_name: String,
    pub value: String,
}

impl ActiveModelBehavior for ActiveModel {}
