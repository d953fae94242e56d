use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{optional_http_url, require_len};

/// Request body for creating or replacing a pricing tier.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct PriceOptionRequest {
    /// Tier name shown on the pricing card.
    #[schema(example = "Professional")]
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub features: Vec<String>,
    pub whatsapp_url: Option<String>,
    #[serde(default)]
    pub is_best_value: bool,
    #[serde(default)]
    pub display_order: i32,
}

pub fn validate_price_option(req: &PriceOptionRequest) -> Result<(), AppError> {
    require_len("Name", &req.name, 1, 256)?;
    if !req.price.is_finite() || req.price < 0.0 {
        return Err(AppError::Validation(
            "Price must be a non-negative number".into(),
        ));
    }
    optional_http_url("WhatsApp URL", req.whatsapp_url.as_deref())?;
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PriceOptionResponse {
    pub id: i32,
    pub product_id: i32,
    pub name: String,
    pub price: f64,
    pub features: serde_json::Value,
    pub whatsapp_url: Option<String>,
    pub is_best_value: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::price_option::Model> for PriceOptionResponse {
    fn from(m: crate::entity::price_option::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            name: m.name,
            price: m.price,
            features: m.features,
            whatsapp_url: m.whatsapp_url,
            is_best_value: m.is_best_value,
            display_order: m.display_order,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> PriceOptionRequest {
        PriceOptionRequest {
            name: "Basic".into(),
            price: 1_500_000.0,
            features: vec!["Single branch".into()],
            whatsapp_url: Some("https://wa.me/628110000111".into()),
            is_best_value: false,
            display_order: 0,
        }
    }

    #[test]
    fn accepts_a_normal_tier() {
        assert!(validate_price_option(&base_request()).is_ok());
    }

    #[test]
    fn rejects_negative_or_nan_price() {
        let mut req = base_request();
        req.price = -1.0;
        assert!(validate_price_option(&req).is_err());
        req.price = f64::NAN;
        assert!(validate_price_option(&req).is_err());
    }

    #[test]
    fn rejects_non_http_whatsapp_url() {
        let mut req = base_request();
        req.whatsapp_url = Some("wa.me/628110000111".into());
        assert!(validate_price_option(&req).is_err());
    }
}
