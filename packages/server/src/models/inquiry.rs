use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::{optional_max_len, require_len, validate_email, validate_status};

pub const INQUIRY_STATUSES: &[&str] = &["New", "Processed", "Closed"];

/// Request body for the public contact form.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct InquiryRequest {
    #[schema(example = "Siti Rahma")]
    pub name: String,
    #[schema(example = "siti@bank-example.co.id")]
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub message: String,
}

pub fn validate_inquiry_request(req: &InquiryRequest) -> Result<(), AppError> {
    require_len("Name", &req.name, 3, 256)?;
    validate_email(&req.email)?;
    require_len("Phone", &req.phone, 10, 32)?;
    optional_max_len("Company", req.company.as_deref(), 256)?;
    require_len("Message", &req.message, 10, 5_000)?;
    Ok(())
}

/// Request body for changing an inquiry's triage status.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateInquiryStatusRequest {
    /// One of: New, Processed, Closed.
    pub status: String,
}

pub fn validate_inquiry_status(req: &UpdateInquiryStatusRequest) -> Result<(), AppError> {
    validate_status("Status", &req.status, INQUIRY_STATUSES)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InquiryResponse {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: Option<String>,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::inquiry::Model> for InquiryResponse {
    fn from(m: crate::entity::inquiry::Model) -> Self {
        Self {
            id: m.id,
            full_name: m.full_name,
            email: m.email,
            phone: m.phone,
            company_name: m.company_name,
            message: m.message,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> InquiryRequest {
        InquiryRequest {
            name: "Siti Rahma".into(),
            email: "siti@bank-example.co.id".into(),
            phone: "+62 811 2233 4455".into(),
            company: Some("BPR Example".into()),
            message: "We would like a product demo.".into(),
        }
    }

    #[test]
    fn accepts_a_complete_inquiry() {
        assert!(validate_inquiry_request(&base_request()).is_ok());
    }

    #[test]
    fn rejects_short_phone() {
        let mut req = base_request();
        req.phone = "12345".into();
        assert!(validate_inquiry_request(&req).is_err());
    }

    #[test]
    fn rejects_short_message() {
        let mut req = base_request();
        req.message = "hi".into();
        assert!(validate_inquiry_request(&req).is_err());
    }

    #[test]
    fn status_set_is_closed() {
        let ok = UpdateInquiryStatusRequest {
            status: "Processed".into(),
        };
        assert!(validate_inquiry_status(&ok).is_ok());
        let bad = UpdateInquiryStatusRequest {
            status: "Ignored".into(),
        };
        assert!(validate_inquiry_status(&bad).is_err());
    }
}
