use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::moderation::ApprovalStatus;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Property {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub price: f64,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub approval_status: ApprovalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_sqft: Option<f64>,
    pub images: Vec<String>,
    pub submitted_by: ObjectId,
    pub views: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    House,
    Apartment,
    Villa,
    Plot,
    Commercial,
    Office,
}

/// User-facing availability state, distinct from the moderation state.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    #[serde(rename = "For Sale")]
    ForSale,
    #[serde(rename = "For Rent")]
    ForRent,
    Sold,
    #[serde(rename = "Pending Approval")]
    PendingApproval,
    Draft,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::ForSale => "For Sale",
            ListingStatus::ForRent => "For Rent",
            ListingStatus::Sold => "Sold",
            ListingStatus::PendingApproval => "Pending Approval",
            ListingStatus::Draft => "Draft",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePropertyDto {
    #[validate(length(min = 5, max = 150, message = "Title must be between 5 and 150 characters"))]
    pub title: String,
    #[validate(length(
        min = 20,
        max = 2000,
        message = "Description must be between 20 and 2000 characters"
    ))]
    pub description: String,
    #[validate(length(min = 5, max = 300, message = "Address must be between 5 and 300 characters"))]
    pub address: String,
    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 2, max = 100, message = "State is required"))]
    pub state: String,
    #[validate(range(min = 1.0, message = "Price must be greater than zero"))]
    pub price: f64,
    pub property_type: PropertyType,
    /// Desired availability once live; only `For Sale` / `For Rent` make sense
    /// here, defaulting to `For Sale`.
    pub status: Option<ListingStatus>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqft: Option<f64>,
    #[validate(custom = "crate::models::validate_url_list")]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePropertyDto {
    #[validate(length(min = 5, max = 150, message = "Title must be between 5 and 150 characters"))]
    pub title: Option<String>,
    #[validate(length(
        min = 20,
        max = 2000,
        message = "Description must be between 20 and 2000 characters"
    ))]
    pub description: Option<String>,
    #[validate(length(min = 5, max = 300, message = "Address must be between 5 and 300 characters"))]
    pub address: Option<String>,
    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: Option<String>,
    #[validate(length(min = 2, max = 100, message = "State is required"))]
    pub state: Option<String>,
    #[validate(range(min = 1.0, message = "Price must be greater than zero"))]
    pub price: Option<f64>,
    pub property_type: Option<PropertyType>,
    pub status: Option<ListingStatus>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area_sqft: Option<f64>,
    #[validate(custom = "crate::models::validate_url_list")]
    pub images: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> CreatePropertyDto {
        CreatePropertyDto {
            title: "Sunny three-bedroom house".to_string(),
            description: "A bright family home close to schools and transport links.".to_string(),
            address: "12 Elm Street".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            price: 350_000.0,
            property_type: PropertyType::House,
            status: Some(ListingStatus::ForSale),
            bedrooms: Some(3),
            bathrooms: Some(2),
            area_sqft: Some(1800.0),
            images: vec!["https://cdn.example.com/front.jpg".to_string()],
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(valid_dto().validate().is_ok());
    }

    #[test]
    fn short_title_fails() {
        let mut dto = valid_dto();
        dto.title = "Hut".to_string();

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn bad_image_url_fails() {
        let mut dto = valid_dto();
        dto.images = vec!["not a url".to_string()];

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("images"));
    }

    #[test]
    fn listing_status_uses_display_strings_on_the_wire() {
        let value = serde_json::to_value(ListingStatus::PendingApproval).unwrap();
        assert_eq!(value, "Pending Approval");
        assert_eq!(ListingStatus::ForSale.as_str(), "For Sale");
    }
}
