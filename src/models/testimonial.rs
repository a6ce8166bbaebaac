use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Testimonial {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub role: String,
    pub quote: String,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_tag: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestimonialDto {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(length(min = 2, max = 100, message = "Role must be between 2 and 100 characters"))]
    pub role: String,
    #[validate(length(min = 10, max = 1000, message = "Quote must be between 10 and 1000 characters"))]
    pub quote: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 60, message = "Success tag must be at most 60 characters"))]
    pub success_tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_outside_range_fails() {
        let dto = CreateTestimonialDto {
            name: "Dana P.".to_string(),
            role: "Home buyer".to_string(),
            quote: "Found our dream house within two weeks of signing up.".to_string(),
            rating: 6,
            success_tag: None,
        };

        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rating"));
    }

    #[test]
    fn five_star_review_passes() {
        let dto = CreateTestimonialDto {
            name: "Dana P.".to_string(),
            role: "Home buyer".to_string(),
            quote: "Found our dream house within two weeks of signing up.".to_string(),
            rating: 5,
            success_tag: Some("Sold in 14 days".to_string()),
        };

        assert!(dto.validate().is_ok());
    }
}
