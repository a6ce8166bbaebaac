use actix_web::{delete, get, post, web, HttpMessage, HttpRequest, HttpResponse};
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    Collection, Database,
};
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    middleware::auth::require_admin,
    models::testimonial::{CreateTestimonialDto, Testimonial},
    pagination::{PageQuery, Paginated},
    responses,
};

use super::find_page;

fn testimonials(db: &Database) -> Collection<Testimonial> {
    db.collection::<Testimonial>("testimonials")
}

#[get("/testimonials")]
pub async fn list_testimonials(
    db: web::Data<Database>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (items, total) = find_page(&testimonials(&db), Document::new(), &query).await?;
    Ok(responses::ok(Paginated::new(items, &query, total)))
}

#[post("/admin/testimonials")]
pub async fn create_testimonial(
    req: HttpRequest,
    db: web::Data<Database>,
    testimonial_data: web::Json<CreateTestimonialDto>,
) -> AppResult<HttpResponse> {
    testimonial_data.validate()?;
    require_admin(&req.extensions())?;

    let now = DateTime::from_millis(Utc::now().timestamp_millis());
    let mut testimonial = Testimonial {
        id: None,
        name: testimonial_data.name.clone(),
        role: testimonial_data.role.clone(),
        quote: testimonial_data.quote.clone(),
        rating: testimonial_data.rating,
        success_tag: testimonial_data.success_tag.clone(),
        created_at: now,
        updated_at: now,
    };

    let result = testimonials(&db).insert_one(&testimonial, None).await?;
    testimonial.id = result.inserted_id.as_object_id();

    Ok(responses::created(testimonial))
}

#[delete("/admin/testimonials/{id}")]
pub async fn delete_testimonial(
    req: HttpRequest,
    db: web::Data<Database>,
    id: web::Path<String>,
) -> AppResult<HttpResponse> {
    require_admin(&req.extensions())?;
    let object_id = ObjectId::parse_str(id.as_str())
        .map_err(|_| AppError::InvalidInput("Invalid testimonial id".to_string()))?;

    let result = testimonials(&db)
        .delete_one(doc! { "_id": object_id }, None)
        .await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Testimonial"));
    }

    Ok(responses::ok_message("Testimonial deleted successfully"))
}
