// server/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewReview, Review, ReviewUpdate};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;
use tiffin_core::domain::rating::validate_rating;
use tiffin_core::{Role, RoleSet};

const CUSTOMER_ONLY: RoleSet = RoleSet::only(Role::Customer);

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewPayload {
  pub restaurant_id: Uuid,
  pub rating: i16,
  pub comment: Option<String>,
}

async fn load_review(app_state: &AppState, review_id: Uuid) -> Result<Review, AppError> {
  app_state
    .repo
    .find_review(review_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Review with ID {} not found.", review_id)))
}

#[instrument(name = "handler::create_review", skip_all, fields(user_id = %auth.id))]
pub async fn create_review_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  body: web::Json<CreateReviewPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(CUSTOMER_ONLY)?;
  let payload = body.into_inner();
  let rating = validate_rating(payload.rating)?;
  if app_state.repo.find_restaurant(payload.restaurant_id).await?.is_none() {
    return Err(AppError::NotFound(format!(
      "Restaurant with ID {} not found.",
      payload.restaurant_id
    )));
  }

  let review = app_state
    .repo
    .create_review(NewReview {
      restaurant_id: payload.restaurant_id,
      user_id: auth.id,
      rating,
      comment: payload.comment.filter(|c| !c.trim().is_empty()),
    })
    .await?;
  info!(review_id = %review.id, restaurant_id = %review.restaurant_id, rating, "Review created.");
  Ok(response::created(review))
}

#[instrument(name = "handler::list_reviews", skip(app_state))]
pub async fn list_reviews_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let reviews = app_state.repo.list_reviews(path.into_inner()).await?;
  Ok(response::ok(reviews))
}

#[instrument(name = "handler::update_review", skip(app_state, auth, body), fields(user_id = %auth.id))]
pub async fn update_review_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<ReviewUpdate>,
) -> Result<HttpResponse, AppError> {
  let review_id = path.into_inner();
  let update = body.into_inner();
  if let Some(rating) = update.rating {
    validate_rating(rating)?;
  }

  let review = load_review(&app_state, review_id).await?;
  if review.user_id != auth.id {
    warn!(%review_id, "Review edit by someone other than its author.");
    return Err(AppError::Forbidden("You can only edit your own reviews.".to_string()));
  }
  let updated = app_state
    .repo
    .update_review(review_id, update)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Review with ID {} not found.", review_id)))?;
  Ok(response::ok(updated))
}

#[instrument(name = "handler::delete_review", skip(app_state, auth), fields(user_id = %auth.id))]
pub async fn delete_review_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let review_id = path.into_inner();
  let review = load_review(&app_state, review_id).await?;
  if review.user_id != auth.id && auth.role != Role::Admin {
    warn!(%review_id, "Review delete by someone other than its author.");
    return Err(AppError::Forbidden("You can only delete your own reviews.".to_string()));
  }
  if !app_state.repo.delete_review(review_id).await? {
    return Err(AppError::NotFound(format!("Review with ID {} not found.", review_id)));
  }
  info!(%review_id, "Review deleted.");
  Ok(response::ok(json!({ "message": "Review deleted successfully." })))
}
