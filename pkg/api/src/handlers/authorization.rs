//! Bulk subject access review endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use tracing::warn;

use pkg_authz::review::evaluate_bulk_review;
use pkg_constants::api::GROUP_VERSION;
use pkg_types::authorization::BulkSubjectAccessReview;

use crate::auth::Identity;
use crate::status;
use crate::AppState;

/// `POST .../bulksubjectaccessreviews`. Create-only: the response is the
/// request object with `status.results` populated, one result per request
/// in order. Malformed bodies get 400; a self-mode review without an
/// authenticated caller gets 500.
pub async fn create_bulk_review(
    State(state): State<AppState>,
    Extension(Identity(caller)): Extension<Identity>,
    body: Result<Json<BulkSubjectAccessReview>, JsonRejection>,
) -> Response {
    let Json(mut review) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return status::bad_request(format!("invalid request body: {}", rejection));
        }
    };

    match evaluate_bulk_review(state.authorizer.as_ref(), caller.as_ref(), &review.spec).await {
        Ok(review_status) => {
            review.status = review_status;
            review.api_version = GROUP_VERSION.to_string();
            review.kind = "BulkSubjectAccessReview".to_string();
            (StatusCode::CREATED, Json(review)).into_response()
        }
        Err(e) => {
            warn!("Bulk review failed: {}", e);
            status::internal_error(e.to_string())
        }
    }
}
