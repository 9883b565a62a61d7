use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::models::{AddCafeForm, ServiceError};
use crate::services::CafeService;

/// Shared state for cafe handlers
#[derive(Clone)]
pub struct CafeHandlerState {
    pub cafe_service: Arc<CafeService>,
}

/// Query parameters for the search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub location: Option<String>,
}

/// Query parameters for the update-price endpoint
#[derive(Debug, Deserialize)]
pub struct UpdatePriceQuery {
    pub new_price: Option<String>,
}

/// List every cafe record in full
#[instrument(skip(state))]
pub async fn list_cafes(
    State(state): State<CafeHandlerState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!("Listing all cafes");

    match state.cafe_service.list_cafes().await {
        Ok(response) => {
            info!("Successfully listed {} cafes", response.cafes.len());
            Ok(Json(json!({ "cafes": response.cafes })))
        }
        Err(err) => {
            error!("Failed to list cafes: {}", err);
            Err(internal_error(&err))
        }
    }
}

/// Search cafes by exact location match.
///
/// Zero matches (or a missing location parameter) is not an error status:
/// the endpoint answers 200 with the documented not-found payload.
#[instrument(skip(state))]
pub async fn search_cafes(
    State(state): State<CafeHandlerState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!("Searching cafes by location");

    let cafes = match query.location {
        Some(ref location) => match state.cafe_service.search_by_location(location).await {
            Ok(cafes) => cafes,
            Err(err) => {
                error!("Failed to search cafes: {}", err);
                return Err(internal_error(&err));
            }
        },
        None => Vec::new(),
    };

    if cafes.is_empty() {
        info!("No cafes at requested location");
        return Ok(Json(json!({
            "error": {
                "Not Found": "Sorry, we don't have a cafe at that location."
            }
        })));
    }

    info!("Found {} cafes at requested location", cafes.len());
    Ok(Json(json!({ "cafes": cafes })))
}

/// Return one cafe picked uniformly at random, reduced to its projection
#[instrument(skip(state))]
pub async fn random_cafe(
    State(state): State<CafeHandlerState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!("Picking a random cafe");

    match state.cafe_service.random_cafe().await {
        Ok(projection) => Ok(Json(json!({ "cafe": projection }))),
        Err(ServiceError::NoCafesAvailable) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {
                    "Not Found": "Sorry, there are no cafes to choose from."
                }
            })),
        )),
        Err(err) => {
            error!("Failed to pick a random cafe: {}", err);
            Err(internal_error(&err))
        }
    }
}

/// Create a new cafe from a form-encoded payload
#[instrument(skip(state, form))]
pub async fn add_cafe(
    State(state): State<CafeHandlerState>,
    Form(form): Form<AddCafeForm>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!("Adding new cafe");

    match state.cafe_service.add_cafe(form).await {
        Ok(cafe) => {
            info!("Successfully added cafe with id {}", cafe.id);
            Ok(Json(json!({
                "response": {
                    "success": "Succesfully added Cafe"
                }
            })))
        }
        Err(err @ ServiceError::MissingField { .. }) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "Bad Request": err.to_string()
                }
            })),
        )),
        Err(err @ ServiceError::DuplicateName { .. }) => Err((
            StatusCode::CONFLICT,
            Json(json!({
                "error": {
                    "Conflict": err.to_string()
                }
            })),
        )),
        Err(err) => {
            error!("Failed to add cafe: {}", err);
            Err(internal_error(&err))
        }
    }
}

/// Overwrite the coffee price of an existing cafe
#[instrument(skip(state, query))]
pub async fn update_price(
    State(state): State<CafeHandlerState>,
    Path(cafe_id): Path<i64>,
    Query(query): Query<UpdatePriceQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!("Updating price for cafe {}", cafe_id);

    match state.cafe_service.update_price(cafe_id, query.new_price).await {
        Ok(()) => Ok(Json(json!({
            "response": {
                "success": "Successfully Updated The Price"
            }
        }))),
        Err(ServiceError::CafeNotFound { .. }) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {
                    "Not Found": "Sorry a cafe with that Id was not found"
                }
            })),
        )),
        Err(err) => {
            error!("Failed to update price for cafe {}: {}", cafe_id, err);
            Err(internal_error(&err))
        }
    }
}

/// Delete a cafe that has been reported closed
#[instrument(skip(state))]
pub async fn report_closed(
    State(state): State<CafeHandlerState>,
    Path(cafe_id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!("Reporting cafe {} as closed", cafe_id);

    match state.cafe_service.report_closed(cafe_id).await {
        Ok(()) => Ok(Json(json!({
            "response": {
                "Success": "Cafe Deleted Successfully"
            }
        }))),
        Err(ServiceError::CafeNotFound { .. }) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": {
                    "Not Found": "The id Doesn't exist"
                }
            })),
        )),
        Err(err) => {
            error!("Failed to delete cafe {}: {}", cafe_id, err);
            Err(internal_error(&err))
        }
    }
}

/// Convert an unexpected service error to a 500 response
fn internal_error(err: &ServiceError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": {
                "Internal Server Error": err.to_string()
            }
        })),
    )
}
