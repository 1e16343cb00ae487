//! Catalog listing endpoint.

use crate::WebResult;
use crate::state::AppState;
use axum::{Json, extract::State};
use dudu_hub_core::catalog::Offering;
use serde::{Deserialize, Serialize};

/// One active offering as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferingView {
    /// Catalog identifier.
    pub id: i64,
    /// Package title.
    pub title: String,
    /// Location.
    pub location: String,
    /// Price in rupees.
    pub price: f64,
    /// Price formatted for display.
    pub display_price: String,
    /// Duration.
    pub duration: String,
    /// Description.
    pub description: String,
}

impl From<Offering> for OfferingView {
    fn from(offering: Offering) -> Self {
        Self {
            display_price: offering.display_price(),
            id: offering.id,
            title: offering.title,
            location: offering.location,
            price: offering.price,
            duration: offering.duration,
            description: offering.description,
        }
    }
}

/// List active industrial visits.
///
/// # Endpoint
///
/// ```text
/// GET /api/industrials/
/// ```
///
/// # Errors
///
/// Returns 503 if the catalog cannot be read.
pub async fn list_industrials(State(state): State<AppState>) -> WebResult<Json<Vec<OfferingView>>> {
    let offerings = state.catalog.list_active().await?;
    Ok(Json(offerings.into_iter().map(OfferingView::from).collect()))
}
