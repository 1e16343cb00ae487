//! Active catalog of industrial-visit offerings.
//!
//! The chatbot only reads the catalog: to ground external completions, and to
//! answer location, pricing and greeting intents. Offerings that are not
//! `active` never reach this module.

use crate::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest description excerpt included in grounding text, in characters.
const DESCRIPTION_EXCERPT_CHARS: usize = 80;

/// An active industrial-visit package.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    /// Catalog identifier.
    pub id: i64,
    /// Package title.
    pub title: String,
    /// Location (city or region) of the visit.
    pub location: String,
    /// Price per participant, in rupees.
    pub price: f64,
    /// Human-readable duration, e.g. "2 Days 1 Night".
    pub duration: String,
    /// Long description.
    pub description: String,
}

impl Offering {
    /// Price formatted for chat replies, e.g. `₹1500` or `₹1499.50`.
    #[must_use]
    pub fn display_price(&self) -> String {
        format_price(self.price)
    }
}

/// Format a rupee amount, dropping the fraction when it is zero.
#[must_use]
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("₹{price:.0}")
    } else {
        format!("₹{price:.2}")
    }
}

/// The catalog data source could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Backing store is unreachable or the query failed.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Source of the currently active offerings.
pub trait CatalogSource: Send + Sync {
    /// List every active offering.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] if the data source cannot be read.
    fn list_active(&self) -> BoxFuture<'_, Result<Vec<Offering>, CatalogError>>;
}

/// Catalog read for a single request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogSnapshot {
    offerings: Vec<Offering>,
}

impl CatalogSnapshot {
    /// Wrap a list of active offerings.
    #[must_use]
    pub const fn new(offerings: Vec<Offering>) -> Self {
        Self { offerings }
    }

    /// All offerings, in source order.
    #[must_use]
    pub fn offerings(&self) -> &[Offering] {
        &self.offerings
    }

    /// Whether there are no active offerings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offerings.is_empty()
    }

    /// Distinct locations, in order of first appearance.
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for offering in &self.offerings {
            let location = offering.location.trim();
            if !location.is_empty() && !seen.iter().any(|l| l.eq_ignore_ascii_case(location)) {
                seen.push(location);
            }
        }
        seen
    }

    /// Offerings in `location` (case-insensitive).
    #[must_use]
    pub fn in_location(&self, location: &str) -> Vec<&Offering> {
        self.offerings
            .iter()
            .filter(|o| o.location.trim().eq_ignore_ascii_case(location.trim()))
            .collect()
    }

    /// Lowest active price, if any.
    #[must_use]
    pub fn min_price(&self) -> Option<f64> {
        self.offerings
            .iter()
            .map(|o| o.price)
            .reduce(f64::min)
    }

    /// Catalog description used to ground an external completion.
    #[must_use]
    pub fn grounding_text(&self) -> String {
        let mut text = String::from("Available Industrial Visits:\n");
        for offering in &self.offerings {
            let excerpt: String = offering
                .description
                .chars()
                .take(DESCRIPTION_EXCERPT_CHARS)
                .collect();
            text.push_str(&format!(
                "- {} in {}: {}, {}\n  {}...\n",
                offering.title,
                offering.location,
                offering.display_price(),
                offering.duration,
                excerpt
            ));
        }
        text
    }
}
