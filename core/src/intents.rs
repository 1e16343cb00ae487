//! Keyword intents answered from live catalog data.
//!
//! Checked only after the matcher finds no confident knowledge entry. Triggers
//! match whole message tokens, so "hi" does not fire inside "this" and "all"
//! does not fire inside "install". Each trigger list carries its common
//! plural and inflected forms ("prices", "booked", "transportation").

use crate::catalog::{CatalogSnapshot, format_price};
use crate::completion::SUPPORT_PHONE;
use crate::matcher::tokenize;

/// Most offerings listed for a single location.
const MAX_LOCATION_OFFERINGS: usize = 3;

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "greetings"];
const LIST_WORDS: &[&str] = &[
    "list",
    "lists",
    "listing",
    "show",
    "showing",
    "package",
    "packages",
    "available",
    "availability",
    "where",
    "locations",
    "all",
];
const PRICE_WORDS: &[&str] = &[
    "price",
    "prices",
    "priced",
    "pricing",
    "cost",
    "costs",
    "costly",
    "cheap",
    "cheaper",
    "cheapest",
    "expensive",
    "budget",
    "budgets",
];
const BOOKING_WORDS: &[&str] = &[
    "book",
    "books",
    "booked",
    "booking",
    "bookings",
    "reserve",
    "reserved",
    "reservation",
    "reservations",
    "register",
    "registered",
    "registration",
    "enroll",
    "enrolled",
    "enrollment",
];
const DURATION_WORDS: &[&str] = &["duration", "durations", "days", "long", "longer", "time"];
const FACILITY_WORDS: &[&str] = &[
    "food",
    "meal",
    "meals",
    "accommodation",
    "accommodations",
    "hotel",
    "hotels",
    "transport",
    "transportation",
    "facility",
    "facilities",
];
const THANKS_WORDS: &[&str] = &["thank", "thanks", "thanked", "thankyou", "appreciate", "appreciated"];

/// A detected intent, in priority order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Hello / hi / hey.
    Greeting,
    /// The message names an active location.
    Location(String),
    /// "Where do you operate?", "show all packages".
    ListLocations,
    /// Price or budget question.
    Pricing,
    /// How to book.
    Booking,
    /// How long visits last.
    Duration,
    /// Food, accommodation, transport.
    Facilities,
    /// Thank you.
    Thanks,
}

impl Intent {
    /// Detect the first applicable intent for `message`.
    ///
    /// Intents that need catalog data (greeting, location, list, pricing) do
    /// not apply when the catalog is empty.
    #[must_use]
    pub fn detect(message: &str, catalog: &CatalogSnapshot) -> Option<Self> {
        let tokens = tokenize(message);
        let has_any = |words: &[&str]| tokens.iter().any(|t| words.contains(&t.as_str()));
        let has_catalog = !catalog.is_empty();

        if has_catalog && has_any(GREETING_WORDS) {
            return Some(Self::Greeting);
        }

        if has_catalog {
            if let Some(location) = catalog
                .locations()
                .into_iter()
                .find(|location| contains_phrase(&tokens, &tokenize(location)))
            {
                return Some(Self::Location(location.to_string()));
            }
        }

        if has_catalog && has_any(LIST_WORDS) {
            return Some(Self::ListLocations);
        }
        if has_catalog && has_any(PRICE_WORDS) {
            return Some(Self::Pricing);
        }
        if has_any(BOOKING_WORDS) {
            return Some(Self::Booking);
        }
        if has_any(DURATION_WORDS) {
            return Some(Self::Duration);
        }
        if has_any(FACILITY_WORDS) {
            return Some(Self::Facilities);
        }
        if has_any(THANKS_WORDS) {
            return Some(Self::Thanks);
        }

        None
    }

    /// Short name for logs and metrics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Location(_) => "location",
            Self::ListLocations => "list_locations",
            Self::Pricing => "pricing",
            Self::Booking => "booking",
            Self::Duration => "duration",
            Self::Facilities => "facilities",
            Self::Thanks => "thanks",
        }
    }

    /// Reply text for this intent.
    #[must_use]
    pub fn respond(&self, catalog: &CatalogSnapshot) -> String {
        match self {
            Self::Greeting => format!(
                "Hello! 🐼 I'm Panda Bot, your DUDU Industrial Visit assistant! \
                 We offer amazing industrial visits across {}. How can I help you today?",
                catalog.locations().join(", ")
            ),
            Self::Location(location) => {
                let offerings = catalog.in_location(location);
                let mut reply = format!(
                    "Great choice! 🐼 We have {} industrial visits in {location}:\n",
                    offerings.len()
                );
                for offering in offerings.iter().take(MAX_LOCATION_OFFERINGS) {
                    reply.push_str(&format!(
                        "• {} ({}, {})\n",
                        offering.title,
                        offering.display_price(),
                        offering.duration
                    ));
                }
                reply.push_str("\nVisit our Industrial's page for full details! 🚌");
                reply
            }
            Self::ListLocations => {
                let locations = catalog.locations();
                format!(
                    "We operate in {} locations: {} 🏢\nWe have {} amazing industrial visit packages! \
                     Check out the Industrial's page to explore them all! 🐼",
                    locations.len(),
                    locations.join(", "),
                    catalog.offerings().len()
                )
            }
            Self::Pricing => format!(
                "Our industrial visit packages start from just {}! 💰 Each package includes \
                 transportation, accommodation, meals, and guided tours. \
                 Check the Industrial's page for specific pricing.",
                format_price(catalog.min_price().unwrap_or_default())
            ),
            Self::Booking => format!(
                "Ready to book? 🎟️ Simply:\n1. Browse our Industrial's page\n\
                 2. Select your preferred visit\n3. Click 'Book Now'\n4. Complete payment\n\n\
                 Need help? Contact us at {SUPPORT_PHONE}! 📞"
            ),
            Self::Duration => "Our industrial visits range from 1-day trips to multi-day experiences! 🕐 \
                 Each package lists the exact duration. Most include factory tours, \
                 interactive sessions, and fun activities!"
                .to_string(),
            Self::Facilities => "Every DUDU Industrial Visit includes:\n\
                 ✅ Safe transportation (Bus/Train)\n✅ Quality accommodation\n✅ Hygienic meals\n\
                 ✅ Professional guides\n✅ Fun activities\n\n\
                 Your comfort and safety are our priority! 🐼"
                .to_string(),
            Self::Thanks => "You're welcome! 🐼 Happy to help! If you have more questions, just ask. \
                 Ready to explore? Check out our Industrial's page! 🚌"
                .to_string(),
        }
    }
}

/// Whether `phrase` appears as a contiguous run of `tokens`.
fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && tokens.windows(phrase.len()).any(|window| window == phrase)
}
