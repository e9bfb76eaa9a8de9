// 🎟️ Event Record - one schedulable community event
//
// Identity: `id` (never changes once assigned)
// Values: name, date, category, location
// State: `seats` (only a successful registration moves it)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// EVENT RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Stable identity - NEVER changes
    pub id: u32,

    pub name: String,

    /// Calendar date, `YYYY-MM-DD` in source form
    pub date: NaiveDate,

    /// Remaining seats
    pub seats: u32,

    pub category: String,

    pub location: String,
}

impl EventRecord {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        date: NaiveDate,
        seats: u32,
        category: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        EventRecord {
            id,
            name: name.into(),
            date,
            seats,
            category: category.into(),
            location: location.into(),
        }
    }

    /// Seats left, regardless of date
    pub fn has_seats(&self) -> bool {
        self.seats > 0
    }

    /// Upcoming (not strictly before `reference_date`) and not full
    pub fn is_valid_on(&self, reference_date: NaiveDate) -> bool {
        self.date >= reference_date && self.has_seats()
    }

    /// One-line summary used by the CLI `summary` command
    pub fn summary(&self) -> String {
        format!("Summary: {} on {}, Seats: {}", self.name, self.date, self.seats)
    }

    /// Card title with the category icon, e.g. "🎵 Music Fest on 2025-07-15"
    pub fn card_title(&self) -> String {
        format!("{} {} on {}", category_icon(&self.category), self.name, self.date)
    }

    /// Field name / value pairs in declaration order (detail panel)
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("id", self.id.to_string()),
            ("name", self.name.clone()),
            ("date", self.date.to_string()),
            ("seats", self.seats.to_string()),
            ("category", self.category.clone()),
            ("location", self.location.clone()),
        ]
    }
}

/// Icon shown in front of event cards
pub fn category_icon(category: &str) -> &'static str {
    match category.to_lowercase().as_str() {
        "music" => "🎵",
        "workshop" => "🛠️",
        "sports" => "⚽",
        "art" => "🎨",
        "food" => "🍲",
        _ => "📅",
    }
}

// ============================================================================
// EVENT DRAFT
// ============================================================================

/// An event that has not been given an identifier yet.
/// `Catalog::add_draft` assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub name: String,
    pub date: NaiveDate,
    pub seats: u32,
    pub category: String,
    pub location: String,
}

impl EventDraft {
    pub fn into_record(self, id: u32) -> EventRecord {
        EventRecord {
            id,
            name: self.name,
            date: self.date,
            seats: self.seats,
            category: self.category,
            location: self.location,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
