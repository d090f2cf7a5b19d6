//! Rated items and weighted groups

use serde::{Deserialize, Serialize};

/// Rating that removes an item from random selection (explicit downvote)
pub const EXCLUDED_RATING: u8 = 1;

/// Rating that implies the item is a favorite
pub const FAVORITE_RATING: u8 = 5;

/// Highest valid rating
pub const MAX_RATING: u8 = 5;

/// Sub-interval of an underlying media resource played as one logical track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Offset into the resource where the clip starts
    pub start_seconds: f64,

    /// Length of the clip
    pub duration_seconds: f64,
}

impl TimeRange {
    pub fn new(start_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            start_seconds,
            duration_seconds,
        }
    }

    /// Absolute resource time at which the clip ends
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }
}

/// A playable catalog item with the user's rating
///
/// `rating` is 0 when the user never rated the item. Rating 5 implies
/// `is_favorite`; rating 1 excludes the item from random selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedItem {
    /// Catalog identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Stream URL handed to the transport
    pub url: String,

    /// Artist name (optional)
    #[serde(default)]
    pub artist: Option<String>,

    /// Album name (optional)
    #[serde(default)]
    pub album: Option<String>,

    /// Favorited by the user
    #[serde(default)]
    pub is_favorite: bool,

    /// User rating (0 = unrated, 1..=5)
    #[serde(default)]
    pub rating: u8,

    /// Restrict playback to part of the resource
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

impl RatedItem {
    /// Create an unrated, non-favorite item
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            artist: None,
            album: None,
            is_favorite: false,
            rating: 0,
            time_range: None,
        }
    }

    pub fn with_rating(mut self, rating: u8) -> Self {
        self.rating = rating;
        if rating == FAVORITE_RATING {
            self.is_favorite = true;
        }
        self
    }

    pub fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    /// Whether the item is left out of random selection
    pub fn is_excluded(&self) -> bool {
        self.rating == EXCLUDED_RATING
    }
}

/// Bucket of candidates that all share the same per-item weight
///
/// The total sampling mass of a group is `weight * items.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedGroup {
    /// Bucket label ("favorites", "rating 4", ...)
    pub name: String,

    /// Weight of each item in the bucket
    pub weight: f64,

    /// Members of the bucket
    pub items: Vec<RatedItem>,
}

impl WeightedGroup {
    pub fn new(name: impl Into<String>, weight: f64, items: Vec<RatedItem>) -> Self {
        Self {
            name: name.into(),
            weight,
            items,
        }
    }

    /// Total sampling mass of the group
    pub fn mass(&self) -> f64 {
        self.weight * self.items.len() as f64
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
