//! Heavy Rotation - Item Selection
//!
//! Rating-weighted random selection of catalog items.
//!
//! This crate provides:
//! - Rated items and weighted groups
//! - Weight calculation (favorites hold a configurable share of the mass)
//! - Two-level weighted sampling over groups
//! - An in-memory item library with rating/favorite mutation
//!
//! # Example
//!
//! ```rust
//! use rotation_selection::{FavoriteRatio, ItemLibrary, ItemPicker, RatedItem};
//!
//! let mut library = ItemLibrary::with_seed(FavoriteRatio::new(0.5).unwrap(), 7);
//! library.set_items(vec![
//!     RatedItem::new("1", "Loved", "http://music/1").with_rating(5),
//!     RatedItem::new("2", "Fine", "http://music/2").with_rating(3),
//!     RatedItem::new("3", "Skip", "http://music/3").with_rating(1),
//! ]);
//!
//! let picked = library.pick().unwrap();
//! assert_ne!(picked.id, "3");
//! ```

mod error;
mod item;
mod library;
mod sampler;
pub mod weights;

pub use error::{Result, SelectionError};
pub use item::{RatedItem, TimeRange, WeightedGroup, EXCLUDED_RATING, FAVORITE_RATING, MAX_RATING};
pub use library::{ItemLibrary, ItemPicker, NullRatingSink, RatingSink};
pub use sampler::sample;
pub use weights::{compute_groups, FavoriteRatio};
