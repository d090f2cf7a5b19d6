//! Candidate pool with cached weight groups
//!
//! The library is the in-memory view of the user's catalog. Weight groups are
//! recomputed explicitly whenever the pool, the favorite ratio or a rating
//! changes; nothing is recomputed lazily behind the caller's back.

use crate::error::{Result, SelectionError};
use crate::item::{RatedItem, WeightedGroup, FAVORITE_RATING, MAX_RATING};
use crate::sampler::sample;
use crate::weights::{compute_groups, FavoriteRatio};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Remote store for ratings and favorites
///
/// Writes are fire-and-forget from the library's point of view: the local
/// state is updated first and a failed write is only logged.
#[cfg_attr(test, mockall::automock)]
pub trait RatingSink: Send {
    /// Persist a new rating for the item
    fn persist_rating(&self, item: &RatedItem, rating: u8) -> Result<()>;

    /// Persist the favorite flag for the item
    fn persist_favorite(&self, item: &RatedItem, is_favorite: bool) -> Result<()>;
}

/// Sink that drops every write (offline use, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRatingSink;

impl RatingSink for NullRatingSink {
    fn persist_rating(&self, _item: &RatedItem, _rating: u8) -> Result<()> {
        Ok(())
    }

    fn persist_favorite(&self, _item: &RatedItem, _is_favorite: bool) -> Result<()> {
        Ok(())
    }
}

/// Source of randomly selected items
pub trait ItemPicker {
    /// Draw one item, or `None` if there is nothing left to draw from
    fn pick(&mut self) -> Option<RatedItem>;
}

/// In-memory candidate pool
pub struct ItemLibrary {
    items: Vec<RatedItem>,
    lookup: HashMap<String, usize>,
    groups: Vec<WeightedGroup>,
    ratio: FavoriteRatio,
    rng: StdRng,
}

impl ItemLibrary {
    /// Create an empty library seeded from OS entropy
    pub fn new(ratio: FavoriteRatio) -> Self {
        Self::with_rng(ratio, StdRng::from_entropy())
    }

    /// Create an empty library with a fixed seed (reproducible queues)
    pub fn with_seed(ratio: FavoriteRatio, seed: u64) -> Self {
        Self::with_rng(ratio, StdRng::seed_from_u64(seed))
    }

    fn with_rng(ratio: FavoriteRatio, rng: StdRng) -> Self {
        Self {
            items: Vec::new(),
            lookup: HashMap::new(),
            groups: Vec::new(),
            ratio,
            rng,
        }
    }

    /// Replace the whole pool
    pub fn set_items(&mut self, items: Vec<RatedItem>) {
        self.lookup = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.id.clone(), index))
            .collect();
        self.items = items;
        self.recompute_weights();
    }

    pub fn items(&self) -> &[RatedItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&RatedItem> {
        self.lookup.get(id).map(|&index| &self.items[index])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn favorite_ratio(&self) -> FavoriteRatio {
        self.ratio
    }

    pub fn set_favorite_ratio(&mut self, ratio: FavoriteRatio) {
        self.ratio = ratio;
        self.recompute_weights();
    }

    /// Current weight groups
    pub fn groups(&self) -> &[WeightedGroup] {
        &self.groups
    }

    /// Rebuild the weight groups from the current pool
    pub fn recompute_weights(&mut self) {
        self.groups = compute_groups(&self.items, self.ratio);
        debug!(
            items = self.items.len(),
            groups = ?self.groups.iter().map(|g| (g.name.as_str(), g.items.len(), g.weight)).collect::<Vec<_>>(),
            "Recomputed selection weights"
        );
    }

    /// Change an item's rating
    ///
    /// Rating 5 marks the item as favorite; rating a favorite below 5
    /// clears the favorite flag. Returns the updated item.
    pub fn update_rating(
        &mut self,
        id: &str,
        rating: u8,
        sink: &dyn RatingSink,
    ) -> Result<RatedItem> {
        if rating > MAX_RATING {
            return Err(SelectionError::InvalidRating(rating));
        }
        let index = self.index_of(id)?;

        let item = &mut self.items[index];
        let was_favorite = item.is_favorite;
        item.rating = rating;
        if rating == FAVORITE_RATING {
            item.is_favorite = true;
        } else if was_favorite {
            item.is_favorite = false;
        }
        let updated = item.clone();

        if let Err(e) = sink.persist_rating(&updated, rating) {
            warn!("Failed to persist rating for {}: {}", updated.id, e);
        }
        if updated.is_favorite != was_favorite {
            if let Err(e) = sink.persist_favorite(&updated, updated.is_favorite) {
                warn!("Failed to persist favorite flag for {}: {}", updated.id, e);
            }
        }

        self.recompute_weights();
        Ok(updated)
    }

    /// Set or clear an item's favorite flag
    pub fn set_favorite(
        &mut self,
        id: &str,
        is_favorite: bool,
        sink: &dyn RatingSink,
    ) -> Result<RatedItem> {
        let index = self.index_of(id)?;
        self.items[index].is_favorite = is_favorite;
        let updated = self.items[index].clone();

        if let Err(e) = sink.persist_favorite(&updated, is_favorite) {
            warn!("Failed to persist favorite flag for {}: {}", updated.id, e);
        }

        self.recompute_weights();
        Ok(updated)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.lookup
            .get(id)
            .copied()
            .ok_or_else(|| SelectionError::UnknownItem(id.to_string()))
    }
}

impl ItemPicker for ItemLibrary {
    fn pick(&mut self) -> Option<RatedItem> {
        sample(&self.groups, &mut self.rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::FAVORITES_GROUP;

    fn item(id: &str, rating: u8) -> RatedItem {
        RatedItem::new(id, id, format!("http://music/{}", id)).with_rating(rating)
    }

    fn library(items: Vec<RatedItem>) -> ItemLibrary {
        let mut library = ItemLibrary::with_seed(FavoriteRatio::default(), 3);
        library.set_items(items);
        library
    }

    #[test]
    fn set_items_builds_lookup_and_groups() {
        let library = library(vec![item("a", 3), item("b", 5)]);

        assert_eq!(library.len(), 2);
        assert_eq!(library.get("b").unwrap().rating, 5);
        assert!(library.get("missing").is_none());

        let favorites = library
            .groups()
            .iter()
            .find(|g| g.name == FAVORITES_GROUP)
            .unwrap();
        assert_eq!(favorites.items.len(), 1);
    }

    #[test]
    fn pick_never_returns_excluded() {
        let mut library = library(vec![item("keep", 3), item("drop", 1)]);
        for _ in 0..200 {
            assert_eq!(library.pick().unwrap().id, "keep");
        }
    }

    #[test]
    fn pick_on_empty_pool_is_none() {
        let mut library = library(vec![]);
        assert!(library.pick().is_none());

        let mut library = self::library(vec![item("only-downvoted", 1)]);
        assert!(library.pick().is_none());
    }

    #[test]
    fn same_seed_same_sequence() {
        let pool = vec![item("a", 2), item("b", 3), item("c", 4), item("d", 5)];
        let mut first = ItemLibrary::with_seed(FavoriteRatio::default(), 99);
        let mut second = ItemLibrary::with_seed(FavoriteRatio::default(), 99);
        first.set_items(pool.clone());
        second.set_items(pool);

        let a: Vec<String> = (0..20).map(|_| first.pick().unwrap().id).collect();
        let b: Vec<String> = (0..20).map(|_| second.pick().unwrap().id).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn rating_five_promotes_to_favorite() {
        let mut sink = MockRatingSink::new();
        sink.expect_persist_rating()
            .withf(|item, rating| item.id == "a" && *rating == 5)
            .times(1)
            .returning(|_, _| Ok(()));
        sink.expect_persist_favorite()
            .withf(|item, fav| item.id == "a" && *fav)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut library = library(vec![item("a", 3)]);
        let updated = library.update_rating("a", 5, &sink).unwrap();

        assert!(updated.is_favorite);
        assert!(library.get("a").unwrap().is_favorite);
    }

    #[test]
    fn lowering_favorite_clears_flag() {
        let mut sink = MockRatingSink::new();
        sink.expect_persist_rating().times(1).returning(|_, _| Ok(()));
        sink.expect_persist_favorite()
            .withf(|_, fav| !*fav)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut library = library(vec![item("a", 5)]);
        let updated = library.update_rating("a", 4, &sink).unwrap();

        assert!(!updated.is_favorite);
        assert_eq!(updated.rating, 4);
    }

    #[test]
    fn persistence_failure_keeps_local_state() {
        let mut sink = MockRatingSink::new();
        sink.expect_persist_rating()
            .returning(|_, _| Err(SelectionError::Persistence("offline".to_string())));
        sink.expect_persist_favorite()
            .returning(|_, _| Err(SelectionError::Persistence("offline".to_string())));

        let mut library = library(vec![item("a", 3), item("b", 3)]);
        library.update_rating("a", 1, &sink).unwrap();

        assert_eq!(library.get("a").unwrap().rating, 1);
        // downvoted item left the selection pool
        for _ in 0..100 {
            assert_eq!(library.pick().unwrap().id, "b");
        }
    }

    #[test]
    fn invalid_rating_and_unknown_item() {
        let mut library = library(vec![item("a", 3)]);
        assert!(matches!(
            library.update_rating("a", 6, &NullRatingSink),
            Err(SelectionError::InvalidRating(6))
        ));
        assert!(matches!(
            library.update_rating("zzz", 3, &NullRatingSink),
            Err(SelectionError::UnknownItem(_))
        ));
    }

    #[test]
    fn set_favorite_regroups() {
        let mut library = library(vec![item("a", 2), item("b", 2)]);
        library.set_favorite("b", true, &NullRatingSink).unwrap();

        let favorites = library
            .groups()
            .iter()
            .find(|g| g.name == FAVORITES_GROUP)
            .unwrap();
        assert_eq!(favorites.items[0].id, "b");
        assert!(favorites.weight > 0.0);
    }
}
