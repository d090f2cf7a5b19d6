//! Weight calculation for rating-based random selection
//!
//! Favorites get a per-item weight chosen so that, taken together, they hold
//! a configured share of the total sampling mass. Everything else is bucketed
//! by rating with fixed unit weights:
//!
//! | Bucket   | Ratings                 | Unit weight |
//! |----------|-------------------------|-------------|
//! | high     | 4 (and 5 if unfavorited)| 4           |
//! | mid      | 3, and 0 (unrated)      | 2           |
//! | low      | 2                       | 1           |
//!
//! Rating 1 is an explicit downvote and never enters a group.

use crate::error::{Result, SelectionError};
use crate::item::{RatedItem, WeightedGroup};

/// Unit weight of the rating 4 bucket
pub const HIGH_WEIGHT: f64 = 4.0;

/// Unit weight of the rating 3 / unrated bucket
pub const MID_WEIGHT: f64 = 2.0;

/// Unit weight of the rating 2 bucket
pub const LOW_WEIGHT: f64 = 1.0;

pub const FAVORITES_GROUP: &str = "favorites";
pub const HIGH_GROUP: &str = "rating 4";
pub const MID_GROUP: &str = "rating 3 & 0";
pub const LOW_GROUP: &str = "rating 2";

/// Target share of the sampling mass held by favorites
///
/// Always inside the open interval (0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FavoriteRatio(f64);

impl FavoriteRatio {
    pub fn new(ratio: f64) -> Result<Self> {
        if ratio.is_finite() && ratio > 0.0 && ratio < 1.0 {
            Ok(Self(ratio))
        } else {
            Err(SelectionError::InvalidFavoriteRatio(ratio))
        }
    }

    /// Build from a percentage (the unit settings screens use)
    pub fn from_percent(percent: f64) -> Result<Self> {
        Self::new(percent / 100.0)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for FavoriteRatio {
    fn default() -> Self {
        Self(0.5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    High,
    Mid,
    Low,
}

fn bucket_for(rating: u8) -> Bucket {
    match rating {
        0 | 3 => Bucket::Mid,
        2 => Bucket::Low,
        _ => Bucket::High,
    }
}

/// Split a candidate pool into weighted groups
///
/// Groups are emitted in the order favorites, high, mid, low. When there are
/// no favorites the favorites group is still emitted, empty and with weight 0.
/// When every candidate is a favorite, the rating groups are left out and the
/// favorites carry all of the mass.
pub fn compute_groups(pool: &[RatedItem], ratio: FavoriteRatio) -> Vec<WeightedGroup> {
    let (favorites, rest): (Vec<RatedItem>, Vec<RatedItem>) = pool
        .iter()
        .filter(|item| !item.is_excluded())
        .cloned()
        .partition(|item| item.is_favorite);

    if rest.is_empty() {
        let weight = if favorites.is_empty() { 0.0 } else { 1.0 };
        return vec![WeightedGroup::new(FAVORITES_GROUP, weight, favorites)];
    }

    let mut high = Vec::new();
    let mut mid = Vec::new();
    let mut low = Vec::new();
    for item in rest {
        match bucket_for(item.rating) {
            Bucket::High => high.push(item),
            Bucket::Mid => mid.push(item),
            Bucket::Low => low.push(item),
        }
    }

    let rest_weight = high.len() as f64 * HIGH_WEIGHT
        + mid.len() as f64 * MID_WEIGHT
        + low.len() as f64 * LOW_WEIGHT;

    let favorite_weight = favorite_item_weight(rest_weight, favorites.len(), ratio);

    vec![
        WeightedGroup::new(FAVORITES_GROUP, favorite_weight, favorites),
        WeightedGroup::new(HIGH_GROUP, HIGH_WEIGHT, high),
        WeightedGroup::new(MID_GROUP, MID_WEIGHT, mid),
        WeightedGroup::new(LOW_GROUP, LOW_WEIGHT, low),
    ]
}

/// Per-favorite weight giving favorites `ratio` of the combined mass
///
/// combined = rest / (1 - ratio), favorites share = combined * ratio.
fn favorite_item_weight(rest_weight: f64, favorite_count: usize, ratio: FavoriteRatio) -> f64 {
    if favorite_count == 0 {
        return 0.0;
    }
    let combined_weight = rest_weight / (1.0 - ratio.value());
    combined_weight * ratio.value() / favorite_count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, rating: u8) -> RatedItem {
        RatedItem::new(id, id, format!("http://music/{}", id)).with_rating(rating)
    }

    fn favorite(id: &str) -> RatedItem {
        item(id, 0).with_favorite(true)
    }

    fn group<'a>(groups: &'a [WeightedGroup], name: &str) -> &'a WeightedGroup {
        groups.iter().find(|g| g.name == name).unwrap()
    }

    #[test]
    fn ratio_bounds() {
        assert!(FavoriteRatio::new(0.0).is_err());
        assert!(FavoriteRatio::new(1.0).is_err());
        assert!(FavoriteRatio::new(f64::NAN).is_err());
        assert!(FavoriteRatio::new(0.3).is_ok());
        assert_eq!(FavoriteRatio::from_percent(50.0).unwrap().value(), 0.5);
    }

    #[test]
    fn excluded_items_never_grouped() {
        let pool = vec![item("down", 1), item("ok", 3), favorite("fav")];
        let groups = compute_groups(&pool, FavoriteRatio::default());

        let all: Vec<&str> = groups
            .iter()
            .flat_map(|g| g.items.iter().map(|i| i.id.as_str()))
            .collect();
        assert!(!all.contains(&"down"));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn unrated_shares_bucket_with_rating_three() {
        let pool = vec![item("unrated", 0), item("three", 3), item("two", 2), item("four", 4)];
        let groups = compute_groups(&pool, FavoriteRatio::default());

        let mid = group(&groups, MID_GROUP);
        assert_eq!(mid.weight, MID_WEIGHT);
        let ids: Vec<&str> = mid.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["unrated", "three"]);

        assert_eq!(group(&groups, LOW_GROUP).items[0].id, "two");
        assert_eq!(group(&groups, HIGH_GROUP).items[0].id, "four");
    }

    #[test]
    fn group_order_is_stable() {
        let pool = vec![item("a", 2), favorite("f")];
        let names: Vec<String> = compute_groups(&pool, FavoriteRatio::default())
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec![FAVORITES_GROUP, HIGH_GROUP, MID_GROUP, LOW_GROUP]);
    }

    #[test]
    fn favorite_mass_matches_half_ratio() {
        // one favorite, nine rest items split evenly over low/mid/high
        let mut pool = vec![favorite("fav")];
        for i in 0..3 {
            pool.push(item(&format!("low{}", i), 2));
            pool.push(item(&format!("mid{}", i), 3));
            pool.push(item(&format!("high{}", i), 4));
        }

        let groups = compute_groups(&pool, FavoriteRatio::new(0.5).unwrap());
        let favorite_mass = group(&groups, FAVORITES_GROUP).mass();
        let rest_mass: f64 = groups
            .iter()
            .filter(|g| g.name != FAVORITES_GROUP)
            .map(WeightedGroup::mass)
            .sum();

        assert!((favorite_mass - rest_mass).abs() < 1e-9);
        assert!((rest_mass - 21.0).abs() < 1e-9);
    }

    #[test]
    fn favorite_mass_follows_ratio() {
        let pool = vec![favorite("f1"), favorite("f2"), item("a", 3), item("b", 4)];
        let groups = compute_groups(&pool, FavoriteRatio::new(0.8).unwrap());

        let total: f64 = groups.iter().map(WeightedGroup::mass).sum();
        let favorite_mass = group(&groups, FAVORITES_GROUP).mass();
        assert!((favorite_mass / total - 0.8).abs() < 1e-9);
    }

    #[test]
    fn no_favorites_emits_empty_zero_weight_group() {
        let pool = vec![item("a", 3), item("b", 2)];
        let groups = compute_groups(&pool, FavoriteRatio::default());

        let favorites = group(&groups, FAVORITES_GROUP);
        assert!(favorites.is_empty());
        assert_eq!(favorites.weight, 0.0);
        assert!(favorites.weight.is_finite());
    }

    #[test]
    fn only_favorites_skips_rating_groups() {
        let pool = vec![favorite("a"), favorite("b"), item("gone", 1)];
        let groups = compute_groups(&pool, FavoriteRatio::default());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, FAVORITES_GROUP);
        assert_eq!(groups[0].items.len(), 2);
        assert!(groups[0].mass() > 0.0);
    }

    #[test]
    fn empty_pool_has_no_mass() {
        let groups = compute_groups(&[], FavoriteRatio::default());
        let total: f64 = groups.iter().map(WeightedGroup::mass).sum();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn unfavorited_five_lands_in_high_bucket() {
        let mut five = item("five", 5);
        five.is_favorite = false;
        let groups = compute_groups(&[five, item("x", 3)], FavoriteRatio::default());
        assert_eq!(group(&groups, HIGH_GROUP).items.len(), 1);
    }
}
