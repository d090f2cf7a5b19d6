//! Two-level weighted sampling
//!
//! Picture a wheel of fortune where each group owns an arc proportional to
//! `weight * items.len()`. One uniform draw over the whole circumference
//! picks the group, and the offset into that arc picks the item. Every item
//! in a group shares the group's weight, so the per-item weights never have
//! to be laid out in a flat array.

use crate::item::{RatedItem, WeightedGroup};
use rand::Rng;

/// Draw one item from the groups
///
/// Returns `None` when the total mass is zero (all groups empty or
/// zero-weight). Draws are independent; the same item can come back on the
/// next call.
pub fn sample<'a, R: Rng + ?Sized>(groups: &'a [WeightedGroup], rng: &mut R) -> Option<&'a RatedItem> {
    let total: f64 = groups.iter().map(WeightedGroup::mass).filter(|m| *m > 0.0).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let r = rng.gen_range(0.0..total);
    select(groups, r)
}

/// Map a point in `[0, total)` onto an item
fn select(groups: &[WeightedGroup], r: f64) -> Option<&RatedItem> {
    let mut current = 0.0;
    let mut last_candidate = None;

    for group in groups {
        let mass = group.mass();
        if mass <= 0.0 {
            continue;
        }
        last_candidate = Some(group);

        if r < current + mass {
            return Some(&group.items[item_index(group, r - current)]);
        }
        current += mass;
    }

    // Float accumulation can leave r a hair past the last boundary
    last_candidate.and_then(|group| group.items.last())
}

fn item_index(group: &WeightedGroup, offset: f64) -> usize {
    let index = (offset / group.weight).floor();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(group.items.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn items(prefix: &str, count: usize) -> Vec<RatedItem> {
        (0..count)
            .map(|i| {
                let id = format!("{}{}", prefix, i);
                RatedItem::new(id.clone(), id, "http://music")
            })
            .collect()
    }

    #[test]
    fn empty_groups_yield_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample(&[], &mut rng).is_none());

        let groups = vec![
            WeightedGroup::new("a", 4.0, vec![]),
            WeightedGroup::new("b", 0.0, items("b", 3)),
        ];
        assert!(sample(&groups, &mut rng).is_none());
    }

    #[test]
    fn select_walks_cumulative_mass() {
        // masses: a = 2 * 1 = 2, b = 3 * 2 = 6
        let groups = vec![
            WeightedGroup::new("a", 1.0, items("a", 2)),
            WeightedGroup::new("b", 3.0, items("b", 2)),
        ];

        assert_eq!(select(&groups, 0.0).unwrap().id, "a0");
        assert_eq!(select(&groups, 1.5).unwrap().id, "a1");
        assert_eq!(select(&groups, 2.0).unwrap().id, "b0");
        assert_eq!(select(&groups, 4.99).unwrap().id, "b0");
        assert_eq!(select(&groups, 5.0).unwrap().id, "b1");
        assert_eq!(select(&groups, 7.99).unwrap().id, "b1");
    }

    #[test]
    fn select_skips_zero_mass_groups() {
        let groups = vec![
            WeightedGroup::new("favorites", 0.0, vec![]),
            WeightedGroup::new("mid", 2.0, items("m", 1)),
        ];
        assert_eq!(select(&groups, 0.5).unwrap().id, "m0");
    }

    #[test]
    fn index_clamped_at_upper_edge() {
        let groups = vec![WeightedGroup::new("a", 1.0, items("a", 3))];
        assert_eq!(select(&groups, 3.0).unwrap().id, "a2");
    }

    #[test]
    fn single_item_always_chosen() {
        let mut rng = StdRng::seed_from_u64(7);
        let groups = vec![WeightedGroup::new("only", 2.5, items("x", 1))];
        for _ in 0..100 {
            assert_eq!(sample(&groups, &mut rng).unwrap().id, "x0");
        }
    }

    #[test]
    fn heavier_group_drawn_more_often() {
        let mut rng = StdRng::seed_from_u64(42);
        let groups = vec![
            WeightedGroup::new("light", 1.0, items("l", 1)),
            WeightedGroup::new("heavy", 9.0, items("h", 1)),
        ];

        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..10_000 {
            let picked = sample(&groups, &mut rng).unwrap();
            *counts.entry(picked.id.clone()).or_default() += 1;
        }

        let heavy = counts["h0"] as f64 / 10_000.0;
        assert!((heavy - 0.9).abs() < 0.02, "heavy share was {}", heavy);
    }
}
