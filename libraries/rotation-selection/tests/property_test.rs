//! Property-based tests for weight calculation and sampling
//!
//! Uses proptest to verify the mass invariants across random pools.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rotation_selection::{compute_groups, sample, FavoriteRatio, RatedItem, WeightedGroup};
use std::collections::HashMap;

// ===== Helpers =====

fn arbitrary_item() -> impl Strategy<Value = RatedItem> {
    ("[a-z0-9]{1,8}", 0u8..=5, any::<bool>()).prop_map(|(id, rating, favorite)| {
        RatedItem::new(id.clone(), id, "http://music/item")
            .with_rating(rating)
            .with_favorite(favorite || rating == 5)
    })
}

fn arbitrary_group(name: &'static str) -> impl Strategy<Value = WeightedGroup> {
    (0.5f64..10.0, 0usize..6).prop_map(move |(weight, count)| {
        let items = (0..count)
            .map(|i| {
                let id = format!("{}-{}", name, i);
                RatedItem::new(id.clone(), id, "http://music/item")
            })
            .collect();
        WeightedGroup::new(name, weight, items)
    })
}

// ===== Property Tests =====

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: sampled group frequencies converge to mass fractions
    #[test]
    fn sampling_converges_to_mass_fractions(
        a in arbitrary_group("a"),
        b in arbitrary_group("b"),
        c in arbitrary_group("c"),
        seed in any::<u64>(),
    ) {
        let groups = vec![a, b, c];
        let total: f64 = groups.iter().map(WeightedGroup::mass).sum();
        prop_assume!(total > 0.0);

        let mut rng = StdRng::seed_from_u64(seed);
        let draws = 10_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..draws {
            let item = sample(&groups, &mut rng).expect("positive mass yields an item");
            let group = item.id.split('-').next().unwrap().to_string();
            *counts.entry(group).or_default() += 1;
        }

        for group in &groups {
            let expected = group.mass() / total;
            let observed = *counts.get(&group.name).unwrap_or(&0) as f64 / draws as f64;
            prop_assert!(
                (expected - observed).abs() < 0.03,
                "group {} expected {:.3} observed {:.3}", group.name, expected, observed
            );
        }
    }

    /// Property: favorites hold exactly the configured share of the mass
    #[test]
    fn favorites_hold_configured_share(
        pool in prop::collection::vec(arbitrary_item(), 1..60),
        percent in 1u32..100,
    ) {
        let ratio = FavoriteRatio::from_percent(f64::from(percent)).unwrap();
        let groups = compute_groups(&pool, ratio);

        let favorite_mass: f64 = groups.iter().filter(|g| g.name == "favorites").map(WeightedGroup::mass).sum();
        let rest_mass: f64 = groups.iter().filter(|g| g.name != "favorites").map(WeightedGroup::mass).sum();
        let total = favorite_mass + rest_mass;

        if favorite_mass > 0.0 && rest_mass > 0.0 {
            prop_assert!((favorite_mass / total - ratio.value()).abs() < 1e-9);
        }
        prop_assert!(groups.iter().all(|g| g.weight.is_finite() && g.weight >= 0.0));
    }

    /// Property: groups partition the non-excluded pool
    #[test]
    fn groups_partition_candidates(
        pool in prop::collection::vec(arbitrary_item(), 0..60),
    ) {
        let groups = compute_groups(&pool, FavoriteRatio::default());
        let grouped: usize = groups.iter().map(|g| g.items.len()).sum();
        let candidates = pool.iter().filter(|i| !i.is_excluded()).count();

        prop_assert_eq!(grouped, candidates);
        prop_assert!(groups.iter().flat_map(|g| g.items.iter()).all(|i| !i.is_excluded()));
    }
}
