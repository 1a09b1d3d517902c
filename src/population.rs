//! Population generation: clustered video placement and user spawning.
//!
//! All placement goes through a bounded retry loop. When the budget runs out
//! the best candidate seen is accepted and a warning is logged, so crowded
//! arenas degrade into occasional spacing violations instead of failures.

use crate::config::{ArenaConfig, Config};
use crate::user::{Point, Preferences, User, UserId};
use crate::video::{Category, DurationClass, Video};
use rand::seq::SliceRandom;
use rand::Rng;

/// Outcome of a bounded placement search
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// All constraints held
    Satisfied { point: Point, attempts: usize },
    /// Budget exhausted; best available point accepted
    Fallback { point: Point, attempts: usize },
}

impl Placement {
    pub fn point(&self) -> Point {
        match *self {
            Placement::Satisfied { point, .. } | Placement::Fallback { point, .. } => point,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Placement::Fallback { .. })
    }
}

/// Newly generated entities plus how many needed a fallback placement
#[derive(Debug, Clone)]
pub struct Batch<T> {
    pub items: Vec<T>,
    pub fallbacks: usize,
}

/// Sample points until one lies inside the inset arena with at least
/// `min_spacing` clearance from `placed`.
///
/// On exhaustion returns the in-bounds attempt with the most clearance, or
/// the last attempt clamped into bounds if no attempt was in bounds.
pub fn place<R: Rng>(
    rng: &mut R,
    arena: &ArenaConfig,
    placed: &[Point],
    min_spacing: f64,
    max_attempts: usize,
    mut sample: impl FnMut(&mut R) -> Point,
) -> Placement {
    let mut best: Option<(Point, f64)> = None;
    let mut last = Point::new(arena.min(), arena.min());

    for attempt in 1..=max_attempts.max(1) {
        let candidate = sample(rng);
        last = candidate;

        if !arena.contains(candidate.x, candidate.y) {
            continue;
        }

        let clearance = placed
            .iter()
            .map(|p| p.distance_to(candidate))
            .fold(f64::INFINITY, f64::min);

        if clearance >= min_spacing {
            return Placement::Satisfied {
                point: candidate,
                attempts: attempt,
            };
        }

        if best.map_or(true, |(_, c)| clearance > c) {
            best = Some((candidate, clearance));
        }
    }

    let point = match best {
        Some((point, _)) => point,
        None => Point::new(
            last.x.clamp(arena.min(), arena.max()),
            last.y.clamp(arena.min(), arena.max()),
        ),
    };

    Placement::Fallback {
        point,
        attempts: max_attempts,
    }
}

/// Uniform point in the inset arena
fn uniform_point(rng: &mut impl Rng, arena: &ArenaConfig) -> Point {
    Point::new(
        rng.gen_range(arena.min()..arena.max()),
        rng.gen_range(arena.min()..arena.max()),
    )
}

/// Generate `count / 4` videos per category around one random cluster center
/// each. The remainder of the division is dropped.
pub fn generate_videos(count: usize, config: &Config, rng: &mut impl Rng, now: f64) -> Batch<Video> {
    let arena = &config.arena;
    let pop = &config.population;
    let per_category = count / Category::ALL.len();

    let mut items = Vec::with_capacity(per_category * Category::ALL.len());
    let mut placed: Vec<Point> = Vec::with_capacity(items.capacity());
    let mut fallbacks = 0;

    for category in Category::ALL {
        let center = uniform_point(rng, arena);
        let jitter = pop.cluster_jitter;

        for _ in 0..per_category {
            let placement = place(
                rng,
                arena,
                &placed,
                pop.min_spacing,
                pop.max_placement_attempts,
                |rng| {
                    Point::new(
                        center.x + rng.gen_range(-jitter..=jitter),
                        center.y + rng.gen_range(-jitter..=jitter),
                    )
                },
            );

            let point = placement.point();
            if placement.is_fallback() {
                fallbacks += 1;
                log::warn!(
                    "Could not place {} video within {} attempts, accepting ({:.2}, {:.2})",
                    category,
                    pop.max_placement_attempts,
                    point.x,
                    point.y
                );
            }
            placed.push(point);

            let quality = rng.gen_range(0.0..=1.0);
            let tags = (0..pop.tags_per_video)
                .filter_map(|_| pop.tag_vocabulary.choose(&mut *rng).cloned())
                .collect();
            let duration = DurationClass::random(rng);
            let excitement = rng.gen_range(0.0..=1.0);

            items.push(Video::new(
                point.x, point.y, category, quality, tags, duration, excitement, now,
            ));
        }
    }

    Batch { items, fallbacks }
}

/// Generate `count` users at uniform positions, assigning ids from `next_id`
pub fn generate_users(
    count: usize,
    config: &Config,
    rng: &mut impl Rng,
    next_id: &mut UserId,
) -> Batch<User> {
    let arena = &config.arena;
    let mut items = Vec::with_capacity(count);
    let mut fallbacks = 0;

    for _ in 0..count {
        let placement = place(
            rng,
            arena,
            &[],
            0.0,
            config.population.max_placement_attempts,
            |rng| uniform_point(rng, arena),
        );
        let point = placement.point();
        if placement.is_fallback() {
            fallbacks += 1;
            log::warn!(
                "Could not place user within {} attempts, accepting ({:.2}, {:.2})",
                config.population.max_placement_attempts,
                point.x,
                point.y
            );
        }

        let preferences = Preferences::random(rng);
        let engagement_rate = rng.gen_range(0.5..=1.5);
        let preferred_duration = DurationClass::random(rng);

        items.push(User::new(
            *next_id,
            point.x,
            point.y,
            preferences,
            engagement_rate,
            preferred_duration,
            config.movement.history_capacity,
        ));
        *next_id += 1;
    }

    Batch { items, fallbacks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_remainder_videos_dropped() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(generate_videos(22, &config, &mut rng, 0.0).items.len(), 20);
        assert_eq!(generate_videos(3, &config, &mut rng, 0.0).items.len(), 0);
        assert_eq!(generate_videos(5, &config, &mut rng, 0.0).items.len(), 4);
    }

    #[test]
    fn test_videos_grouped_by_category() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let batch = generate_videos(8, &config, &mut rng, 12.0);
        let categories: Vec<Category> = batch.items.iter().map(|v| v.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Technology,
                Category::Technology,
                Category::Entertainment,
                Category::Entertainment,
                Category::Food,
                Category::Food,
                Category::Vlog,
                Category::Vlog,
            ]
        );
        for v in &batch.items {
            assert_eq!(v.created_at, 12.0);
            assert_eq!(v.tags.len(), 3);
            assert_eq!(v.visit_count, 0);
            assert!((0.0..=1.0).contains(&v.quality));
            assert!((0.0..=1.0).contains(&v.excitement));
            assert!(v.tags.iter().all(|t| config.population.tag_vocabulary.contains(t)));
        }
    }

    #[test]
    fn test_place_succeeds_in_open_space() {
        let arena = ArenaConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let placement = place(&mut rng, &arena, &[Point::new(2.0, 2.0)], 1.0, 1000, |rng| {
            uniform_point(rng, &arena)
        });
        assert!(!placement.is_fallback());
        assert!(placement.point().distance_to(Point::new(2.0, 2.0)) >= 1.0);
    }

    #[test]
    fn test_place_exhaustion_falls_back_in_bounds() {
        let arena = ArenaConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        // Every sample lands on an existing point, spacing can never hold
        let crowded = [Point::new(5.0, 5.0)];
        let placement = place(&mut rng, &arena, &crowded, 1.0, 10, |_| Point::new(5.0, 5.0));
        assert!(placement.is_fallback());
        assert_eq!(placement.point(), Point::new(5.0, 5.0));
    }

    #[test]
    fn test_place_out_of_bounds_fallback_is_clamped() {
        let arena = ArenaConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let placement = place(&mut rng, &arena, &[], 0.0, 5, |_| Point::new(-3.0, 42.0));
        assert_eq!(
            placement,
            Placement::Fallback {
                point: Point::new(1.0, 9.0),
                attempts: 5
            }
        );
    }

    #[test]
    fn test_users_get_sequential_ids() {
        let config = Config::default();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut next_id = 10;
        let batch = generate_users(3, &config, &mut rng, &mut next_id);
        let ids: Vec<UserId> = batch.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert_eq!(next_id, 13);
        assert!(batch.items.iter().all(|u| u.target.is_none() && u.trail.is_empty()));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn proptest_videos_within_margin(seed in any::<u64>(), count in 0usize..40) {
            let config = Config::default();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let batch = generate_videos(count, &config, &mut rng, 0.0);
            let (lo, hi) = (config.arena.min(), config.arena.max());
            for v in &batch.items {
                prop_assert!(v.x >= lo && v.x <= hi, "x {} outside [{}, {}]", v.x, lo, hi);
                prop_assert!(v.y >= lo && v.y <= hi, "y {} outside [{}, {}]", v.y, lo, hi);
            }
        }

        #[test]
        fn proptest_user_preferences_normalized(seed in any::<u64>()) {
            let config = Config::default();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut next_id = 0;
            let batch = generate_users(20, &config, &mut rng, &mut next_id);
            for u in &batch.items {
                prop_assert!((u.preferences.total() - 1.0).abs() < 1e-9);
                prop_assert!(u.preferences.as_array().iter().all(|&w| w >= 0.0));
                prop_assert!((0.5..=1.5).contains(&u.engagement_rate));
                prop_assert!(config.arena.contains(u.x, u.y));
            }
        }
    }
}
