//! World simulation engine - main simulation loop.

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::population::{generate_users, generate_videos};
use crate::scoring::affinity;
use crate::stats::{Stats, StatsHistory};
use crate::user::{Movement, Point, User, UserId};
use crate::video::{Color, Video, VideoId};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use slotmap::SlotMap;

/// Outcome of re-targeting a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Highest-affinity video outside the user's history
    Preferred(VideoId),
    /// Everything was recently visited; lowest-affinity video overall
    ForcedRevisit(VideoId),
    /// No videos exist
    Nothing,
}

impl Selection {
    pub fn target(self) -> Option<VideoId> {
        match self {
            Selection::Preferred(id) | Selection::ForcedRevisit(id) => Some(id),
            Selection::Nothing => None,
        }
    }
}

/// Pick the next target for `user` among `order`.
///
/// Ties go to the first video in `order`. Ids that no longer resolve in
/// `videos` are skipped.
pub fn select_target(
    user: &User,
    videos: &SlotMap<VideoId, Video>,
    order: &[VideoId],
    now: f64,
) -> Selection {
    let scored = move || {
        order
            .iter()
            .filter_map(move |&id| videos.get(id).map(|v| (id, affinity(v, user, now))))
    };

    let mut best: Option<(VideoId, f64)> = None;
    for (id, weight) in scored().filter(|&(id, _)| !user.history.contains(id)) {
        if best.map_or(true, |(_, b)| weight > b) {
            best = Some((id, weight));
        }
    }
    if let Some((id, _)) = best {
        return Selection::Preferred(id);
    }

    let mut worst: Option<(VideoId, f64)> = None;
    for (id, weight) in scored() {
        if worst.map_or(true, |(_, w)| weight < w) {
            worst = Some((id, weight));
        }
    }
    match worst {
        Some((id, _)) => Selection::ForcedRevisit(id),
        None => Selection::Nothing,
    }
}

/// The simulation world
pub struct World {
    // Population. Only `insert_video` and `trim_videos` change the video set,
    // keeping `videos` and `video_order` in step.
    pub(crate) videos: SlotMap<VideoId, Video>,
    /// Insertion order of live videos, oldest first
    pub(crate) video_order: Vec<VideoId>,
    pub users: Vec<User>,

    // State
    pub time: u64,

    // Configuration
    pub config: Config,

    // Statistics
    pub stats: Stats,
    pub stats_history: StatsHistory,

    // ID generation
    pub(crate) next_user_id: UserId,

    // Random number generator (seeded for reproducibility)
    pub(crate) rng: ChaCha8Rng,
    seed: u64,

    pub(crate) clock: Box<dyn Clock>,
}

impl World {
    /// Create a new world with the given configuration.
    ///
    /// # Panics
    ///
    /// The config is not validated. Zero intervals or a margin that leaves no
    /// placement area panic later; use [`World::try_new`] for untrusted input.
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility.
    /// Panics on an invalid config, like [`World::new`].
    pub fn new_with_seed(config: Config, seed: u64) -> Self {
        Self::with_clock(config, seed, Box::new(SystemClock::new()))
    }

    /// Validate `config`, then build a seeded world on the host clock
    pub fn try_new(config: Config, seed: u64) -> Result<Self> {
        Self::try_with_clock(config, seed, Box::new(SystemClock::new()))
    }

    /// Validate `config`, then build a world reading video ages from `clock`
    pub fn try_with_clock(config: Config, seed: u64, clock: Box<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_clock(config, seed, clock))
    }

    /// Create a world reading video ages from `clock`.
    /// Panics on an invalid config, like [`World::new`].
    pub fn with_clock(config: Config, seed: u64, clock: Box<dyn Clock>) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let now = clock.now();
        let mut next_user_id = 0;

        let video_batch = generate_videos(config.population.initial_videos, &config, &mut rng, now);
        let user_batch =
            generate_users(config.population.initial_users, &config, &mut rng, &mut next_user_id);

        let stats_interval = config.logging.stats_interval;
        let mut world = Self {
            videos: SlotMap::with_key(),
            video_order: Vec::new(),
            users: user_batch.items,
            time: 0,
            config,
            stats: Stats::new(),
            stats_history: StatsHistory::new(stats_interval),
            next_user_id,
            rng,
            seed,
            clock,
        };

        for video in video_batch.items {
            world.insert_video(video);
        }
        world.stats.placement_fallbacks = video_batch.fallbacks + user_batch.fallbacks;
        world.update_stats();

        world
    }

    /// Advance one frame: churn on cadence, then move everyone
    pub fn tick(&mut self) {
        self.stats.begin_tick();

        if self.time % self.config.churn.interval == 0 {
            let report = self.churn();
            self.stats.record_churn(report);
        }

        self.step();
        self.time += 1;
        self.update_stats();
    }

    /// Move every user one step, resolve arrivals and re-target
    pub fn step(&mut self) {
        let now = self.clock.now();
        let World {
            videos,
            video_order,
            users,
            config,
            stats,
            rng,
            ..
        } = self;

        for user in users.iter_mut() {
            let needs_target = match user.target {
                None => true,
                Some(id) => match videos.get_mut(id) {
                    None => {
                        stats.stale_targets += 1;
                        user.target = None;
                        true
                    }
                    Some(video) => {
                        let dest = Point::new(video.x, video.y);
                        match user.step_towards(dest, config.movement.step_size) {
                            Movement::Moving => false,
                            Movement::Arrived => {
                                resolve_arrival(user, id, video, rng, config, stats);
                                true
                            }
                        }
                    }
                },
            };

            if needs_target {
                let selection = select_target(user, videos, video_order, now);
                if let Selection::ForcedRevisit(id) = selection {
                    stats.forced_revisits += 1;
                    log::debug!("User {} has visited everything, revisiting {:?}", user.id, id);
                }
                user.target = selection.target();
            }
        }
    }

    /// Update statistics
    fn update_stats(&mut self) {
        self.stats.time = self.time;
        let videos = &self.videos;
        let live = self.video_order.iter().filter_map(|&id| videos.get(id));
        self.stats.update(&self.users, live);

        if self.time % self.config.logging.stats_interval == 0 {
            self.stats_history.record(self.stats.clone());
        }
    }

    /// Run simulation for specified number of ticks
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Run simulation with callback for progress updates
    pub fn run_with_callback<F>(&mut self, ticks: u64, mut callback: F)
    where
        F: FnMut(&World, u64),
    {
        for i in 0..ticks {
            self.tick();
            callback(self, i);
        }
    }

    /// Append a video as the newest entry
    pub fn insert_video(&mut self, video: Video) -> VideoId {
        let id = self.videos.insert(video);
        self.video_order.push(id);
        id
    }

    /// Append a user as the newest entry, assigning it a fresh id
    pub fn insert_user(&mut self, mut user: User) -> UserId {
        user.id = self.next_user_id;
        self.next_user_id += 1;
        self.users.push(user);
        self.next_user_id - 1
    }

    /// Drop the oldest videos beyond `capacity`, returning how many went
    pub fn trim_videos(&mut self, capacity: usize) -> usize {
        let excess = self.video_order.len().saturating_sub(capacity);
        for id in self.video_order.drain(..excess) {
            self.videos.remove(id);
        }
        excess
    }

    /// Drop the oldest users beyond `capacity`, returning how many went
    pub fn trim_users(&mut self, capacity: usize) -> usize {
        let excess = self.users.len().saturating_sub(capacity);
        self.users.drain(..excess);
        excess
    }

    /// Live video ids, oldest first
    pub fn video_ids(&self) -> &[VideoId] {
        &self.video_order
    }

    /// Live videos, oldest first
    pub fn videos_in_order(&self) -> impl Iterator<Item = (VideoId, &Video)> + '_ {
        self.video_order
            .iter()
            .filter_map(move |&id| self.videos.get(id).map(|v| (id, v)))
    }

    /// Read-only view of the video store, for scoring outside the world
    pub fn video_store(&self) -> &SlotMap<VideoId, Video> {
        &self.videos
    }

    pub fn video(&self, id: VideoId) -> Option<&Video> {
        self.videos.get(id)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn video_count(&self) -> usize {
        self.video_order.len()
    }

    /// Current clock reading
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Record the visit, roll for engagement and bump excitement
fn resolve_arrival(
    user: &mut User,
    id: VideoId,
    video: &mut Video,
    rng: &mut ChaCha8Rng,
    config: &Config,
    stats: &mut Stats,
) {
    user.record_segment(video.color(), config.render.trail_alpha);
    user.history.push(id);
    video.visit_count += 1;

    let liked = rng.gen::<f64>() < video.excitement * user.engagement_rate;
    let (mut comments, mut shares) = (0, 0);
    if liked {
        comments = rng.gen_range(0..=config.engagement.max_comments_per_like);
        shares = rng.gen_range(0..=config.engagement.max_shares_per_like);
        video.like_count += 1;
        video.comment_count += comments;
        video.share_count += shares;
    } else {
        user.recolor_last_segment(Color::NOT_LIKED);
    }
    video.excitement += config.engagement.excitement_increment;

    stats.record_arrival(liked, comments, shares);
    log::trace!(
        "User {} arrived at {:?} ({}), liked={}",
        user.id,
        id,
        video.category,
        liked
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::user::Preferences;
    use crate::video::{Category, DurationClass};

    fn empty_config() -> Config {
        let mut config = Config::default();
        config.population.initial_users = 0;
        config.population.initial_videos = 0;
        config
    }

    fn empty_world(seed: u64) -> (World, ManualClock) {
        let clock = ManualClock::new(0.0);
        let world = World::with_clock(empty_config(), seed, Box::new(clock.clone()));
        (world, clock)
    }

    fn video_at(x: f64, y: f64, category: Category, excitement: f64) -> Video {
        Video::new(x, y, category, 0.5, vec![], DurationClass::Short, excitement, 0.0)
    }

    fn user_at(x: f64, y: f64, engagement_rate: f64) -> User {
        User::new(
            0,
            x,
            y,
            Preferences::normalized([1.0; 4]),
            engagement_rate,
            DurationClass::Short,
            15,
        )
    }

    #[test]
    fn test_world_creation() {
        let config = Config::default();
        let world = World::new(config.clone());

        assert_eq!(world.user_count(), config.population.initial_users);
        assert_eq!(world.video_count(), config.population.initial_videos);
        assert_eq!(world.time, 0);
    }

    #[test]
    fn test_world_run() {
        let mut world = World::new(Config::default());
        world.run(100);
        assert_eq!(world.time, 100);
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.movement.step_size = -1.0;
        assert!(World::try_new(config, 1).is_err());
    }

    #[test]
    fn test_user_without_target_selects_without_moving() {
        let (mut world, _clock) = empty_world(1);
        world.insert_video(video_at(5.0, 5.0, Category::Food, 0.5));
        world.insert_user(user_at(2.0, 2.0, 1.0));

        world.step();

        let user = &world.users[0];
        assert_eq!(user.position(), Point::new(2.0, 2.0));
        assert!(user.target.is_some());
    }

    #[test]
    fn test_unit_distance_arrives_in_ten_ticks() {
        let (mut world, _clock) = empty_world(2);
        let id = world.insert_video(video_at(1.0, 0.0, Category::Food, 0.5));
        world.insert_user(user_at(0.0, 0.0, 1.0));
        world.users[0].target = Some(id);

        for _ in 0..9 {
            world.step();
            assert_eq!(world.videos[id].visit_count, 0);
        }
        world.step();
        assert_eq!(world.videos[id].visit_count, 1);
        assert_eq!(world.users[0].position(), Point::new(1.0, 0.0));
    }

    #[test]
    fn test_arrival_updates_counters_once() {
        let (mut world, _clock) = empty_world(3);
        let id = world.insert_video(video_at(0.05, 0.0, Category::Vlog, 0.4));
        world.insert_user(user_at(0.0, 0.0, 1.0));
        world.users[0].target = Some(id);

        world.step();

        let video = &world.videos[id];
        assert_eq!(video.visit_count, 1);
        assert!(video.like_count <= 1);
        assert!(video.comment_count <= 2);
        assert!(video.share_count <= 1);
        if video.like_count == 0 {
            assert_eq!(video.comment_count + video.share_count, 0);
        }
        assert!((video.excitement - 0.5).abs() < 1e-12);
        assert_eq!(world.users[0].history.len(), 1);
        assert_eq!(world.users[0].trail.len(), 1);
        assert_eq!(world.stats.arrivals, 1);
    }

    #[test]
    fn test_certain_like_keeps_category_color() {
        let (mut world, _clock) = empty_world(4);
        // excitement * engagement >= 1 always likes
        let id = world.insert_video(video_at(0.05, 0.0, Category::Technology, 1.0));
        world.insert_user(user_at(0.0, 0.0, 1.5));
        world.users[0].target = Some(id);

        world.step();

        assert_eq!(world.videos[id].like_count, 1);
        let segment = world.users[0].trail[0];
        assert_eq!(segment.color, Color::BLUE);
        assert_eq!(segment.alpha, world.config.render.trail_alpha);
    }

    #[test]
    fn test_impossible_like_recolors_segment() {
        let (mut world, _clock) = empty_world(5);
        let id = world.insert_video(video_at(0.05, 0.0, Category::Food, 0.0));
        world.insert_user(user_at(0.0, 0.0, 1.0));
        world.users[0].target = Some(id);

        world.step();

        let video = &world.videos[id];
        assert_eq!(video.like_count, 0);
        assert!((video.excitement - 0.1).abs() < 1e-12);
        let segment = world.users[0].trail[0];
        assert_eq!(segment.color, Color::NOT_LIKED);
        assert_eq!(segment.alpha, world.config.render.trail_alpha);
    }

    #[test]
    fn test_retarget_skips_visited() {
        let (mut world, _clock) = empty_world(6);
        let a = world.insert_video(video_at(3.0, 3.0, Category::Food, 0.9));
        let b = world.insert_video(video_at(6.0, 6.0, Category::Food, 0.1));
        let mut user = user_at(1.0, 1.0, 1.0);
        user.history.push(a);

        let selection = select_target(&user, &world.videos, world.video_ids(), world.now());
        assert_eq!(selection, Selection::Preferred(b));
    }

    #[test]
    fn test_retarget_ties_go_to_first_seen() {
        let (mut world, _clock) = empty_world(7);
        let a = world.insert_video(video_at(3.0, 3.0, Category::Food, 0.5));
        let _b = world.insert_video(video_at(6.0, 6.0, Category::Food, 0.5));
        let user = user_at(1.0, 1.0, 1.0);

        let selection = select_target(&user, &world.videos, world.video_ids(), world.now());
        assert_eq!(selection, Selection::Preferred(a));
    }

    #[test]
    fn test_all_visited_forces_min_weight_revisit() {
        let (mut world, _clock) = empty_world(8);
        let ids: Vec<VideoId> = [0.8, 0.2, 0.5, 0.9]
            .iter()
            .zip(Category::ALL)
            .enumerate()
            .map(|(i, (&exc, cat))| world.insert_video(video_at(2.0 + i as f64, 5.0, cat, exc)))
            .collect();

        let mut user = user_at(1.0, 1.0, 1.0);
        for &id in &ids {
            user.history.push(id);
        }

        let selection = select_target(&user, &world.videos, world.video_ids(), world.now());
        assert_eq!(selection, Selection::ForcedRevisit(ids[1]));
    }

    #[test]
    fn test_no_videos_means_no_target() {
        let (world, _clock) = empty_world(9);
        let user = user_at(1.0, 1.0, 1.0);
        let selection = select_target(&user, &world.videos, world.video_ids(), world.now());
        assert_eq!(selection, Selection::Nothing);
        assert_eq!(selection.target(), None);
    }

    #[test]
    fn test_stale_target_retargets_without_moving() {
        let (mut world, _clock) = empty_world(10);
        let old = world.insert_video(video_at(8.0, 8.0, Category::Food, 0.5));
        let fresh = world.insert_video(video_at(5.0, 5.0, Category::Vlog, 0.5));
        world.insert_user(user_at(2.0, 2.0, 1.0));
        world.users[0].target = Some(old);

        assert_eq!(world.trim_videos(1), 1);
        assert!(world.video(old).is_none());

        world.step();

        assert_eq!(world.users[0].position(), Point::new(2.0, 2.0));
        assert_eq!(world.users[0].target, Some(fresh));
        assert_eq!(world.stats.stale_targets, 1);
    }

    #[test]
    fn test_history_bounded_over_many_arrivals() {
        let (mut world, _clock) = empty_world(11);
        let ids: Vec<VideoId> = (0..20)
            .map(|i| {
                let x = 1.0 + (i % 5) as f64 * 0.05;
                let y = 1.0 + (i / 5) as f64 * 0.05;
                world.insert_video(video_at(x, y, Category::ALL[i % 4], 0.5))
            })
            .collect();
        world.insert_user(user_at(1.0, 1.0, 1.0));

        let mut arrivals = Vec::new();
        for _ in 0..200 {
            let before = world.users[0].target;
            let visits_before: u32 = world.videos.values().map(|v| v.visit_count).sum();
            world.step();
            let visits_after: u32 = world.videos.values().map(|v| v.visit_count).sum();
            if visits_after > visits_before {
                arrivals.extend(before);
            }
        }

        assert!(arrivals.len() > 15, "only {} arrivals", arrivals.len());
        let history: Vec<VideoId> = world.users[0].history.iter().copied().collect();
        assert_eq!(history.len(), 15);
        assert_eq!(history, arrivals[arrivals.len() - 15..].to_vec());
        assert!(ids.iter().any(|id| history.contains(id)));
    }

    #[test]
    fn test_seeded_worlds_match() {
        let mut worlds: Vec<World> = (0..2)
            .map(|_| World::with_clock(Config::default(), 42, Box::new(ManualClock::new(0.0))))
            .collect();
        for world in &mut worlds {
            world.run(300);
        }

        let positions = |w: &World| -> Vec<(f64, f64)> { w.users.iter().map(|u| (u.x, u.y)).collect() };
        assert_eq!(positions(&worlds[0]), positions(&worlds[1]));
        assert_eq!(worlds[0].stats.total_likes, worlds[1].stats.total_likes);
    }

    #[test]
    fn test_aging_clock_changes_preference() {
        let (mut world, clock) = empty_world(12);
        let old = world.insert_video(video_at(3.0, 3.0, Category::Food, 0.6));
        clock.set(100.0);
        let mut young = video_at(6.0, 6.0, Category::Food, 0.1);
        young.created_at = 100.0;
        let young = world.insert_video(young);

        let user = user_at(1.0, 1.0, 1.0);
        let selection = select_target(&user, &world.videos, world.video_ids(), world.now());
        assert_eq!(selection, Selection::Preferred(young));
        assert_ne!(selection.target(), Some(old));
    }

    #[test]
    fn test_stats_count_the_ordered_store() {
        let (mut world, _clock) = empty_world(13);
        for i in 0..5 {
            world.insert_video(video_at(2.0 + i as f64, 5.0, Category::Vlog, 0.2));
        }
        world.trim_videos(3);
        world.tick();

        assert_eq!(world.video_store().len(), world.video_count());
        assert_eq!(world.stats.videos, world.video_count());
        let snapshot = crate::snapshot::WorldSnapshot::from_world(&world);
        assert_eq!(snapshot.videos.len(), world.stats.videos);
    }

    #[test]
    fn test_try_with_clock_rejects_invalid_config() {
        use crate::error::Error;

        let mut zero_churn = Config::default();
        zero_churn.churn.interval = 0;
        let mut zero_stats = Config::default();
        zero_stats.logging.stats_interval = 0;
        let mut wide_margin = Config::default();
        wide_margin.arena.margin = 6.0;

        for config in [zero_churn, zero_stats, wide_margin] {
            let built = World::try_with_clock(config, 1, Box::new(ManualClock::new(0.0)));
            assert!(matches!(built, Err(Error::InvalidConfig(_))));
        }
        assert!(World::try_with_clock(Config::default(), 1, Box::new(ManualClock::new(0.0))).is_ok());
    }
}
