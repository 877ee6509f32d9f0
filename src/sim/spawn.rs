//! Spawn scheduler
//!
//! Timer- and score-gated generators that append new entities to the pools.
//! All randomness comes from the injected [`Pcg32`], so a seed fully
//! determines the spawn sequence. Nothing spawns once the terminal score is
//! reached.

use rand::Rng;
use rand_pcg::Pcg32;

use super::rect::Rect;
use super::state::{
    Collectible, FlyingEnemy, FlyingKind, Obstacle, ObstacleKind, Platform, PlatformSize, Pools,
};
use crate::tuning::{FlyerClass, Interval, SizeClass, Tuning};

/// Minimum horizontal gap between consecutive platforms
const PLATFORM_GAP: f32 = 40.0;
/// Extra random lead-in for pickups
const COLLECTIBLE_JITTER: f32 = 40.0;

/// Obstacle cluster patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    Single,
    Double,
    Triple,
}

impl Pattern {
    pub fn count(self) -> usize {
        match self {
            Pattern::Single => 1,
            Pattern::Double => 2,
            Pattern::Triple => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    rng: Pcg32,
    last_obstacle_ms: f64,
    obstacle_interval_ms: f64,
    last_platform_ms: f64,
    platform_interval_ms: f64,
    /// Band the pending collectible targets belong to
    collectible_band: Option<u32>,
    /// Scores at which a collectible appears, ascending
    collectible_targets: Vec<u32>,
}

impl SpawnScheduler {
    pub fn new(mut rng: Pcg32, tuning: &Tuning) -> Self {
        let obstacle_interval_ms = roll(&mut rng, tuning.obstacles.interval_ms);
        let platform_interval_ms = roll(&mut rng, tuning.platforms.interval_ms);
        Self {
            rng,
            last_obstacle_ms: 0.0,
            obstacle_interval_ms,
            last_platform_ms: 0.0,
            platform_interval_ms,
            collectible_band: None,
            collectible_targets: Vec::new(),
        }
    }

    /// Pending collectible target scores for the current band
    pub fn collectible_targets(&self) -> &[u32] {
        &self.collectible_targets
    }

    /// Spawn an obstacle (or a cluster) once the randomized interval has
    /// elapsed. Returns how many obstacles were added.
    pub fn maybe_spawn_obstacle(&mut self, now: f64, score: u32, tuning: &Tuning, pools: &mut Pools) -> usize {
        if score >= tuning.world.terminal_score {
            return 0;
        }
        if now - self.last_obstacle_ms < self.obstacle_interval_ms {
            return 0;
        }
        self.last_obstacle_ms = now;
        self.obstacle_interval_ms = roll(&mut self.rng, tuning.obstacles.interval_ms);

        let kind = self.pick_obstacle_kind(score, tuning);
        let pattern = if score >= tuning.obstacles.cluster_score {
            match self.rng.random_range(0..3) {
                0 => Pattern::Single,
                1 => Pattern::Double,
                _ => Pattern::Triple,
            }
        } else {
            Pattern::Single
        };
        self.spawn_cluster(kind, pattern, score, tuning, pools);
        pattern.count()
    }

    /// Append `pattern` obstacles of `kind`, each at least the class's
    /// minimum spacing after the previous one
    pub fn spawn_cluster(
        &mut self,
        kind: ObstacleKind,
        pattern: Pattern,
        score: u32,
        tuning: &Tuning,
        pools: &mut Pools,
    ) {
        let o = &tuning.obstacles;
        let class = size_class(kind, tuning);
        let speed = tuning.world.speed_for_score(score);
        let ground_y = tuning.world.ground_y;

        let mut x = tuning.world.canvas_width + self.rng.random_range(0.0..=o.position_jitter);
        if let Some(right) = pools.obstacles.iter().map(|prev| prev.rect.right()).reduce(f32::max) {
            x = x.max(right + class.min_spacing);
        }

        for _ in 0..pattern.count() {
            let height = class.height + self.rng.random_range(0.0..=o.height_jitter);
            let rect = Rect::standing_on(x, ground_y, class.width, height);
            let id = pools.next_entity_id();
            pools.obstacles.push(Obstacle { id, kind, rect, speed });
            x = rect.right() + class.min_spacing + self.rng.random_range(0.0..=o.position_jitter);
        }
        log::debug!("Spawned {:?} x{} at score {}", kind, pattern.count(), score);
    }

    fn pick_obstacle_kind(&mut self, score: u32, tuning: &Tuning) -> ObstacleKind {
        let o = &tuning.obstacles;
        if score >= o.xxl.unlock_score && self.rng.random_bool(o.xxl.probability) {
            ObstacleKind::Xxl
        } else if score >= o.xl.unlock_score && self.rng.random_bool(o.xl.probability) {
            ObstacleKind::Xl
        } else {
            ObstacleKind::Normal
        }
    }

    /// Independent per-frame rolls for each flying enemy subtype
    pub fn maybe_spawn_flyers(&mut self, score: u32, tuning: &Tuning, pools: &mut Pools) -> usize {
        if score >= tuning.world.terminal_score {
            return 0;
        }
        let mut spawned = 0;
        for (kind, class) in [
            (FlyingKind::Bird, &tuning.flyers.bird),
            (FlyingKind::Saucer, &tuning.flyers.saucer),
        ] {
            if score >= class.unlock_score && self.rng.random_bool(class.probability) {
                self.spawn_flyer(kind, class, score, tuning, pools);
                spawned += 1;
            }
        }
        spawned
    }

    fn spawn_flyer(&mut self, kind: FlyingKind, class: &FlyerClass, score: u32, tuning: &Tuning, pools: &mut Pools) {
        let altitude = self.rng.random_range(class.min_altitude..=class.max_altitude);
        let y = tuning.world.ground_y - altitude - class.height;
        let id = pools.next_entity_id();
        pools.flyers.push(FlyingEnemy {
            id,
            kind,
            rect: Rect::new(tuning.world.canvas_width, y, class.width, class.height),
            speed: tuning.world.speed_for_score(score) * class.speed_factor,
            base_y: y,
            bob_amplitude: class.bob_amplitude,
            bob_phase: self.rng.random_range(0.0..=std::f32::consts::TAU),
        });
        log::debug!("Spawned {:?} at score {}", kind, score);
    }

    /// Spawn a floating platform on its own randomized interval
    pub fn maybe_spawn_platform(&mut self, now: f64, score: u32, tuning: &Tuning, pools: &mut Pools) -> bool {
        let pl = &tuning.platforms;
        if score < pl.unlock_score || score >= tuning.world.terminal_score {
            return false;
        }
        if now - self.last_platform_ms < self.platform_interval_ms {
            return false;
        }
        self.last_platform_ms = now;
        self.platform_interval_ms = roll(&mut self.rng, pl.interval_ms);

        let band = pl.height_bands[self.rng.random_range(0..pl.height_bands.len())];
        let altitude = band + self.rng.random_range(-pl.height_jitter..=pl.height_jitter);
        let size = self.pick_platform_size(score, tuning);
        let width = pl.widths[size.index()];

        let mut x = tuning.world.canvas_width;
        if let Some(right) = pools.platforms.iter().map(|p| p.rect.right()).reduce(f32::max) {
            x = x.max(right + PLATFORM_GAP);
        }

        let id = pools.next_entity_id();
        pools.platforms.push(Platform {
            id,
            size,
            rect: Rect::new(x, tuning.world.ground_y - altitude, width, pl.thickness),
            speed: tuning.world.speed_for_score(score),
        });
        true
    }

    fn pick_platform_size(&mut self, score: u32, tuning: &Tuning) -> PlatformSize {
        let weights = platform_weights(score, tuning.world.terminal_score);
        let mut pick = self.rng.random_range(0.0..weights.iter().sum::<f64>());
        for (size, weight) in PlatformSize::ALL.into_iter().zip(weights) {
            if pick < weight {
                return size;
            }
            pick -= weight;
        }
        PlatformSize::Long
    }

    /// Spawn a dash-fuel pickup for every pre-computed target score reached
    pub fn maybe_spawn_collectible(&mut self, score: u32, tuning: &Tuning, pools: &mut Pools) -> usize {
        if score >= tuning.world.terminal_score {
            return 0;
        }
        let band = score / tuning.collectibles.band_size;
        if self.collectible_band != Some(band) {
            self.plan_collectible_band(band, tuning);
        }

        let due = self.collectible_targets.iter().take_while(|&&t| t <= score).count();
        self.collectible_targets.drain(..due);
        for _ in 0..due {
            self.spawn_collectible(score, tuning, pools);
        }
        due
    }

    /// Pick 4-6 (per tuning) target scores spread across one band
    fn plan_collectible_band(&mut self, band: u32, tuning: &Tuning) {
        let c = &tuning.collectibles;
        let count = self.rng.random_range(c.per_band_min..=c.per_band_max);
        let segment = c.band_size / count;
        let base = band * c.band_size;
        self.collectible_targets = (0..count)
            .map(|i| {
                let offset = if segment > 1 { self.rng.random_range(1..segment) } else { 0 };
                base + i * segment + offset
            })
            .collect();
        self.collectible_band = Some(band);
        log::debug!("Collectible targets for band {}: {:?}", band, self.collectible_targets);
    }

    fn spawn_collectible(&mut self, score: u32, tuning: &Tuning, pools: &mut Pools) {
        let c = &tuning.collectibles;
        let altitude = self.rng.random_range(c.min_altitude..=c.max_altitude);
        let x = tuning.world.canvas_width + self.rng.random_range(0.0..=COLLECTIBLE_JITTER);
        let id = pools.next_entity_id();
        pools.collectibles.push(Collectible {
            id,
            rect: Rect::new(x, tuning.world.ground_y - altitude - c.height, c.width, c.height),
            speed: tuning.world.speed_for_score(score),
            collected: false,
        });
    }
}

/// Footprint and spacing for an obstacle kind
pub fn size_class(kind: ObstacleKind, tuning: &Tuning) -> &SizeClass {
    match kind {
        ObstacleKind::Normal => &tuning.obstacles.normal,
        ObstacleKind::Xl => &tuning.obstacles.xl,
        ObstacleKind::Xxl => &tuning.obstacles.xxl,
    }
}

/// Short/medium/long weights; longer platforms grow likelier with score
pub fn platform_weights(score: u32, terminal_score: u32) -> [f64; 3] {
    let t = (score as f64 / terminal_score.max(1) as f64).min(1.0);
    [0.5 - 0.35 * t, 0.35, 0.15 + 0.35 * t]
}

fn roll(rng: &mut Pcg32, interval: Interval) -> f64 {
    rng.random_range(interval.min..=interval.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn scheduler(seed: u64, tuning: &Tuning) -> SpawnScheduler {
        SpawnScheduler::new(Pcg32::seed_from_u64(seed), tuning)
    }

    #[test]
    fn test_obstacle_waits_for_interval() {
        let tuning = Tuning::default();
        let mut spawner = scheduler(1, &tuning);
        let mut pools = Pools::new();

        assert_eq!(spawner.maybe_spawn_obstacle(500.0, 0, &tuning, &mut pools), 0);
        assert_eq!(spawner.maybe_spawn_obstacle(2500.0, 0, &tuning, &mut pools), 1);
        // Interval restarts from the spawn
        assert_eq!(spawner.maybe_spawn_obstacle(2600.0, 0, &tuning, &mut pools), 0);
        assert_eq!(pools.obstacles.len(), 1);
        assert_eq!(pools.obstacles[0].kind, ObstacleKind::Normal);
        assert!((pools.obstacles[0].rect.bottom() - tuning.world.ground_y).abs() < 1e-3);
    }

    #[test]
    fn test_cluster_respects_min_spacing() {
        let tuning = Tuning::default();
        let mut spawner = scheduler(2, &tuning);
        for kind in [ObstacleKind::Normal, ObstacleKind::Xl, ObstacleKind::Xxl] {
            let mut pools = Pools::new();
            spawner.spawn_cluster(kind, Pattern::Triple, 200, &tuning, &mut pools);
            assert_eq!(pools.obstacles.len(), 3);
            let spacing = size_class(kind, &tuning).min_spacing;
            for pair in pools.obstacles.windows(2) {
                let gap = pair[1].rect.x - pair[0].rect.right();
                assert!(gap >= spacing - 1e-3, "{kind:?} gap {gap} < {spacing}");
            }
        }
    }

    #[test]
    fn test_new_obstacle_keeps_spacing_from_previous() {
        let tuning = Tuning::default();
        let mut spawner = scheduler(3, &tuning);
        let mut pools = Pools::new();
        spawner.spawn_cluster(ObstacleKind::Normal, Pattern::Triple, 100, &tuning, &mut pools);
        let last_right = pools.obstacles[2].rect.right();
        spawner.spawn_cluster(ObstacleKind::Xxl, Pattern::Single, 100, &tuning, &mut pools);
        assert!(pools.obstacles[3].rect.x - last_right >= tuning.obstacles.xxl.min_spacing - 1e-3);
    }

    #[test]
    fn test_large_classes_locked_at_low_score() {
        let tuning = Tuning::default();
        let mut spawner = scheduler(4, &tuning);
        for _ in 0..200 {
            assert_eq!(spawner.pick_obstacle_kind(10, &tuning), ObstacleKind::Normal);
        }
        let kinds: Vec<_> = (0..400).map(|_| spawner.pick_obstacle_kind(300, &tuning)).collect();
        assert!(kinds.contains(&ObstacleKind::Xl));
        assert!(kinds.contains(&ObstacleKind::Xxl));
    }

    #[test]
    fn test_no_spawns_at_terminal_score() {
        let tuning = Tuning::default();
        let terminal = tuning.world.terminal_score;
        let mut spawner = scheduler(5, &tuning);
        let mut pools = Pools::new();
        let mut now = 0.0;
        for _ in 0..2000 {
            now += 100.0;
            spawner.maybe_spawn_obstacle(now, terminal, &tuning, &mut pools);
            spawner.maybe_spawn_flyers(terminal, &tuning, &mut pools);
            spawner.maybe_spawn_platform(now, terminal, &tuning, &mut pools);
            spawner.maybe_spawn_collectible(terminal, &tuning, &mut pools);
        }
        assert!(pools.is_empty());
    }

    #[test]
    fn test_flyers_gated_by_score() {
        let tuning = Tuning::default();
        let mut spawner = scheduler(6, &tuning);
        let mut pools = Pools::new();
        for _ in 0..5000 {
            spawner.maybe_spawn_flyers(20, &tuning, &mut pools);
        }
        assert!(pools.flyers.is_empty());

        for _ in 0..5000 {
            spawner.maybe_spawn_flyers(50, &tuning, &mut pools);
        }
        assert!(!pools.flyers.is_empty());
        assert!(pools.flyers.iter().all(|f| f.kind == FlyingKind::Bird));
    }

    #[test]
    fn test_platform_bands_and_gate() {
        let tuning = Tuning::default();
        let mut spawner = scheduler(7, &tuning);
        let mut pools = Pools::new();
        assert!(!spawner.maybe_spawn_platform(10_000.0, 10, &tuning, &mut pools));
        assert!(spawner.maybe_spawn_platform(10_000.0, 40, &tuning, &mut pools));
        let p = &pools.platforms[0];
        let altitude = tuning.world.ground_y - p.rect.y;
        assert!(tuning
            .platforms
            .height_bands
            .iter()
            .any(|b| (altitude - b).abs() <= tuning.platforms.height_jitter + 1e-3));
        assert_eq!(p.rect.w, tuning.platforms.widths[p.size.index()]);
    }

    #[test]
    fn test_platform_weights_favor_long_with_score() {
        let early = platform_weights(0, 400);
        let late = platform_weights(400, 400);
        assert!(early[0] > early[2]);
        assert!(late[2] > late[0]);
        assert!((late.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_collectible_targets_per_band() {
        let tuning = Tuning::default();
        for seed in 0..20 {
            let mut spawner = scheduler(seed, &tuning);
            let mut pools = Pools::new();
            let mut spawned = 0;
            for score in 100..200 {
                spawned += spawner.maybe_spawn_collectible(score, &tuning, &mut pools);
                if score == 100 {
                    let targets = spawner.collectible_targets().to_vec();
                    assert!(targets.windows(2).all(|w| w[0] < w[1]));
                    assert!(targets.iter().all(|t| (100..200).contains(t)));
                }
            }
            assert!((4..=6).contains(&spawned), "seed {seed}: {spawned}");
            assert_eq!(pools.collectibles.len(), spawned);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let tuning = Tuning::default();
        let mut a = scheduler(99, &tuning);
        let mut b = scheduler(99, &tuning);
        let (mut pa, mut pb) = (Pools::new(), Pools::new());
        let mut now = 0.0;
        for score in 0..300 {
            now += 400.0;
            a.maybe_spawn_obstacle(now, score, &tuning, &mut pa);
            b.maybe_spawn_obstacle(now, score, &tuning, &mut pb);
        }
        let xa: Vec<_> = pa.obstacles.iter().map(|o| (o.kind, o.rect)).collect();
        let xb: Vec<_> = pb.obstacles.iter().map(|o| (o.kind, o.rect)).collect();
        assert_eq!(xa, xb);
    }
}
