//! Data-driven game balance
//!
//! Every knob the simulation reads lives here. Tuning is loaded from JSON
//! (partial documents override only the keys they name) and validated once,
//! before the first tick. Per-frame quantities (speeds, gravity) are in
//! pixels per 60 Hz frame; durations are in milliseconds.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inclusive random range in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Same range shrunk by `factor` (0.9 = 10% shorter)
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.min > 0.0) {
            return Err(ConfigError::invalid(field, format!("min must be > 0, got {}", self.min)));
        }
        if self.max < self.min {
            return Err(ConfigError::invalid(
                field,
                format!("max ({}) is below min ({})", self.max, self.min),
            ));
        }
        Ok(())
    }
}

/// World geometry, clock and scrolling speed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Y coordinate of the ground line (entities stand on it)
    pub ground_y: f32,
    /// Fixed simulation step
    pub frame_ms: f64,
    /// Maximum fixed steps per rendered frame
    pub max_substeps: u32,
    pub base_speed: f32,
    /// Points between speed increases
    pub speed_step: u32,
    pub speed_increment: f32,
    pub max_speed: f32,
    /// Score that starts the ending sequence (and caps the score)
    pub terminal_score: u32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 300.0,
            ground_y: 260.0,
            frame_ms: 1000.0 / 60.0,
            max_substeps: 8,
            base_speed: 5.0,
            speed_step: 50,
            speed_increment: 0.5,
            max_speed: 10.0,
            terminal_score: 400,
        }
    }
}

impl WorldTuning {
    /// Scroll speed for the given score
    pub fn speed_for_score(&self, score: u32) -> f32 {
        let steps = (score / self.speed_step) as f32;
        (self.base_speed + steps * self.speed_increment).min(self.max_speed)
    }
}

/// Player physics and ability timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    /// Impulse multiplier for the first, second and third jump
    pub jump_multipliers: Vec<f32>,
    /// Pixels trimmed from every side of the player's hitbox
    pub hitbox_shrink: f32,
    pub shield_duration_ms: f64,
    /// One shield charge is earned every this many points
    pub shield_score_step: u32,
    pub dash_duration_ms: f64,
    pub dash_cooldown_ms: f64,
    /// Furthest the player travels forward while dashing
    pub dash_offset: f32,
    pub dash_approach_speed: f32,
    pub dash_return_speed: f32,
    pub max_dash_charges: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            x: 50.0,
            width: 40.0,
            height: 40.0,
            gravity: 0.4,
            jump_impulse: 10.0,
            jump_multipliers: vec![1.0, 0.9, 0.8],
            hitbox_shrink: 6.0,
            shield_duration_ms: 3000.0,
            shield_score_step: 100,
            dash_duration_ms: 1200.0,
            dash_cooldown_ms: 1500.0,
            dash_offset: 160.0,
            dash_approach_speed: 8.0,
            dash_return_speed: 4.0,
            max_dash_charges: 5,
        }
    }
}

/// Obstacle footprint, spacing and unlock rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeClass {
    pub width: f32,
    pub height: f32,
    /// Minimum gap to the previously spawned obstacle
    pub min_spacing: f32,
    pub unlock_score: u32,
    /// Chance of picking this class once unlocked
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleTuning {
    pub interval_ms: Interval,
    pub normal: SizeClass,
    pub xl: SizeClass,
    pub xxl: SizeClass,
    /// Random forward offset added to each spawn
    pub position_jitter: f32,
    /// Random extra height added to each spawn
    pub height_jitter: f32,
    /// Score from which 1-3 obstacle clusters may appear
    pub cluster_score: u32,
}

impl Default for ObstacleTuning {
    fn default() -> Self {
        Self {
            interval_ms: Interval::new(1100.0, 2400.0),
            normal: SizeClass {
                width: 20.0,
                height: 40.0,
                min_spacing: 180.0,
                unlock_score: 0,
                probability: 1.0,
            },
            xl: SizeClass {
                width: 34.0,
                height: 56.0,
                min_spacing: 220.0,
                unlock_score: 40,
                probability: 0.3,
            },
            xxl: SizeClass {
                width: 48.0,
                height: 70.0,
                min_spacing: 260.0,
                unlock_score: 120,
                probability: 0.2,
            },
            position_jitter: 20.0,
            height_jitter: 6.0,
            cluster_score: 80,
        }
    }
}

/// One flying enemy subtype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlyerClass {
    pub unlock_score: u32,
    /// Chance per frame once unlocked
    pub probability: f64,
    pub width: f32,
    pub height: f32,
    /// Multiplier on the world scroll speed
    pub speed_factor: f32,
    /// Altitude range (pixels above ground) of the enemy's bottom edge
    pub min_altitude: f32,
    pub max_altitude: f32,
    /// Vertical bob amplitude (0 = straight line)
    pub bob_amplitude: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyerTuning {
    pub bird: FlyerClass,
    pub saucer: FlyerClass,
}

impl Default for FlyerTuning {
    fn default() -> Self {
        Self {
            bird: FlyerClass {
                unlock_score: 25,
                probability: 0.004,
                width: 36.0,
                height: 24.0,
                speed_factor: 1.2,
                min_altitude: 30.0,
                max_altitude: 70.0,
                bob_amplitude: 0.0,
            },
            saucer: FlyerClass {
                unlock_score: 75,
                probability: 0.003,
                width: 40.0,
                height: 20.0,
                speed_factor: 1.4,
                min_altitude: 60.0,
                max_altitude: 110.0,
                bob_amplitude: 12.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformTuning {
    pub unlock_score: u32,
    pub interval_ms: Interval,
    /// Discrete altitudes (pixels above ground) of the platform top
    pub height_bands: Vec<f32>,
    pub height_jitter: f32,
    /// Short, medium and long widths
    pub widths: [f32; 3],
    pub thickness: f32,
}

impl Default for PlatformTuning {
    fn default() -> Self {
        Self {
            unlock_score: 30,
            interval_ms: Interval::new(2600.0, 5200.0),
            height_bands: vec![70.0, 110.0, 150.0],
            height_jitter: 10.0,
            widths: [60.0, 100.0, 150.0],
            thickness: 12.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectibleTuning {
    pub band_size: u32,
    pub per_band_min: u32,
    pub per_band_max: u32,
    pub width: f32,
    pub height: f32,
    pub min_altitude: f32,
    pub max_altitude: f32,
}

impl Default for CollectibleTuning {
    fn default() -> Self {
        Self {
            band_size: 100,
            per_band_min: 4,
            per_band_max: 6,
            width: 24.0,
            height: 16.0,
            min_altitude: 60.0,
            max_altitude: 120.0,
        }
    }
}

/// One boss variant
///
/// Unlike the other sections, a boss section must be given in full when
/// overridden from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossTuning {
    /// Scores that start an encounter, ascending
    pub milestones: Vec<u32>,
    pub width: f32,
    pub height: f32,
    /// Altitude of the boss's bottom edge while hovering (flying boss only)
    pub altitude: f32,
    pub base_duration_ms: f64,
    pub duration_per_level_ms: f64,
    pub jump_interval_ms: Interval,
    pub shot_interval_ms: Interval,
    /// Fraction by which intervals shrink per level above 1
    pub interval_shrink_per_level: f64,
    pub jump_impulse: f32,
    pub entry_speed: f32,
    pub projectile_speed: f32,
    pub projectile_size: f32,
}

impl BossTuning {
    pub fn duration_for_level(&self, level: u32) -> f64 {
        self.base_duration_ms + self.duration_per_level_ms * level.saturating_sub(1) as f64
    }

    /// Interval scale for a level, floored so intervals never collapse
    pub fn interval_scale(&self, level: u32) -> f64 {
        (1.0 - self.interval_shrink_per_level * level.saturating_sub(1) as f64).max(0.3)
    }

    fn ground_default() -> Self {
        Self {
            milestones: vec![50, 150, 250],
            width: 64.0,
            height: 64.0,
            altitude: 0.0,
            base_duration_ms: 10_000.0,
            duration_per_level_ms: 4_000.0,
            jump_interval_ms: Interval::new(1500.0, 3000.0),
            shot_interval_ms: Interval::new(1400.0, 2600.0),
            interval_shrink_per_level: 0.1,
            jump_impulse: 9.0,
            entry_speed: 3.0,
            projectile_speed: 4.0,
            projectile_size: 14.0,
        }
    }

    fn flying_default() -> Self {
        Self {
            milestones: vec![100, 200, 300],
            width: 72.0,
            height: 40.0,
            altitude: 150.0,
            base_duration_ms: 9_000.0,
            duration_per_level_ms: 4_000.0,
            jump_interval_ms: Interval::new(1500.0, 3000.0),
            shot_interval_ms: Interval::new(1100.0, 2200.0),
            interval_shrink_per_level: 0.1,
            jump_impulse: 0.0,
            entry_speed: 3.0,
            projectile_speed: 6.0,
            projectile_size: 10.0,
        }
    }

    fn validate(&self, name: &'static str, terminal_score: u32) -> Result<(), ConfigError> {
        if self.milestones.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(name, "milestones must be strictly ascending"));
        }
        if self.milestones.iter().any(|&m| m == 0 || m >= terminal_score) {
            return Err(ConfigError::invalid(
                name,
                format!("milestones must lie in 1..{terminal_score}"),
            ));
        }
        positive(name, self.width as f64)?;
        positive(name, self.height as f64)?;
        positive(name, self.base_duration_ms)?;
        non_negative(name, self.duration_per_level_ms)?;
        self.jump_interval_ms.validate(name)?;
        self.shot_interval_ms.validate(name)?;
        positive(name, self.entry_speed as f64)?;
        positive(name, self.projectile_speed as f64)?;
        positive(name, self.projectile_size as f64)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndingTuning {
    pub waiting_ms: f64,
    pub npc_entry_ms: f64,
    pub dialogue_ms: f64,
    pub moving_off_ms: f64,
    pub fade_ms: f64,
    pub final_message_ms: f64,
    /// Horizontal speed of player and NPC while moving off
    pub move_speed: f32,
    pub npc_width: f32,
    pub npc_height: f32,
}

impl Default for EndingTuning {
    fn default() -> Self {
        Self {
            waiting_ms: 2000.0,
            npc_entry_ms: 2000.0,
            dialogue_ms: 2500.0,
            moving_off_ms: 3000.0,
            fade_ms: 2000.0,
            final_message_ms: 3000.0,
            move_speed: 3.0,
            npc_width: 48.0,
            npc_height: 48.0,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub player: PlayerTuning,
    pub obstacles: ObstacleTuning,
    pub flyers: FlyerTuning,
    pub platforms: PlatformTuning,
    pub collectibles: CollectibleTuning,
    pub ground_boss: BossTuning,
    pub flying_boss: BossTuning,
    /// Forbid both bosses being active at once
    pub exclusive_bosses: bool,
    pub ending: EndingTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world: WorldTuning::default(),
            player: PlayerTuning::default(),
            obstacles: ObstacleTuning::default(),
            flyers: FlyerTuning::default(),
            platforms: PlatformTuning::default(),
            collectibles: CollectibleTuning::default(),
            ground_boss: BossTuning::ground_default(),
            flying_boss: BossTuning::flying_default(),
            exclusive_bosses: false,
            ending: EndingTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a (possibly partial) JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would break the simulation mid-run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.world;
        positive("world.canvas_width", w.canvas_width as f64)?;
        positive("world.canvas_height", w.canvas_height as f64)?;
        if !(w.ground_y > 0.0 && w.ground_y <= w.canvas_height) {
            return Err(ConfigError::invalid("world.ground_y", "must lie inside the canvas"));
        }
        positive("world.frame_ms", w.frame_ms)?;
        if w.max_substeps == 0 {
            return Err(ConfigError::invalid("world.max_substeps", "must be at least 1"));
        }
        positive("world.base_speed", w.base_speed as f64)?;
        if w.speed_step == 0 {
            return Err(ConfigError::invalid("world.speed_step", "must be at least 1"));
        }
        non_negative("world.speed_increment", w.speed_increment as f64)?;
        if w.max_speed < w.base_speed {
            return Err(ConfigError::invalid("world.max_speed", "must be >= base_speed"));
        }
        if w.terminal_score == 0 {
            return Err(ConfigError::invalid("world.terminal_score", "must be at least 1"));
        }

        let p = &self.player;
        positive("player.width", p.width as f64)?;
        positive("player.height", p.height as f64)?;
        positive("player.gravity", p.gravity as f64)?;
        positive("player.jump_impulse", p.jump_impulse as f64)?;
        if p.jump_multipliers.len() != 3 {
            return Err(ConfigError::invalid(
                "player.jump_multipliers",
                format!("expected 3 entries, got {}", p.jump_multipliers.len()),
            ));
        }
        if p.jump_multipliers.iter().any(|m| !(*m > 0.0)) {
            return Err(ConfigError::invalid("player.jump_multipliers", "entries must be > 0"));
        }
        if p.hitbox_shrink < 0.0 || p.hitbox_shrink * 2.0 >= p.width.min(p.height) {
            return Err(ConfigError::invalid(
                "player.hitbox_shrink",
                "must be >= 0 and leave a non-empty hitbox",
            ));
        }
        positive("player.shield_duration_ms", p.shield_duration_ms)?;
        if p.shield_score_step == 0 {
            return Err(ConfigError::invalid("player.shield_score_step", "must be at least 1"));
        }
        positive("player.dash_duration_ms", p.dash_duration_ms)?;
        non_negative("player.dash_cooldown_ms", p.dash_cooldown_ms)?;
        non_negative("player.dash_offset", p.dash_offset as f64)?;
        positive("player.dash_approach_speed", p.dash_approach_speed as f64)?;
        positive("player.dash_return_speed", p.dash_return_speed as f64)?;

        let o = &self.obstacles;
        o.interval_ms.validate("obstacles.interval_ms")?;
        for (name, class) in [
            ("obstacles.normal", &o.normal),
            ("obstacles.xl", &o.xl),
            ("obstacles.xxl", &o.xxl),
        ] {
            positive(name, class.width as f64)?;
            positive(name, class.height as f64)?;
            positive(name, class.min_spacing as f64)?;
            probability(name, class.probability)?;
        }
        non_negative("obstacles.position_jitter", o.position_jitter as f64)?;
        non_negative("obstacles.height_jitter", o.height_jitter as f64)?;

        for (name, class) in [("flyers.bird", &self.flyers.bird), ("flyers.saucer", &self.flyers.saucer)] {
            probability(name, class.probability)?;
            positive(name, class.width as f64)?;
            positive(name, class.height as f64)?;
            positive(name, class.speed_factor as f64)?;
            if class.max_altitude < class.min_altitude {
                return Err(ConfigError::invalid(name, "max_altitude is below min_altitude"));
            }
        }

        let pl = &self.platforms;
        pl.interval_ms.validate("platforms.interval_ms")?;
        if pl.height_bands.is_empty() {
            return Err(ConfigError::invalid("platforms.height_bands", "needs at least one band"));
        }
        if pl.widths.iter().any(|w| !(*w > 0.0)) {
            return Err(ConfigError::invalid("platforms.widths", "widths must be > 0"));
        }
        positive("platforms.thickness", pl.thickness as f64)?;
        non_negative("platforms.height_jitter", pl.height_jitter as f64)?;

        let c = &self.collectibles;
        if c.band_size == 0 {
            return Err(ConfigError::invalid("collectibles.band_size", "must be at least 1"));
        }
        if c.per_band_min == 0 || c.per_band_max < c.per_band_min {
            return Err(ConfigError::invalid(
                "collectibles.per_band_min",
                "need 1 <= per_band_min <= per_band_max",
            ));
        }
        if c.per_band_max >= c.band_size {
            return Err(ConfigError::invalid(
                "collectibles.per_band_max",
                "must be smaller than band_size",
            ));
        }
        positive("collectibles.width", c.width as f64)?;
        positive("collectibles.height", c.height as f64)?;
        if c.max_altitude < c.min_altitude {
            return Err(ConfigError::invalid("collectibles.max_altitude", "is below min_altitude"));
        }

        self.ground_boss.validate("ground_boss", w.terminal_score)?;
        self.flying_boss.validate("flying_boss", w.terminal_score)?;

        let e = &self.ending;
        for (name, v) in [
            ("ending.waiting_ms", e.waiting_ms),
            ("ending.npc_entry_ms", e.npc_entry_ms),
            ("ending.dialogue_ms", e.dialogue_ms),
            ("ending.moving_off_ms", e.moving_off_ms),
            ("ending.fade_ms", e.fade_ms),
            ("ending.final_message_ms", e.final_message_ms),
        ] {
            positive(name, v)?;
        }
        non_negative("ending.move_speed", e.move_speed as f64)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be >= 0, got {value}")))
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("probability {value} outside [0, 1]")))
    }
}
