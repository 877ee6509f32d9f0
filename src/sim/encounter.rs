//! Boss encounters
//!
//! Two independent boss variants, each `inactive -> active -> inactive`.
//! An encounter starts when the score reaches one of the variant's
//! milestones, runs for a level-dependent duration while jumping (ground
//! boss) and firing aimed projectiles, then ends with a `BossDefeated`
//! event. Both may be active at once unless `exclusive_bosses` is set.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::{GameEvent, Pools, Projectile, ProjectileKind};
use crate::tuning::{BossTuning, Interval, Tuning};

/// Gap kept between a settled boss and the right edge of the screen
const HOME_MARGIN: f32 = 60.0;
/// Hover oscillation of the flying boss
const HOVER_AMPLITUDE: f32 = 25.0;
const HOVER_RATE: f32 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    Ground,
    Flying,
}

impl BossKind {
    pub const ALL: [BossKind; 2] = [BossKind::Ground, BossKind::Flying];

    pub fn projectile(self) -> ProjectileKind {
        match self {
            BossKind::Ground => ProjectileKind::Fireball,
            BossKind::Flying => ProjectileKind::PlasmaBolt,
        }
    }

    pub fn tuning(self, tuning: &Tuning) -> &BossTuning {
        match self {
            BossKind::Ground => &tuning.ground_boss,
            BossKind::Flying => &tuning.flying_boss,
        }
    }

    fn other(self) -> BossKind {
        match self {
            BossKind::Ground => BossKind::Flying,
            BossKind::Flying => BossKind::Ground,
        }
    }

    fn slot(self) -> usize {
        match self {
            BossKind::Ground => 0,
            BossKind::Flying => 1,
        }
    }
}

/// An active boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub kind: BossKind,
    pub level: u32,
    pub rect: Rect,
    /// Resting x once the entry slide finishes
    pub home_x: f32,
    /// Resting y (ground line for the ground boss, hover line for the flying one)
    pub base_y: f32,
    pub vy: f32,
    pub airborne: bool,
    pub hover_phase: f32,
    pub started_ms: f64,
    pub duration_ms: f64,
    pub next_jump_ms: f64,
    pub next_shot_ms: f64,
}

impl Boss {
    pub fn remaining_ms(&self, now: f64) -> f64 {
        (self.duration_ms - (now - self.started_ms)).max(0.0)
    }

    /// Finished sliding in from the right edge
    pub fn has_entered(&self) -> bool {
        self.rect.x <= self.home_x
    }
}

#[derive(Debug, Clone)]
pub struct EncounterDirector {
    rng: Pcg32,
    pub ground: Option<Boss>,
    pub flying: Option<Boss>,
    /// Encounters started so far, per kind
    spawn_counts: [u32; 2],
    /// Milestones already consumed, per kind
    fired: [Vec<u32>; 2],
}

impl EncounterDirector {
    pub fn new(rng: Pcg32) -> Self {
        Self {
            rng,
            ground: None,
            flying: None,
            spawn_counts: [0; 2],
            fired: [Vec::new(), Vec::new()],
        }
    }

    pub fn boss(&self, kind: BossKind) -> Option<&Boss> {
        match kind {
            BossKind::Ground => self.ground.as_ref(),
            BossKind::Flying => self.flying.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: BossKind) -> &mut Option<Boss> {
        match kind {
            BossKind::Ground => &mut self.ground,
            BossKind::Flying => &mut self.flying,
        }
    }

    /// Active bosses, ground first
    pub fn active(&self) -> impl Iterator<Item = &Boss> {
        self.ground.iter().chain(self.flying.iter())
    }

    pub fn any_active(&self) -> bool {
        self.ground.is_some() || self.flying.is_some()
    }

    /// Expire finished encounters, start new ones for newly reached
    /// milestones, then run the movement/attack loop of every active boss
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        now: f64,
        scale: f32,
        score: u32,
        player_center: Vec2,
        tuning: &Tuning,
        pools: &mut Pools,
        events: &mut Vec<GameEvent>,
    ) {
        for kind in BossKind::ALL {
            let expired = self
                .boss(kind)
                .is_some_and(|boss| now - boss.started_ms >= boss.duration_ms);
            if !expired {
                continue;
            }
            if let Some(boss) = self.slot_mut(kind).take() {
                log::info!("{:?} boss (level {}) defeated", kind, boss.level);
                events.push(GameEvent::BossDefeated {
                    kind,
                    level: boss.level,
                });
            }
        }

        for kind in BossKind::ALL {
            self.check_milestones(kind, now, score, tuning, events);
        }

        for kind in BossKind::ALL {
            self.run_boss(kind, now, scale, player_center, tuning, pools, events);
        }
    }

    fn check_milestones(
        &mut self,
        kind: BossKind,
        now: f64,
        score: u32,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) {
        let bt = kind.tuning(tuning);
        let Some(&milestone) = bt
            .milestones
            .iter()
            .find(|&&m| m <= score && !self.fired[kind.slot()].contains(&m))
        else {
            return;
        };
        self.fired[kind.slot()].push(milestone);

        if self.boss(kind).is_some() {
            log::warn!("{:?} boss milestone {} reached while already active", kind, milestone);
            return;
        }
        if tuning.exclusive_bosses && self.boss(kind.other()).is_some() {
            log::info!(
                "{:?} boss milestone {} skipped: {:?} boss active",
                kind,
                milestone,
                kind.other()
            );
            return;
        }

        self.spawn_counts[kind.slot()] += 1;
        let level = self.spawn_counts[kind.slot()];
        let boss = self.spawn(kind, level, now, tuning);
        log::info!(
            "{:?} boss level {} at score {} for {} ms",
            kind,
            level,
            score,
            boss.duration_ms
        );
        *self.slot_mut(kind) = Some(boss);
        events.push(GameEvent::BossStarted { kind, level });
    }

    fn spawn(&mut self, kind: BossKind, level: u32, now: f64, tuning: &Tuning) -> Boss {
        let bt = kind.tuning(tuning);
        let world = &tuning.world;
        let base_y = world.ground_y - bt.altitude - bt.height;
        let interval_scale = bt.interval_scale(level);
        Boss {
            kind,
            level,
            rect: Rect::new(world.canvas_width, base_y, bt.width, bt.height),
            home_x: world.canvas_width - bt.width - HOME_MARGIN,
            base_y,
            vy: 0.0,
            airborne: false,
            hover_phase: 0.0,
            started_ms: now,
            duration_ms: bt.duration_for_level(level),
            next_jump_ms: now + roll(&mut self.rng, bt.jump_interval_ms.scaled(interval_scale)),
            next_shot_ms: now + roll(&mut self.rng, bt.shot_interval_ms.scaled(interval_scale)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn run_boss(
        &mut self,
        kind: BossKind,
        now: f64,
        scale: f32,
        player_center: Vec2,
        tuning: &Tuning,
        pools: &mut Pools,
        events: &mut Vec<GameEvent>,
    ) {
        let bt = kind.tuning(tuning);
        let gravity = tuning.player.gravity;
        let rng = &mut self.rng;
        let boss = match kind {
            BossKind::Ground => self.ground.as_mut(),
            BossKind::Flying => self.flying.as_mut(),
        };
        let Some(boss) = boss else { return };
        let interval_scale = bt.interval_scale(boss.level);

        if !boss.has_entered() {
            boss.rect.x = (boss.rect.x - bt.entry_speed * scale).max(boss.home_x);
        }

        match kind {
            BossKind::Ground => {
                if !boss.airborne && now >= boss.next_jump_ms {
                    boss.vy = -bt.jump_impulse;
                    boss.airborne = true;
                    boss.next_jump_ms = now + roll(rng, bt.jump_interval_ms.scaled(interval_scale));
                }
                if boss.airborne {
                    boss.vy += gravity * scale;
                    boss.rect.y += boss.vy * scale;
                    if boss.rect.y >= boss.base_y {
                        boss.rect.y = boss.base_y;
                        boss.vy = 0.0;
                        boss.airborne = false;
                    }
                }
            }
            BossKind::Flying => {
                boss.hover_phase += HOVER_RATE * scale;
                boss.rect.y = boss.base_y + boss.hover_phase.sin() * HOVER_AMPLITUDE;
            }
        }

        if boss.has_entered() && now >= boss.next_shot_ms {
            boss.next_shot_ms = now + roll(rng, bt.shot_interval_ms.scaled(interval_scale));
            let projectile_kind = kind.projectile();
            let origin = Vec2::new(boss.rect.x, boss.rect.center().y);
            let vel = aim(origin, player_center, bt.projectile_speed);
            let size = bt.projectile_size;
            let id = pools.next_entity_id();
            pools.projectiles.push(Projectile {
                id,
                kind: projectile_kind,
                rect: Rect::new(origin.x - size / 2.0, origin.y - size / 2.0, size, size),
                vel,
                rotation: vel.y.atan2(vel.x),
            });
            events.push(GameEvent::ProjectileFired {
                kind: projectile_kind,
            });
        }
    }
}

/// Velocity of `speed` from `origin` toward `target` (leftward if they coincide)
pub fn aim(origin: Vec2, target: Vec2, speed: f32) -> Vec2 {
    let dir = (target - origin).normalize_or_zero();
    let dir = if dir == Vec2::ZERO { Vec2::NEG_X } else { dir };
    dir * speed
}

fn roll(rng: &mut Pcg32, interval: Interval) -> f64 {
    rng.random_range(interval.min..=interval.max)
}
