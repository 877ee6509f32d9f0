//! Collision detection with per-entity hitbox policies
//!
//! Every hazard trims a margin off its sprite rectangle before the overlap
//! test. The two large obstacle classes have a non-rectangular silhouette
//! (a trunk with two arms), so they are tested as three separate regions
//! instead of one bounding box.

use super::encounter::Boss;
use super::rect::Rect;
use super::state::{
    Collectible, DeathCause, FlyingEnemy, FlyingKind, Obstacle, ObstacleKind, Pools, Projectile,
    ProjectileKind,
};

/// Fractional layout of a trunk-and-arms silhouette
#[derive(Debug, Clone, Copy)]
struct Silhouette {
    /// Trunk x-extent (the trunk spans the full height)
    trunk: (f32, f32),
    /// Left arm (x0, y0, x1, y1)
    left_arm: (f32, f32, f32, f32),
    /// Right arm (x0, y0, x1, y1)
    right_arm: (f32, f32, f32, f32),
    margin: f32,
}

const XL_SILHOUETTE: Silhouette = Silhouette {
    trunk: (0.32, 0.68),
    left_arm: (0.0, 0.30, 0.32, 0.55),
    right_arm: (0.68, 0.20, 1.0, 0.45),
    margin: 2.0,
};

const XXL_SILHOUETTE: Silhouette = Silhouette {
    trunk: (0.35, 0.65),
    left_arm: (0.0, 0.35, 0.35, 0.60),
    right_arm: (0.65, 0.25, 1.0, 0.50),
    margin: 2.0,
};

const NORMAL_OBSTACLE_MARGIN: f32 = 3.0;
const BIRD_MARGIN: f32 = 6.0;
const SAUCER_MARGIN: f32 = 5.0;
const FIREBALL_MARGIN: f32 = 3.0;
const PLASMA_BOLT_MARGIN: f32 = 2.0;
const BOSS_MARGIN: f32 = 10.0;

/// The region(s) of an entity that can hit the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitRegions {
    Single(Rect),
    TrunkAndArms { trunk: Rect, left_arm: Rect, right_arm: Rect },
}

impl HitRegions {
    fn silhouette(rect: &Rect, s: &Silhouette) -> Self {
        let (lx0, ly0, lx1, ly1) = s.left_arm;
        let (rx0, ry0, rx1, ry1) = s.right_arm;
        HitRegions::TrunkAndArms {
            trunk: rect.fraction(s.trunk.0, 0.0, s.trunk.1, 1.0).shrink(s.margin),
            left_arm: rect.fraction(lx0, ly0, lx1, ly1).shrink(s.margin),
            right_arm: rect.fraction(rx0, ry0, rx1, ry1).shrink(s.margin),
        }
    }

    /// True if any region overlaps `other`
    pub fn overlaps(&self, other: &Rect) -> bool {
        match self {
            HitRegions::Single(r) => r.overlaps(other),
            HitRegions::TrunkAndArms {
                trunk,
                left_arm,
                right_arm,
            } => trunk.overlaps(other) || left_arm.overlaps(other) || right_arm.overlaps(other),
        }
    }
}

/// Something the player can collide with
pub trait Collidable {
    fn hit_regions(&self) -> HitRegions;
}

impl Collidable for Obstacle {
    fn hit_regions(&self) -> HitRegions {
        match self.kind {
            ObstacleKind::Normal => HitRegions::Single(self.rect.shrink(NORMAL_OBSTACLE_MARGIN)),
            ObstacleKind::Xl => HitRegions::silhouette(&self.rect, &XL_SILHOUETTE),
            ObstacleKind::Xxl => HitRegions::silhouette(&self.rect, &XXL_SILHOUETTE),
        }
    }
}

impl Collidable for FlyingEnemy {
    fn hit_regions(&self) -> HitRegions {
        let margin = match self.kind {
            FlyingKind::Bird => BIRD_MARGIN,
            FlyingKind::Saucer => SAUCER_MARGIN,
        };
        HitRegions::Single(self.rect.shrink(margin))
    }
}

impl Collidable for Projectile {
    fn hit_regions(&self) -> HitRegions {
        let margin = match self.kind {
            ProjectileKind::Fireball => FIREBALL_MARGIN,
            ProjectileKind::PlasmaBolt => PLASMA_BOLT_MARGIN,
        };
        HitRegions::Single(self.rect.shrink(margin))
    }
}

impl Collidable for Boss {
    fn hit_regions(&self) -> HitRegions {
        HitRegions::Single(self.rect.shrink(BOSS_MARGIN))
    }
}

impl Collidable for Collectible {
    fn hit_regions(&self) -> HitRegions {
        HitRegions::Single(self.rect)
    }
}

/// Overlap test between the player's (already shrunk) hitbox and an entity
pub fn check_hit(player_box: &Rect, entity: &impl Collidable) -> bool {
    entity.hit_regions().overlaps(player_box)
}

/// A fatal contact found during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub cause: DeathCause,
    /// Set when the hit came from a projectile (consumed on a fatal hit)
    pub projectile_id: Option<u32>,
}

/// First hazard touching the player, in pool order:
/// obstacles, flying enemies, projectiles, bosses
pub fn find_hit<'a>(
    player_box: &Rect,
    pools: &Pools,
    bosses: impl IntoIterator<Item = &'a Boss>,
) -> Option<Hit> {
    if let Some(o) = pools.obstacles.iter().find(|o| check_hit(player_box, *o)) {
        return Some(Hit {
            cause: DeathCause::Obstacle(o.kind),
            projectile_id: None,
        });
    }
    if let Some(f) = pools.flyers.iter().find(|f| check_hit(player_box, *f)) {
        return Some(Hit {
            cause: DeathCause::Flyer(f.kind),
            projectile_id: None,
        });
    }
    if let Some(p) = pools.projectiles.iter().find(|p| check_hit(player_box, *p)) {
        return Some(Hit {
            cause: DeathCause::Projectile(p.kind),
            projectile_id: Some(p.id),
        });
    }
    bosses
        .into_iter()
        .find(|b| check_hit(player_box, *b))
        .map(|b| Hit {
            cause: DeathCause::Boss(b.kind),
            projectile_id: None,
        })
}

/// Mark every uncollected pickup touching the player. Returns how many.
pub fn collect_pickups(player_box: &Rect, collectibles: &mut [Collectible]) -> u32 {
    let mut picked = 0;
    for c in collectibles.iter_mut().filter(|c| !c.collected) {
        if check_hit(player_box, &*c) {
            c.collected = true;
            picked += 1;
        }
    }
    picked
}
