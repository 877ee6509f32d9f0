//! Fixed timestep simulation tick
//!
//! One step of the run: inputs, player physics, spawning, pool movement with
//! eviction and scoring, collision response, encounters, then the ending.

use super::collision::{collect_pickups, find_hit};
use super::player::JumpState;
use super::rect::Rect;
use super::state::{DeathCause, GameEvent, GameState};

/// Frames of lookahead the autopilot uses to time its jumps
const AUTOPILOT_LEAD_FRAMES: f32 = 14.0;
/// Distance at which the autopilot dashes through an incoming projectile
const AUTOPILOT_DODGE_DISTANCE: f32 = 120.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (ground jump or air jump)
    pub jump: bool,
    /// Activate a shield charge
    pub shield: bool,
    /// Spend a dash charge
    pub dash: bool,
    /// Demo mode - the autopilot plays the run
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep of `dt_ms`
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    if state.is_over() {
        return;
    }

    state.time_ms += dt_ms;
    state.time_ticks += 1;
    let now = state.time_ms;
    let scale = (dt_ms / state.tuning.world.frame_ms) as f32;

    let mut input = input.clone();
    if input.autopilot {
        let auto = autopilot(state);
        input.jump |= auto.jump;
        input.dash |= auto.dash;
    }

    // Inputs
    if !state.ending.locks_input() {
        apply_input(state, &input);
    }

    // Player physics
    {
        let GameState {
            player,
            tuning,
            pools,
            events,
            ..
        } = &mut *state;
        player.tick(dt_ms, scale, tuning, &pools.platforms, events);
    }

    // Spawning
    if !state.ending.is_active() {
        let GameState {
            spawner,
            tuning,
            pools,
            score,
            ..
        } = &mut *state;
        spawner.maybe_spawn_obstacle(now, *score, tuning, pools);
        spawner.maybe_spawn_flyers(*score, tuning, pools);
        spawner.maybe_spawn_platform(now, *score, tuning, pools);
        spawner.maybe_spawn_collectible(*score, tuning, pools);
    }

    move_and_evict(state, scale);

    resolve_collisions(state);
    if state.is_over() {
        return;
    }

    // Pickups
    let player_box = state.player.hitbox(state.tuning.player.hitbox_shrink);
    let picked = collect_pickups(&player_box, &mut state.pools.collectibles);
    for _ in 0..picked {
        let dash_charges = state
            .player
            .add_dash_charge(state.tuning.player.max_dash_charges);
        state.events.push(GameEvent::CollectiblePicked { dash_charges });
    }

    // Encounters
    {
        let player_center = state.player.rect.center();
        let GameState {
            encounters,
            tuning,
            pools,
            events,
            score,
            ..
        } = &mut *state;
        encounters.update(now, scale, *score, player_center, tuning, pools, events);
    }

    // Ending
    if !state.ending.is_active() && state.score >= state.tuning.world.terminal_score {
        state.ending.trigger(now, &mut state.events);
    }
    if state.ending.is_active() {
        let screen_clear = state.pools.is_empty() && !state.encounters.any_active();
        let GameState {
            ending,
            player,
            tuning,
            events,
            ..
        } = &mut *state;
        if ending.update(now, scale, screen_clear, player, tuning, events) {
            state.end_run(DeathCause::EndingComplete);
        }
    }
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    let p = &state.tuning.player;
    if input.jump {
        if let Some(count) = state.player.request_jump(p) {
            state.events.push(GameEvent::Jumped { count });
        }
    }
    if input.shield && state.player.request_shield(state.score, p) {
        log::debug!("Shield activated at score {}", state.score);
        state.events.push(GameEvent::ShieldActivated { auto: false });
    }
    if input.dash && state.player.request_dash(p) {
        state.events.push(GameEvent::DashStarted);
    }
}

/// Scroll every pool and drop what has left the screen. Each obstacle that
/// exits the left edge scores one point until the terminal score.
fn move_and_evict(state: &mut GameState, scale: f32) {
    let width = state.tuning.world.canvas_width;
    let height = state.tuning.world.canvas_height;
    let terminal = state.tuning.world.terminal_score;
    let pools = &mut state.pools;

    for o in &mut pools.obstacles {
        o.rect.x -= o.speed * scale;
    }
    let before = pools.obstacles.len();
    pools.obstacles.retain(|o| !o.rect.is_past_left_edge());
    for _ in pools.obstacles.len()..before {
        if state.score < terminal {
            state.score += 1;
        }
        state.events.push(GameEvent::ObstaclePassed { score: state.score });
    }

    for f in &mut pools.flyers {
        f.advance(scale);
    }
    pools.flyers.retain(|f| !f.rect.is_past_left_edge());

    for pl in &mut pools.platforms {
        pl.rect.x -= pl.speed * scale;
    }
    pools.platforms.retain(|pl| !pl.rect.is_past_left_edge());

    for p in &mut pools.projectiles {
        p.advance(scale);
    }
    pools.projectiles.retain(|p| !p.rect.is_outside(width, height));

    for c in &mut pools.collectibles {
        c.rect.x -= c.speed * scale;
    }
    pools
        .collectibles
        .retain(|c| !c.collected && !c.rect.is_past_left_edge());
}

/// Fatal contact handling. Shield or dash ignores contact entirely;
/// otherwise an available shield charge is spent automatically before the
/// run is ended.
fn resolve_collisions(state: &mut GameState) {
    if state.player.is_invulnerable() {
        return;
    }
    let player_box = state.player.hitbox(state.tuning.player.hitbox_shrink);
    let Some(hit) = find_hit(&player_box, &state.pools, state.encounters.active()) else {
        return;
    };

    if state.player.request_shield(state.score, &state.tuning.player) {
        log::info!("Auto-shield saved the run from {:?}", hit.cause);
        state.events.push(GameEvent::ShieldActivated { auto: true });
        return;
    }

    if let Some(id) = hit.projectile_id {
        state.pools.projectiles.retain(|p| p.id != id);
    }
    state.end_run(hit.cause);
}

/// Demo-mode decisions for the current state
fn autopilot(state: &GameState) -> TickInput {
    let player = &state.player;
    let reach = state.speed() * AUTOPILOT_LEAD_FRAMES;
    let standing = Rect::standing_on(
        player.rect.x,
        state.tuning.world.ground_y,
        player.rect.w,
        player.rect.h,
    );

    // Nearest hazard ahead that would hit a player standing on the ground
    let nearest = state
        .pools
        .obstacles
        .iter()
        .map(|o| o.rect)
        .chain(state.pools.flyers.iter().map(|f| f.rect))
        .chain(state.encounters.active().map(|b| b.rect))
        .filter(|r| r.right() > player.rect.x && r.y < standing.bottom() && r.bottom() > standing.y)
        .map(|r| r.x - player.rect.right())
        .fold(f32::INFINITY, f32::min);

    let jump = match player.jump_state {
        JumpState::Grounded => nearest <= reach,
        JumpState::Falling | JumpState::Jumped => {
            player.vy > 0.0 && player.jumps_remaining > 0 && nearest <= reach * 0.5
        }
    };

    let center = player.rect.center();
    let dash = player.dash_charges > 0
        && state
            .pools
            .projectiles
            .iter()
            .any(|p| p.rect.center().distance(center) < AUTOPILOT_DODGE_DISTANCE);

    TickInput {
        jump,
        dash,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::encounter::{Boss, BossKind};
    use crate::sim::ending::EndingPhase;
    use crate::sim::frame::FrameState;
    use crate::sim::state::{
        Collectible, FlyingEnemy, FlyingKind, Obstacle, ObstacleKind, Projectile, ProjectileKind,
    };
    use crate::tuning::Tuning;

    const DT: f64 = 1000.0 / 60.0;

    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.ground_boss.milestones.clear();
        tuning.flying_boss.milestones.clear();
        tuning
    }

    fn obstacle_on_player(state: &mut GameState, speed: f32) {
        let id = state.pools.next_entity_id();
        let rect = Rect::standing_on(
            state.player.rect.x + 10.0,
            state.tuning.world.ground_y,
            20.0,
            40.0,
        );
        state.pools.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Normal,
            rect,
            speed,
        });
    }

    #[test]
    fn test_idle_player_eventually_hits_obstacle() {
        let mut state = GameState::new(1, quiet_tuning());
        let input = TickInput::default();
        for _ in 0..20_000 {
            tick(&mut state, &input, DT);
            if state.is_over() {
                break;
            }
        }
        assert!(matches!(state.outcome, Some(DeathCause::Obstacle(_))));
        assert!(state.events.iter().any(|e| matches!(e, GameEvent::RunEnded { .. })));
    }

    #[test]
    fn test_obstacle_leaving_screen_scores_once() {
        let mut state = GameState::new(2, quiet_tuning());
        let id = state.pools.next_entity_id();
        state.pools.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Normal,
            rect: Rect::new(-18.0, 220.0, 20.0, 40.0),
            speed: 5.0,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.score, 1);
        assert!(state.pools.obstacles.iter().all(|o| o.id != id));
        assert!(state.events.contains(&GameEvent::ObstaclePassed { score: 1 }));

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_auto_shield_saves_once() {
        let mut state = GameState::new(3, quiet_tuning());
        state.score = 100;
        obstacle_on_player(&mut state, 0.0);

        tick(&mut state, &TickInput::default(), DT);
        assert!(!state.is_over());
        assert!(state.player.shield_active());
        assert_eq!(state.shield_charges(), 0);
        assert!(state.events.contains(&GameEvent::ShieldActivated { auto: true }));

        // Shield runs out while still touching the obstacle
        state.player.shield_ms_left = 0.0;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.outcome, Some(DeathCause::Obstacle(ObstacleKind::Normal)));
    }

    #[test]
    fn test_active_shield_ignores_contact() {
        let mut state = GameState::new(3, quiet_tuning());
        state.score = 200;
        assert!(state.player.request_shield(state.score, &state.tuning.player));
        obstacle_on_player(&mut state, 0.0);

        tick(&mut state, &TickInput::default(), DT);
        assert!(!state.is_over());
        assert_eq!(state.player.shield_charges_used, 1);
        assert_eq!(state.score, 200);
        assert!(!state.events.contains(&GameEvent::ShieldActivated { auto: true }));
    }

    #[test]
    fn test_flyer_contact_is_fatal() {
        let mut state = GameState::new(12, quiet_tuning());
        let id = state.pools.next_entity_id();
        let c = state.player.rect.center();
        let rect = Rect::new(c.x - 25.0, c.y - 20.0, 50.0, 40.0);
        state.pools.flyers.push(FlyingEnemy {
            id,
            kind: FlyingKind::Saucer,
            rect,
            speed: 0.0,
            base_y: rect.y,
            bob_amplitude: 0.0,
            bob_phase: 0.0,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.outcome, Some(DeathCause::Flyer(FlyingKind::Saucer)));
    }

    #[test]
    fn test_boss_contact_is_fatal() {
        let mut state = GameState::new(13, quiet_tuning());
        let c = state.player.rect.center();
        let rect = Rect::new(c.x - 60.0, c.y - 60.0, 120.0, 120.0);
        state.encounters.ground = Some(Boss {
            kind: BossKind::Ground,
            level: 1,
            rect,
            home_x: rect.x,
            base_y: rect.y,
            vy: 0.0,
            airborne: false,
            hover_phase: 0.0,
            started_ms: 0.0,
            duration_ms: 10_000.0,
            next_jump_ms: f64::MAX,
            next_shot_ms: f64::MAX,
        });

        let frame = FrameState::capture(&state, Vec::new());
        let status = frame.encounter(BossKind::Ground).unwrap();
        assert_eq!(status.level, 1);
        assert!(frame.encounter(BossKind::Flying).is_none());

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.outcome, Some(DeathCause::Boss(BossKind::Ground)));
    }

    #[test]
    fn test_dash_ignores_collisions() {
        let mut state = GameState::new(4, quiet_tuning());
        state.player.dash_charges = 1;
        obstacle_on_player(&mut state, 0.0);
        let input = TickInput {
            dash: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert!(!state.is_over());
        assert!(state.player.dash_active());
        assert!(state.events.contains(&GameEvent::DashStarted));
        assert_eq!(state.shield_charges(), 0);
    }

    #[test]
    fn test_projectile_hit_is_consumed_and_fatal() {
        let mut state = GameState::new(5, quiet_tuning());
        let id = state.pools.next_entity_id();
        let c = state.player.rect.center();
        state.pools.projectiles.push(Projectile {
            id,
            kind: ProjectileKind::Fireball,
            rect: Rect::new(c.x - 7.0, c.y - 7.0, 14.0, 14.0),
            vel: glam::Vec2::ZERO,
            rotation: 0.0,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.outcome, Some(DeathCause::Projectile(ProjectileKind::Fireball)));
        assert!(state.pools.projectiles.is_empty());
    }

    #[test]
    fn test_pickup_grants_dash_charge() {
        let mut state = GameState::new(6, quiet_tuning());
        let id = state.pools.next_entity_id();
        let c = state.player.rect.center();
        state.pools.collectibles.push(Collectible {
            id,
            rect: Rect::new(c.x - 12.0, c.y - 8.0, 24.0, 16.0),
            speed: 0.0,
            collected: false,
        });
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.player.dash_charges, 1);
        assert!(state.events.contains(&GameEvent::CollectiblePicked { dash_charges: 1 }));

        // Swept on the next pass, never picked twice
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.player.dash_charges, 1);
        assert!(state.pools.collectibles.iter().all(|c| c.id != id));
    }

    #[test]
    fn test_input_locked_during_dialogue() {
        let mut state = GameState::new(7, quiet_tuning());
        state.ending.phase = EndingPhase::Dialogue(1);
        state.ending.phase_started_ms = 0.0;
        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert!(state.player.is_grounded());
        assert!(!state.events.iter().any(|e| matches!(e, GameEvent::Jumped { .. })));
    }

    #[test]
    fn test_terminal_score_plays_ending_to_completion() {
        let mut state = GameState::new(8, quiet_tuning());
        state.score = state.tuning.world.terminal_score;
        let input = TickInput::default();
        let mut ticks = 0;
        while !state.is_over() && ticks < 10_000 {
            tick(&mut state, &input, DT);
            ticks += 1;
            assert!(state.pools.obstacles.is_empty());
        }
        assert_eq!(state.outcome, Some(DeathCause::EndingComplete));
        assert_eq!(state.ending.phase, EndingPhase::Complete);
        assert_eq!(state.events[0], GameEvent::EndingStarted);
        assert_eq!(state.score, state.tuning.world.terminal_score);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed| {
            let mut state = GameState::new(seed, Tuning::default());
            let input = TickInput {
                autopilot: true,
                ..Default::default()
            };
            for _ in 0..3_000 {
                tick(&mut state, &input, DT);
            }
            (state.score, state.time_ticks, state.outcome, state.pools.len())
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_autopilot_jumps_before_obstacle() {
        let mut state = GameState::new(9, quiet_tuning());
        let id = state.pools.next_entity_id();
        let x = state.player.rect.right() + 30.0;
        state.pools.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Normal,
            rect: Rect::standing_on(x, state.tuning.world.ground_y, 20.0, 40.0),
            speed: 5.0,
        });
        let input = autopilot(&state);
        assert!(input.jump);
        assert!(!input.dash);
    }

    #[test]
    fn test_no_tick_after_run_over() {
        let mut state = GameState::new(10, quiet_tuning());
        state.end_run(DeathCause::EndingComplete);
        let t = state.time_ticks;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.time_ticks, t);
    }
}
