//! Property tests for run-wide invariants

use alien_escape::Simulation;
use alien_escape::sim::spawn::{Pattern, SpawnScheduler, size_class};
use alien_escape::sim::state::SPAWN_STREAM;
use alien_escape::sim::{
    DeathCause, EndingPhase, GameState, ObstacleKind, Player, Pools, TickInput, tick,
};
use alien_escape::tuning::Tuning;
use proptest::prelude::*;
use rand_pcg::Pcg32;

const DT: f64 = 1000.0 / 60.0;

fn quiet_tuning() -> Tuning {
    let mut tuning = Tuning::default();
    tuning.ground_boss.milestones.clear();
    tuning.flying_boss.milestones.clear();
    tuning
}

fn kind_strategy() -> impl Strategy<Value = ObstacleKind> {
    prop_oneof![
        Just(ObstacleKind::Normal),
        Just(ObstacleKind::Xl),
        Just(ObstacleKind::Xxl),
    ]
}

fn pattern_strategy() -> impl Strategy<Value = Pattern> {
    prop_oneof![Just(Pattern::Single), Just(Pattern::Double), Just(Pattern::Triple)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn at_most_three_jumps_per_flight(presses in prop::collection::vec(any::<bool>(), 1..400)) {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning);
        let mut events = Vec::new();
        let mut jumps_this_flight = 0;

        for press in presses {
            if press && player.request_jump(&tuning.player).is_some() {
                jumps_this_flight += 1;
            }
            prop_assert!(jumps_this_flight <= 3);
            prop_assert!(player.jumps_remaining <= 2);

            player.tick(DT, 1.0, &tuning, &[], &mut events);
            if player.is_grounded() {
                jumps_this_flight = 0;
            }
        }
    }

    #[test]
    fn shield_charges_never_overdrawn(
        steps in prop::collection::vec((0u32..40, any::<bool>()), 1..200),
    ) {
        let tuning = Tuning::default();
        let step = tuning.player.shield_score_step;
        let mut player = Player::new(&tuning);
        let mut score = 0;

        for (gain, request) in steps {
            score += gain;
            let available = player.available_shield_charges(score, step);
            prop_assert!(player.shield_charges_used <= score / step);

            if request {
                let before_used = player.shield_charges_used;
                let was_active = player.shield_active();
                let granted = player.request_shield(score, &tuning.player);
                if available == 0 || was_active {
                    prop_assert!(!granted);
                    prop_assert_eq!(player.shield_charges_used, before_used);
                } else {
                    prop_assert!(granted);
                    prop_assert_eq!(player.shield_charges_used, before_used + 1);
                }
            }
            // Let the shield run out between requests
            player.shield_ms_left = 0.0;
        }
    }

    #[test]
    fn cluster_spacing_holds(
        seed in any::<u64>(),
        clusters in prop::collection::vec((kind_strategy(), pattern_strategy(), 0u32..400), 1..12),
    ) {
        let tuning = Tuning::default();
        let mut spawner = SpawnScheduler::new(Pcg32::new(seed, SPAWN_STREAM), &tuning);
        let mut pools = Pools::new();

        for (kind, pattern, score) in clusters {
            spawner.spawn_cluster(kind, pattern, score, &tuning, &mut pools);
        }
        for pair in pools.obstacles.windows(2) {
            let spacing = size_class(pair[1].kind, &tuning).min_spacing;
            let gap = pair[1].rect.x - pair[0].rect.right();
            prop_assert!(gap >= spacing - 1e-3, "gap {} < {}", gap, spacing);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn score_is_monotonic_and_capped(
        seed in any::<u64>(),
        inputs in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 600..1200),
    ) {
        let mut state = GameState::new(seed, Tuning::default());
        let terminal = state.tuning.world.terminal_score;
        let mut last = 0;

        for (jump, shield, dash) in inputs {
            let input = TickInput { jump, shield, dash, autopilot: true };
            tick(&mut state, &input, DT);
            prop_assert!(state.score >= last);
            prop_assert!(state.score <= terminal);
            prop_assert!(state.pools.obstacles.iter().all(|o| !o.rect.is_past_left_edge()));
            last = state.score;
            if state.is_over() {
                break;
            }
        }
    }

    #[test]
    fn same_seed_same_frames(seed in any::<u64>(), jumps in prop::collection::vec(any::<bool>(), 200..400)) {
        let play = || {
            let mut sim = Simulation::new(seed, Tuning::default()).unwrap();
            jumps
                .iter()
                .enumerate()
                .map(|(i, &jump)| {
                    if jump {
                        sim.on_jump_requested();
                    }
                    serde_json::to_string(&sim.tick(i as f64 * DT)).unwrap()
                })
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(play(), play());
    }

    #[test]
    fn ending_phases_advance_in_order(seed in any::<u64>(), jitter in 0.0f64..8.0) {
        let mut state = GameState::new(seed, quiet_tuning());
        state.score = state.tuning.world.terminal_score;
        let input = TickInput::default();
        let mut phase = state.ending.phase;

        for _ in 0..20_000 {
            tick(&mut state, &input, DT + jitter);
            if state.ending.phase != phase {
                prop_assert_eq!(state.ending.phase, phase.next());
                phase = state.ending.phase;
            }
            if state.is_over() {
                break;
            }
        }
        prop_assert_eq!(state.outcome, Some(DeathCause::EndingComplete));
        prop_assert_eq!(phase, EndingPhase::Complete);
    }
}
