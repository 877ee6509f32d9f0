//! Alien Escape headless runner
//!
//! Plays one run with the autopilot at a synthetic 60 Hz clock and records
//! the result on the local leaderboard.
//!
//! Usage: `alien-escape [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    use alien_escape::audio::{AudioCommand, AudioDirector, AudioSink};
    use alien_escape::consts::{DEFAULT_SEED, RUNNER_FRAME_CAP};
    use alien_escape::{Leaderboard, Simulation, Tuning};

    const LEADERBOARD_FILE: &str = "alien_escape_scores.json";
    const PLAYER_NAME: &str = "AUTOPILOT";

    /// Logs what a playback backend would play
    struct LogSink;

    impl AudioSink for LogSink {
        fn send(&mut self, command: AudioCommand) {
            match command {
                AudioCommand::PlayMusic { track, volume } => {
                    log::info!("♪ {track:?} (volume {volume:.2})")
                }
                AudioCommand::StopMusic => log::info!("♪ stop"),
                AudioCommand::PlayEffect { effect, .. } => log::debug!("sfx {effect:?}"),
            }
        }
    }

    fn load_tuning(path: Option<&str>) -> Tuning {
        let Some(path) = path else {
            return Tuning::default();
        };
        match Tuning::load(Path::new(path)) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {path}");
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning, {path} rejected: {e}");
                Tuning::default()
            }
        }
    }

    pub fn run() {
        env_logger::init();

        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(arg) => arg.parse().unwrap_or_else(|_| {
                log::warn!("Invalid seed {arg:?}, using default");
                DEFAULT_SEED
            }),
            None => DEFAULT_SEED,
        };
        let tuning = load_tuning(args.next().as_deref());

        let mut sim = match Simulation::new(seed, tuning) {
            Ok(sim) => sim,
            Err(e) => {
                log::error!("Cannot start run: {e}");
                std::process::exit(1);
            }
        };
        sim.set_autopilot(true);

        let mut audio = AudioDirector::new();
        let mut sink = LogSink;
        audio.start_run(&mut sink);

        let frame_ms = sim.state().tuning.world.frame_ms;
        let mut frame = sim.tick(0.0);
        for n in 1..=RUNNER_FRAME_CAP {
            frame = sim.tick(n as f64 * frame_ms);
            audio.handle_all(&frame.events, &mut sink);
            if frame.run_over {
                break;
            }
        }

        let outcome = match frame.cause {
            Some(cause) if cause.is_fatal() => format!("crashed ({cause:?})"),
            Some(_) => "escaped".to_string(),
            None => "still running at frame cap".to_string(),
        };
        println!(
            "seed {seed}: score {} after {:.1}s, {outcome}",
            frame.score,
            frame.time_ms / 1000.0
        );

        let path = Path::new(LEADERBOARD_FILE);
        let mut board = Leaderboard::load(path);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);
        match board.add_score(PLAYER_NAME, frame.score, timestamp) {
            Some(rank) => {
                println!("leaderboard rank #{rank}");
                if let Err(e) = board.save(path) {
                    log::warn!("Could not save leaderboard: {e}");
                }
            }
            None => println!("no leaderboard placement"),
        }
        if let Some(best) = board.personal_best(PLAYER_NAME) {
            println!("personal best {best}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is driven by the embedding page
}
