//! Audio cue selection
//!
//! Turns simulation events into music and sound effect commands. Playback
//! itself belongs to whatever implements [`AudioSink`]; this module only
//! decides what should be heard and how loud.

use serde::{Deserialize, Serialize};

use crate::sim::{BossKind, EndingPhase, GameEvent, ProjectileKind};

/// Background music tracks, lowest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MusicTrack {
    Main,
    GroundBoss,
    FlyingBoss,
    Ending,
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// First jump off a surface
    Jump,
    /// Second or third jump
    AirJump,
    ShieldUp,
    ShieldDown,
    Dash,
    /// Dash fuel collected
    Pickup,
    /// A boss entered
    BossAlarm,
    BossDefeated,
    /// Ground boss throws a fireball
    Fireball,
    /// Flying boss fires a plasma bolt
    PlasmaShot,
    /// Fatal collision
    Crash,
    /// Final message of the ending
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AudioCommand {
    PlayMusic { track: MusicTrack, volume: f32 },
    StopMusic,
    PlayEffect { effect: SoundEffect, volume: f32 },
}

/// Receiver of audio commands (a playback backend, a log, a test buffer)
pub trait AudioSink {
    fn send(&mut self, command: AudioCommand);
}

impl AudioSink for Vec<AudioCommand> {
    fn send(&mut self, command: AudioCommand) {
        self.push(command);
    }
}

/// Tracks which themes are wanted and emits only the changes
#[derive(Debug, Clone)]
pub struct AudioDirector {
    master_volume: f32,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
    playing: Option<MusicTrack>,
    ground_boss: bool,
    flying_boss: bool,
    ending: bool,
    run_over: bool,
}

impl Default for AudioDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDirector {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            music_volume: 0.6,
            sfx_volume: 1.0,
            muted: false,
            playing: None,
            ground_boss: false,
            flying_boss: false,
            ending: false,
            run_over: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn playing(&self) -> Option<MusicTrack> {
        self.playing
    }

    fn music_level(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    fn sfx_level(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Forget the previous run and start the main theme
    pub fn start_run(&mut self, sink: &mut dyn AudioSink) {
        self.ground_boss = false;
        self.flying_boss = false;
        self.ending = false;
        self.run_over = false;
        self.playing = None;
        self.sync_music(sink);
    }

    /// The track that should be playing now
    fn wanted(&self) -> Option<MusicTrack> {
        if self.run_over {
            None
        } else if self.ending {
            Some(MusicTrack::Ending)
        } else if self.flying_boss {
            Some(MusicTrack::FlyingBoss)
        } else if self.ground_boss {
            Some(MusicTrack::GroundBoss)
        } else {
            Some(MusicTrack::Main)
        }
    }

    fn sync_music(&mut self, sink: &mut dyn AudioSink) {
        let wanted = self.wanted();
        if wanted == self.playing {
            return;
        }
        match wanted {
            Some(track) => {
                log::debug!("Music: {:?} -> {:?}", self.playing, track);
                sink.send(AudioCommand::PlayMusic {
                    track,
                    volume: self.music_level(),
                });
            }
            None => sink.send(AudioCommand::StopMusic),
        }
        self.playing = wanted;
    }

    fn effect(&self, effect: SoundEffect, sink: &mut dyn AudioSink) {
        let volume = self.sfx_level();
        if volume <= 0.0 {
            return;
        }
        sink.send(AudioCommand::PlayEffect { effect, volume });
    }

    pub fn handle(&mut self, event: &GameEvent, sink: &mut dyn AudioSink) {
        match *event {
            GameEvent::Jumped { count: 1 } => self.effect(SoundEffect::Jump, sink),
            GameEvent::Jumped { .. } => self.effect(SoundEffect::AirJump, sink),
            GameEvent::ShieldActivated { .. } => self.effect(SoundEffect::ShieldUp, sink),
            GameEvent::ShieldExpired => self.effect(SoundEffect::ShieldDown, sink),
            GameEvent::DashStarted => self.effect(SoundEffect::Dash, sink),
            GameEvent::CollectiblePicked { .. } => self.effect(SoundEffect::Pickup, sink),
            GameEvent::BossStarted { kind, .. } => {
                self.set_boss(kind, true);
                self.effect(SoundEffect::BossAlarm, sink);
                self.sync_music(sink);
            }
            GameEvent::BossDefeated { kind, .. } => {
                self.set_boss(kind, false);
                self.effect(SoundEffect::BossDefeated, sink);
                self.sync_music(sink);
            }
            GameEvent::ProjectileFired { kind } => {
                let effect = match kind {
                    ProjectileKind::Fireball => SoundEffect::Fireball,
                    ProjectileKind::PlasmaBolt => SoundEffect::PlasmaShot,
                };
                self.effect(effect, sink);
            }
            GameEvent::EndingStarted => {
                self.ending = true;
                self.sync_music(sink);
            }
            GameEvent::EndingPhaseChanged {
                phase: EndingPhase::FinalMessage,
            } => self.effect(SoundEffect::Victory, sink),
            GameEvent::RunEnded { cause } => {
                if cause.is_fatal() {
                    self.effect(SoundEffect::Crash, sink);
                }
                self.run_over = true;
                self.sync_music(sink);
            }
            GameEvent::DashEnded
            | GameEvent::ObstaclePassed { .. }
            | GameEvent::EndingPhaseChanged { .. } => {}
        }
    }

    pub fn handle_all(&mut self, events: &[GameEvent], sink: &mut dyn AudioSink) {
        for event in events {
            self.handle(event, sink);
        }
    }

    fn set_boss(&mut self, kind: BossKind, active: bool) {
        match kind {
            BossKind::Ground => self.ground_boss = active,
            BossKind::Flying => self.flying_boss = active,
        }
    }
}
