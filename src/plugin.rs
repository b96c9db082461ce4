//! Bevy integration: the tracker as a resource, notifications as events.

use bevy::app::AppExit;
use bevy::prelude::*;
use crossbeam_channel::Receiver;
use log::{info, warn};

use crate::audio::{open_mixer, AudioMixer, MemoryMixer};
use crate::config::Config;
use crate::events::ProgressEvent;
use crate::io::{LoadOutcome, SettingsFile};
use crate::settings::GamePreset;
use crate::tracker::ProgressTracker;

/// The one [`ProgressTracker`] of the app.
#[derive(Resource, Deref, DerefMut)]
pub struct Progress(pub ProgressTracker);

/// A tracker notification, re-sent as a Bevy event.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressNotice(pub ProgressEvent);

/// Ask the plugin to write the settings file this frame.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct SaveProgress;

/// Mixer the record's volumes are mirrored to. Non-send: kira handles
/// stay on the main thread.
pub struct Mixer(pub Box<dyn AudioMixer>);

#[derive(Resource)]
struct NoticeReceiver(Receiver<ProgressEvent>);

pub struct ProgressPlugin {
    pub config: Config,
    /// Open the kira output device. Off means an in-memory mixer.
    pub audio_device: bool,
}

impl ProgressPlugin {
    pub fn new(config: Config) -> Self {
        Self { config, audio_device: true }
    }

    pub fn headless(config: Config) -> Self {
        Self { config, audio_device: false }
    }
}

impl Plugin for ProgressPlugin {
    fn build(&self, app: &mut App) {
        let preset = self.config.fallback_preset().unwrap_or_else(|err| {
            warn!("{err}; falling back to '{}'", GamePreset::DEFAULT.name);
            GamePreset::DEFAULT
        });
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut tracker = ProgressTracker::new(SettingsFile::new(self.config.settings_path()))
            .with_fallback_preset(preset);
        tracker.forward_to(tx);

        let mixer: Box<dyn AudioMixer> = if self.audio_device {
            open_mixer()
        } else {
            Box::new(MemoryMixer::new())
        };

        app.insert_resource(Progress(tracker))
            .insert_resource(NoticeReceiver(rx))
            .insert_non_send_resource(Mixer(mixer))
            .add_event::<ProgressNotice>()
            .add_event::<SaveProgress>()
            .add_systems(Startup, load_progress)
            .add_systems(Update, (forward_notices, save_on_request))
            .add_systems(Last, save_on_exit);

        #[cfg(all(feature = "debug-keys", debug_assertions))]
        {
            if self.config.debug_keys {
                app.add_systems(PreUpdate, debug_phase_keys);
            }
        }
    }
}

/// Load the stored record, then start a fresh run with its settings.
fn load_progress(mut progress: ResMut<Progress>, mut mixer: NonSendMut<Mixer>) {
    let path = progress.settings_file().path().display().to_string();
    match progress.deserialize(mixer.0.as_mut()) {
        LoadOutcome::Missing => info!("no settings at {path}, using defaults"),
        LoadOutcome::Loaded => info!("loaded settings from {path}"),
        LoadOutcome::Defaulted(err) => {
            warn!("{err}; reset to '{}' preset", progress.fallback_preset().name)
        }
    }
    progress.reset();
}

fn forward_notices(receiver: Res<NoticeReceiver>, mut notices: EventWriter<ProgressNotice>) {
    for event in receiver.0.try_iter() {
        notices.send(ProgressNotice(event));
    }
}

fn save_on_request(
    mut requests: EventReader<SaveProgress>,
    mut progress: ResMut<Progress>,
    mixer: NonSend<Mixer>,
) {
    if requests.read().count() > 0 {
        persist(&mut progress, mixer.0.as_ref());
    }
}

fn save_on_exit(
    mut exits: EventReader<AppExit>,
    mut progress: ResMut<Progress>,
    mixer: NonSend<Mixer>,
) {
    if exits.read().count() > 0 {
        persist(&mut progress, mixer.0.as_ref());
    }
}

fn persist(tracker: &mut ProgressTracker, mixer: &dyn AudioMixer) {
    match tracker.serialize(mixer) {
        Ok(()) => info!("saved settings to {}", tracker.settings_file().path().display()),
        Err(err) => warn!("{err}"),
    }
}

/// Numpad digit to forced phase.
pub fn debug_phase_for_key(key: KeyCode) -> Option<u32> {
    match key {
        KeyCode::Numpad0 => Some(0),
        KeyCode::Numpad1 => Some(1),
        KeyCode::Numpad2 => Some(2),
        KeyCode::Numpad3 => Some(3),
        _ => None,
    }
}

// Sets the phase directly; the completion check is not consulted.
#[cfg(all(feature = "debug-keys", debug_assertions))]
fn debug_phase_keys(keyboard_input: Res<ButtonInput<KeyCode>>, mut progress: ResMut<Progress>) {
    for key in keyboard_input.get_just_pressed() {
        if let Some(phase) = debug_phase_for_key(*key) {
            info!("debug: forcing phase {phase}");
            progress.set_phase(phase);
        }
    }
}
