use bevy::prelude::*;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use blackout::audio::{AudioMixer, MemoryMixer, VolumeChannel, MIN_VOLUME_DB};
use blackout::config::Config;
use blackout::plugin::{Mixer, Progress, ProgressPlugin, SaveProgress};
use blackout::ui::{setup_ui, show_banner, toggle_hud_visibility, update_ui, UiState};
use blackout::{GamePreset, LoadOutcome, ProgressTracker, SettingsFile};

#[derive(Parser, Debug)]
#[command(name = "blackout", about = "Generators, puzzle, keys. Progress and settings.")]
struct Cli {
    /// Launch config (default: ./blackout.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Settings file, overriding the config
    #[arg(long)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the game window (default)
    Play,
    /// Print the stored record as JSON
    Show,
    /// Clear progress in the stored record
    Reset,
    /// Apply a preset's thresholds to the stored record
    Preset { name: String },
}

const VOLUME_STEP_DB: f32 = 3.0;

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref());
    if let Some(path) = cli.settings {
        config.settings_path = Some(path);
    }

    let result = match cli.command.unwrap_or(Command::Play) {
        Command::Play => {
            play(config);
            Ok(())
        }
        Command::Show => show(&config),
        Command::Reset => edit(&config, |tracker| tracker.reset()),
        Command::Preset { name } => match GamePreset::by_name(&name) {
            Some(preset) => edit(&config, |tracker| tracker.apply_preset(&preset)),
            None => Err(unknown_preset(&name)),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("blackout: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Tracker over the configured file, loaded, with an in-memory mixer.
fn load_headless(config: &Config) -> (ProgressTracker, MemoryMixer) {
    let preset = config.fallback_preset().unwrap_or_default();
    let mut tracker = ProgressTracker::new(SettingsFile::new(config.settings_path()))
        .with_fallback_preset(preset);
    let mut mixer = MemoryMixer::new();
    match tracker.deserialize(&mut mixer) {
        LoadOutcome::Defaulted(err) => log::warn!("{err}; using '{}' preset", preset.name),
        LoadOutcome::Missing => log::info!("no settings file yet"),
        LoadOutcome::Loaded => {}
    }
    (tracker, mixer)
}

fn unknown_preset(name: &str) -> String {
    let mut msg = format!("unknown preset '{name}'; choose one of:");
    for preset in GamePreset::ALL {
        msg.push_str(&format!("\n  {:<8} {}", preset.name, preset.description()));
    }
    msg
}

fn show(config: &Config) -> Result<(), String> {
    let (tracker, _) = load_headless(config);
    if !tracker.settings_file().exists() {
        println!("(no settings file yet, showing defaults)");
    }
    let json = serde_json::to_string_pretty(tracker.data()).map_err(|e| e.to_string())?;
    println!("{}", tracker.settings_file().path().display());
    println!("{json}");
    Ok(())
}

fn edit(config: &Config, change: impl FnOnce(&mut ProgressTracker)) -> Result<(), String> {
    let (mut tracker, mixer) = load_headless(config);
    change(&mut tracker);
    tracker.serialize(&mixer).map_err(|e| e.to_string())?;
    println!("saved {}", tracker.settings_file().path().display());
    Ok(())
}

fn play(config: Config) {
    let resolution = (config.window_width, config.window_height);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Blackout".into(),
                resolution: resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(ProgressPlugin::new(config))
        .init_resource::<UiState>()
        .add_systems(Startup, (setup_camera, setup_ui, print_controls))
        .add_systems(
            Update,
            (
                handle_game_input,
                handle_volume_input,
                update_ui,
                show_banner,
                toggle_hud_visibility,
            ),
        )
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn print_controls() {
    println!("\nCONTROLS:");
    println!("  G - Activate a generator");
    println!("  P - Solve the puzzle");
    println!("  K - Find a key");
    println!("  R - Reset progress");
    println!("  F5 - Save settings");
    println!("  Up/Down - Main volume");
    println!("  H - Toggle HUD");
    #[cfg(all(feature = "debug-keys", debug_assertions))]
    println!("  Numpad 0-3 - Force phase (debug)");
}

fn handle_game_input(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut progress: ResMut<Progress>,
    mut saves: EventWriter<SaveProgress>,
) {
    if keyboard_input.just_pressed(KeyCode::KeyG) {
        let count = progress.active_generators() + 1;
        progress.set_active_generators(count);
    }

    if keyboard_input.just_pressed(KeyCode::KeyP) {
        progress.set_puzzle_solved(true);
    }

    if keyboard_input.just_pressed(KeyCode::KeyK) {
        let count = progress.found_keys() + 1;
        progress.set_found_keys(count);
    }

    if keyboard_input.just_pressed(KeyCode::KeyR) {
        progress.reset();
        log::info!("progress reset");
    }

    if keyboard_input.just_pressed(KeyCode::F5) {
        saves.send(SaveProgress);
    }
}

fn handle_volume_input(keyboard_input: Res<ButtonInput<KeyCode>>, mut mixer: NonSendMut<Mixer>) {
    let step = if keyboard_input.just_pressed(KeyCode::ArrowUp) {
        VOLUME_STEP_DB
    } else if keyboard_input.just_pressed(KeyCode::ArrowDown) {
        -VOLUME_STEP_DB
    } else {
        return;
    };

    let db = (mixer.0.channel_volume(VolumeChannel::Main) + step).clamp(MIN_VOLUME_DB, 6.0);
    mixer.0.set_channel_volume(VolumeChannel::Main, db);
    println!("Main volume: {db:+.0} dB");
}
