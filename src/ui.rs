use bevy::prelude::*;

use crate::hud::HudData;
use crate::plugin::{Progress, ProgressNotice};
use crate::events::ProgressEvent;

// UI Components
#[derive(Component)]
pub struct PhaseText;

#[derive(Component)]
pub struct GeneratorsText;

#[derive(Component)]
pub struct PuzzleText;

#[derive(Component)]
pub struct KeysText;

#[derive(Component)]
pub struct BannerText;

#[derive(Component)]
pub struct HudContainer;

// UI Resources
#[derive(Resource)]
pub struct UiState {
    pub hud_visible: bool,
    /// Seconds left on the phase banner.
    pub banner_timer: f32,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            hud_visible: true,
            banner_timer: 0.0,
        }
    }
}

const BANNER_SECONDS: f32 = 3.0;

pub fn setup_ui(mut commands: Commands) {
    let hud = HudData::default();

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                flex_direction: FlexDirection::Column,
                padding: UiRect::all(Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
            HudContainer,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(hud.phase_line()),
                TextFont { font_size: 18.0, ..default() },
                TextColor(Color::srgb(1.0, 0.85, 0.3)),
                PhaseText,
            ));
            parent.spawn((
                Text::new(hud.generators_line()),
                TextFont { font_size: 16.0, ..default() },
                TextColor(Color::WHITE),
                GeneratorsText,
            ));
            parent.spawn((
                Text::new(hud.puzzle_line()),
                TextFont { font_size: 16.0, ..default() },
                TextColor(Color::WHITE),
                PuzzleText,
            ));
            parent.spawn((
                Text::new(hud.keys_line()),
                TextFont { font_size: 16.0, ..default() },
                TextColor(Color::WHITE),
                KeysText,
            ));
        });

    // Centre banner, shown briefly on phase change
    commands.spawn((
        Text::new(""),
        TextFont { font_size: 32.0, ..default() },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(40.0),
            left: Val::Percent(30.0),
            ..default()
        },
        Visibility::Hidden,
        BannerText,
    ));
}

/// Refresh the HUD lines whenever the tracker changed this frame.
pub fn update_ui(
    progress: Res<Progress>,
    mut phase_query: Query<
        &mut Text,
        (With<PhaseText>, Without<GeneratorsText>, Without<PuzzleText>, Without<KeysText>),
    >,
    mut generators_query: Query<
        &mut Text,
        (With<GeneratorsText>, Without<PhaseText>, Without<PuzzleText>, Without<KeysText>),
    >,
    mut puzzle_query: Query<
        &mut Text,
        (With<PuzzleText>, Without<PhaseText>, Without<GeneratorsText>, Without<KeysText>),
    >,
    mut keys_query: Query<
        &mut Text,
        (With<KeysText>, Without<PhaseText>, Without<GeneratorsText>, Without<PuzzleText>),
    >,
) {
    if !progress.is_changed() {
        return;
    }
    let hud = HudData::from_data(progress.data());

    if let Ok(mut text) = phase_query.get_single_mut() {
        **text = hud.phase_line();
    }
    if let Ok(mut text) = generators_query.get_single_mut() {
        **text = hud.generators_line();
    }
    if let Ok(mut text) = puzzle_query.get_single_mut() {
        **text = hud.puzzle_line();
    }
    if let Ok(mut text) = keys_query.get_single_mut() {
        **text = hud.keys_line();
    }
}

/// Flash a banner for phase changes and a solved puzzle.
pub fn show_banner(
    time: Res<Time>,
    mut notices: EventReader<ProgressNotice>,
    mut ui_state: ResMut<UiState>,
    mut banner_query: Query<(&mut Text, &mut Visibility), With<BannerText>>,
) {
    let Ok((mut text, mut visibility)) = banner_query.get_single_mut() else {
        return;
    };

    for ProgressNotice(event) in notices.read() {
        let message = match event {
            ProgressEvent::PhaseChanged(phase) => {
                crate::Phase::from_index(*phase).objective().to_string()
            }
            ProgressEvent::PuzzleSolved => "Puzzle solved".to_string(),
            _ => continue,
        };
        **text = message;
        *visibility = Visibility::Visible;
        ui_state.banner_timer = BANNER_SECONDS;
    }

    if ui_state.banner_timer > 0.0 {
        ui_state.banner_timer -= time.delta_secs();
        if ui_state.banner_timer <= 0.0 {
            *visibility = Visibility::Hidden;
        }
    }
}

pub fn toggle_hud_visibility(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut ui_state: ResMut<UiState>,
    mut hud_query: Query<&mut Visibility, With<HudContainer>>,
) {
    if keyboard_input.just_pressed(KeyCode::KeyH) {
        ui_state.hud_visible = !ui_state.hud_visible;

        for mut visibility in hud_query.iter_mut() {
            *visibility = if ui_state.hud_visible {
                Visibility::Visible
            } else {
                Visibility::Hidden
            };
        }
    }
}
