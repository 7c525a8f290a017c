use crate::AppState;
use crate::audio::SoundCue;
use crate::battle::{ActiveBattle, BattlePhase, Gauge};
use crate::character::Creature;
use crate::field::FieldCommand;
use crate::scenes::transition_to;
use crate::session::{FusionState, GameSession};
use crate::settings::{
    self, FpsLimitSetting, GameSettings, ResolutionSetting, SettingsResource,
    ShadowQualitySetting, WindowModeSetting,
};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 107, 107);
const ACCENT_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 255, 255);

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HudUiState>()
            .add_systems(OnEnter(AppState::Field), reset_hud_state)
            .add_systems(OnEnter(AppState::Battle), reset_hud_state)
            .add_systems(Update, toggle_settings_modal_with_escape)
            .add_systems(EguiPrimaryContextPass, draw_hud_egui);
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
enum SettingsTab {
    #[default]
    Graphics,
    Audio,
    Service,
    Battle,
}

#[derive(Resource, Default)]
struct HudUiState {
    settings_open: bool,
    settings_tab: SettingsTab,
    draft: GameSettings,
    prompt: String,
}

/// Clicks collected while drawing, dispatched once the frame is laid out.
#[derive(Default)]
struct HudActions {
    commands: Vec<FieldCommand>,
    leave_battle: bool,
}

impl HudActions {
    fn push(&mut self, command: FieldCommand) {
        self.commands.push(command);
    }

    fn clicked(&self) -> bool {
        !self.commands.is_empty() || self.leave_battle
    }
}

fn reset_hud_state(mut hud_state: ResMut<HudUiState>, settings: Res<SettingsResource>) {
    hud_state.settings_open = false;
    hud_state.settings_tab = SettingsTab::Graphics;
    hud_state.draft = settings.current.clone();
}

fn toggle_settings_modal_with_escape(
    keys: Res<ButtonInput<KeyCode>>,
    settings_resource: Res<SettingsResource>,
    mut hud_state: ResMut<HudUiState>,
) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }

    if !hud_state.settings_open {
        hud_state.draft = settings_resource.current.clone();
        hud_state.settings_tab = SettingsTab::Graphics;
    }

    hud_state.settings_open = !hud_state.settings_open;
}

#[allow(clippy::too_many_arguments)]
fn draw_hud_egui(
    mut contexts: EguiContexts,
    mut hud_state: ResMut<HudUiState>,
    mut settings_resource: ResMut<SettingsResource>,
    app_state: Res<State<AppState>>,
    mut next_state: ResMut<NextState<AppState>>,
    session: Res<GameSession>,
    battle: Option<Res<ActiveBattle>>,
    creatures: Query<&Creature>,
    mut field_commands: MessageWriter<FieldCommand>,
    mut cues: MessageWriter<SoundCue>,
    mut theme_initialized: Local<bool>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    if !*theme_initialized {
        apply_modern_hud_theme(ctx);
        *theme_initialized = true;
    }

    let mut actions = HudActions::default();
    match app_state.get() {
        AppState::Field => draw_field_panel(ctx, &mut hud_state, &session, &creatures, &mut actions),
        AppState::Battle => {
            if let Some(battle) = battle.as_deref() {
                draw_battle_panel(ctx, battle, &mut actions);
            }
        }
    }

    draw_bottom_bar(&mut hud_state, &settings_resource, ctx);

    if hud_state.settings_open {
        draw_settings_modal(&mut hud_state, &mut settings_resource, ctx);
    }

    if actions.clicked() {
        cues.write(SoundCue::Button);
    }
    for command in actions.commands {
        field_commands.write(command);
    }
    if actions.leave_battle {
        transition_to(&mut next_state, AppState::Field);
    }
}

fn apply_modern_hud_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(12.0, 8.0);
    style.spacing.window_margin = egui::Margin::same(14);
    style.visuals.window_corner_radius = egui::CornerRadius::same(12);
    style.visuals.menu_corner_radius = egui::CornerRadius::same(10);
    style.visuals.widgets.active.corner_radius = egui::CornerRadius::same(8);
    style.visuals.widgets.hovered.corner_radius = egui::CornerRadius::same(8);
    style.visuals.widgets.inactive.corner_radius = egui::CornerRadius::same(8);
    style.visuals.selection.bg_fill = egui::Color32::from_rgb(0, 110, 120);
    ctx.set_style(style);
}

fn draw_field_panel(
    ctx: &egui::Context,
    hud_state: &mut HudUiState,
    session: &GameSession,
    creatures: &Query<&Creature>,
    actions: &mut HudActions,
) {
    egui::SidePanel::left("field_panel")
        .resizable(false)
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.heading(format!("Stage {}", session.stage));
            ui.separator();

            ui.label("Describe a monster");
            ui.add(
                egui::TextEdit::singleline(&mut hud_state.prompt)
                    .desired_width(f32::INFINITY)
                    .hint_text("a crystal fox that breathes frost"),
            );
            ui.horizontal(|ui| {
                let can_generate = !session.generating && !hud_state.prompt.trim().is_empty();
                if ui
                    .add_enabled(can_generate, egui::Button::new("Generate"))
                    .clicked()
                {
                    actions.push(FieldCommand::Generate(hud_state.prompt.clone()));
                    hud_state.prompt.clear();
                }
                if session.generating {
                    ui.spinner();
                    ui.label("Generating...");
                }
            });
            if let Some(error) = &session.last_error {
                ui.colored_label(ERROR_COLOR, error);
            }

            ui.separator();
            draw_roster(ui, session, creatures, actions);

            if session.fusion_offered() {
                ui.separator();
                draw_fusion_controls(ui, session, creatures, actions);
            }

            ui.separator();
            ui.label(format!("Party: {}", session.party.len()));
            if ui
                .add_enabled(
                    session.can_start_battle(),
                    egui::Button::new("Start battle").min_size(egui::vec2(200.0, 34.0)),
                )
                .clicked()
            {
                actions.push(FieldCommand::StartBattle);
            }
        });
}

fn draw_roster(
    ui: &mut egui::Ui,
    session: &GameSession,
    creatures: &Query<&Creature>,
    actions: &mut HudActions,
) {
    ui.label(format!("Roster ({})", session.roster.len()));
    egui::ScrollArea::vertical()
        .id_salt("roster")
        .max_height(260.0)
        .show(ui, |ui| {
            for entity in &session.roster {
                let Ok(creature) = creatures.get(*entity) else {
                    continue;
                };
                let stats = &creature.definition.stats;
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&stats.name).strong());
                    ui.label(stats.element.label());
                    ui.label("★".repeat(stats.effective_rarity() as usize));
                });
                ui.horizontal(|ui| {
                    ui.small(format!(
                        "HP {}  ATK {}  DEF {}  SPD {}",
                        stats.hp, stats.attack, stats.defense, stats.speed
                    ));
                });
                ui.horizontal(|ui| {
                    let in_fusion = session.fusion_pair.contains(entity);
                    let in_party = session.party.contains(entity);
                    if session.fusion_offered()
                        && ui
                            .add_enabled(
                                !session.fusion.is_started(),
                                egui::Button::selectable(in_fusion, "Fuse"),
                            )
                            .clicked()
                    {
                        actions.push(FieldCommand::ToggleFusionPick(*entity));
                    }
                    if ui
                        .add_enabled(!in_fusion, egui::Button::selectable(in_party, "Party"))
                        .clicked()
                    {
                        actions.push(FieldCommand::TogglePartyPick(*entity));
                    }
                });
                ui.add_space(4.0);
            }
        });
}

fn draw_fusion_controls(
    ui: &mut egui::Ui,
    session: &GameSession,
    creatures: &Query<&Creature>,
    actions: &mut HudActions,
) {
    ui.label("Fusion");
    let picks: Vec<&str> = session
        .fusion_pair
        .iter()
        .filter_map(|entity| creatures.get(*entity).ok())
        .map(Creature::name)
        .collect();
    if picks.is_empty() {
        ui.small("Pick two characters to fuse.");
    } else {
        ui.label(picks.join(" + "));
    }

    let pair_ready = session.fusion_pair.len() == 2;
    ui.horizontal(|ui| {
        let idle = matches!(session.fusion, FusionState::Idle);
        if ui
            .add_enabled(idle && pair_ready, egui::Button::new("Fuse"))
            .clicked()
        {
            actions.push(FieldCommand::Fuse);
        }
        if session.super_fusion_unlocked()
            && ui
                .add_enabled(
                    idle && pair_ready && session.last_roll.is_none(),
                    egui::Button::new("Roll for super fusion"),
                )
                .clicked()
        {
            actions.push(FieldCommand::RollDice);
        }
        if ui
            .add_enabled(!session.fusion.is_started(), egui::Button::new("Clear"))
            .clicked()
        {
            actions.push(FieldCommand::ClearFusionPicks);
        }
    });

    if let Some(roll) = session.last_roll {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(format!("🎲 {}", roll.face)).size(22.0));
            ui.label(roll.outcome.label());
            if matches!(session.fusion, FusionState::Rolling) && ui.button("Confirm").clicked() {
                actions.push(FieldCommand::ConfirmDice);
            }
        });
    }

    match &session.fusion {
        FusionState::Idle | FusionState::Rolling => {}
        FusionState::Generating { is_super } => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(if *is_super {
                    "Super fusion in progress..."
                } else {
                    "Fusion in progress..."
                });
            });
        }
        FusionState::Ready(result) => {
            let name = &result.character.definition.stats.name;
            let text = if result.misfire {
                format!("Misfire: {name} joins as a copy")
            } else if result.is_super {
                format!("Super fusion ready: {name}")
            } else {
                format!("Fusion ready: {name}")
            };
            ui.colored_label(ACCENT_COLOR, text);
        }
        FusionState::Failed(reason) => {
            ui.colored_label(ERROR_COLOR, format!("Fusion failed: {reason}"));
        }
    }
}

fn draw_battle_panel(ctx: &egui::Context, battle: &ActiveBattle, actions: &mut HudActions) {
    let director = &battle.director;
    egui::SidePanel::right("battle_panel")
        .resizable(false)
        .default_width(340.0)
        .show(ctx, |ui| {
            ui.heading(format!("Stage {} vs {}", director.stage(), director.boss().name));
            ui.label(phase_label(director.phase()));
            ui.separator();

            let ledger = director.ledger();
            draw_gauge(ui, &ledger.boss, egui::Color32::from_rgb(190, 60, 90));
            for gauge in &ledger.party {
                draw_gauge(ui, gauge, egui::Color32::from_rgb(60, 170, 110));
            }
            if let Some(gauge) = &ledger.fusion {
                draw_gauge(ui, gauge, ACCENT_COLOR);
            }

            ui.separator();
            egui::ScrollArea::vertical()
                .id_salt("battle_log")
                .max_height(320.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in director.log() {
                        ui.label(line);
                    }
                });

            if let Some(outcome) = director.outcome() {
                ui.separator();
                ui.small(format!(
                    "Party power {} vs boss {} ({}%)",
                    outcome.party_total_rounded(),
                    outcome.boss_power_rounded(),
                    outcome.ratio_percent()
                ));
            }
            if let Some(error) = director.error() {
                ui.colored_label(ERROR_COLOR, error.to_string());
            }

            ui.separator();
            let label = if director.phase().is_over() {
                "Return to field"
            } else {
                "Retreat"
            };
            if ui
                .add_sized(egui::vec2(200.0, 34.0), egui::Button::new(label))
                .clicked()
            {
                actions.leave_battle = true;
            }
        });
}

fn draw_gauge(ui: &mut egui::Ui, gauge: &Gauge, fill: egui::Color32) {
    ui.add(
        egui::ProgressBar::new(gauge.fraction())
            .fill(fill)
            .text(format!("{}  {}/{}", gauge.name, gauge.hp, gauge.max)),
    );
}

fn phase_label(phase: BattlePhase) -> &'static str {
    match phase {
        BattlePhase::AwaitingFusion => "Waiting for the fusion unit...",
        BattlePhase::Narrating => "The battle is being written...",
        BattlePhase::Playing => "Fight!",
        BattlePhase::Won => "Victory!",
        BattlePhase::Lost => "Defeat...",
        BattlePhase::Error => "The battle could not continue",
    }
}

fn draw_bottom_bar(
    hud_state: &mut HudUiState,
    settings_resource: &SettingsResource,
    ctx: &egui::Context,
) {
    egui::TopBottomPanel::bottom("hud_bottom_bar")
        .resizable(false)
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal_centered(|ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 128))
                    .corner_radius(egui::CornerRadius::same(12))
                    .inner_margin(egui::Margin::symmetric(12, 10))
                    .show(ui, |ui| {
                        if ui
                            .add_sized(egui::vec2(42.0, 42.0), egui::Button::new("⚙"))
                            .on_hover_text("Settings")
                            .clicked()
                        {
                            hud_state.settings_open = true;
                            hud_state.settings_tab = SettingsTab::Graphics;
                            hud_state.draft = settings_resource.current.clone();
                        }
                    });
            });
            ui.add_space(8.0);
        });
}

fn draw_settings_modal(
    hud_state: &mut HudUiState,
    settings_resource: &mut SettingsResource,
    ctx: &egui::Context,
) {
    let was_open = hud_state.settings_open;
    let mut window_open = hud_state.settings_open;
    let mut should_apply = false;
    let mut should_close = false;

    egui::Window::new("Settings")
        .open(&mut window_open)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .collapsible(false)
        .resizable(false)
        .movable(false)
        .default_width(600.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(
                    &mut hud_state.settings_tab,
                    SettingsTab::Graphics,
                    "Graphics",
                );
                ui.selectable_value(&mut hud_state.settings_tab, SettingsTab::Audio, "Audio");
                ui.selectable_value(
                    &mut hud_state.settings_tab,
                    SettingsTab::Service,
                    "Service",
                );
                ui.selectable_value(&mut hud_state.settings_tab, SettingsTab::Battle, "Battle");
            });

            ui.separator();

            match hud_state.settings_tab {
                SettingsTab::Graphics => draw_graphics_settings_tab(ui, &mut hud_state.draft),
                SettingsTab::Audio => draw_audio_settings_tab(ui, &mut hud_state.draft),
                SettingsTab::Service => draw_service_settings_tab(ui, &mut hud_state.draft),
                SettingsTab::Battle => draw_battle_settings_tab(ui, &mut hud_state.draft),
            }

            ui.separator();
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                should_apply = ui.button("Apply").clicked();
                should_close = ui.button("Close").clicked();
            });
        });

    if should_apply {
        settings_resource.current = hud_state.draft.clone();
        if let Err(error) = settings_resource.save_to_disk() {
            warn!(
                "Failed to save settings file '{}': {}",
                settings::SETTINGS_FILE_PATH,
                error
            );
        }
    }

    if should_close {
        window_open = false;
        hud_state.draft = settings_resource.current.clone();
    }

    hud_state.settings_open = window_open;

    if was_open && !hud_state.settings_open {
        hud_state.draft = settings_resource.current.clone();
    }
}

fn draw_graphics_settings_tab(ui: &mut egui::Ui, draft: &mut GameSettings) {
    egui::ComboBox::from_label("Window mode")
        .selected_text(draft.graphics.window_mode.label())
        .show_ui(ui, |ui| {
            for option in WindowModeSetting::ALL {
                ui.selectable_value(&mut draft.graphics.window_mode, option, option.label());
            }
        });

    egui::ComboBox::from_label("Resolution")
        .selected_text(draft.graphics.resolution.label())
        .show_ui(ui, |ui| {
            for option in ResolutionSetting::presets() {
                ui.selectable_value(&mut draft.graphics.resolution, *option, option.label());
            }
        });

    egui::ComboBox::from_label("Shadows")
        .selected_text(draft.graphics.shadow_quality.label())
        .show_ui(ui, |ui| {
            for option in ShadowQualitySetting::ALL {
                ui.selectable_value(&mut draft.graphics.shadow_quality, option, option.label());
            }
        });

    egui::ComboBox::from_label("FPS limit")
        .selected_text(draft.graphics.fps_limit.label())
        .show_ui(ui, |ui| {
            for option in FpsLimitSetting::ALL {
                ui.selectable_value(&mut draft.graphics.fps_limit, option, option.label());
            }
        });

    ui.checkbox(&mut draft.graphics.vsync, "VSync");
}

fn draw_audio_settings_tab(ui: &mut egui::Ui, draft: &mut GameSettings) {
    ui.checkbox(&mut draft.audio.ambient_enabled, "Music");
    ui.add_enabled(
        draft.audio.ambient_enabled,
        egui::Slider::new(&mut draft.audio.ambient_volume, 0.0..=1.0).text("Music volume"),
    );
    ui.checkbox(&mut draft.audio.effects_enabled, "Sound effects");
    ui.add_enabled(
        draft.audio.effects_enabled,
        egui::Slider::new(&mut draft.audio.effects_volume, 0.0..=1.0).text("Effects volume"),
    );
}

fn draw_service_settings_tab(ui: &mut egui::Ui, draft: &mut GameSettings) {
    ui.label("Creature service URL");
    ui.add(egui::TextEdit::singleline(&mut draft.service.base_url).desired_width(420.0));
    ui.horizontal(|ui| {
        ui.label("Request timeout (s)");
        ui.add(egui::DragValue::new(&mut draft.service.request_timeout_secs).range(5..=600));
    });
    ui.small("Service changes take effect on the next launch.");
}

fn draw_battle_settings_tab(ui: &mut egui::Ui, draft: &mut GameSettings) {
    let battle = &mut draft.battle;
    egui::Grid::new("battle_timing").num_columns(2).show(ui, |ui| {
        for (label, value) in [
            ("Opening delay (ms)", &mut battle.opening_delay_ms),
            ("After attack (ms)", &mut battle.attack_delay_ms),
            ("After drama (ms)", &mut battle.event_delay_ms),
            ("Victory stagger (ms)", &mut battle.victory_delay_ms),
        ] {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(0..=20_000).speed(50));
            ui.end_row();
        }
        ui.label("Fusion timeout (s)");
        ui.add(egui::DragValue::new(&mut battle.fusion_timeout_secs).range(10..=900));
        ui.end_row();
    });
}
