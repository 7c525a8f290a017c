use bevy::light::DirectionalLightShadowMap;
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PresentMode, PrimaryWindow, WindowMode, WindowResolution};
use bevy::winit::{UpdateMode, WinitSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::battle::BattleTiming;

pub const SETTINGS_FILE_PATH: &str = "./settings.yaml";

const RESOLUTION_PRESETS: [ResolutionSetting; 4] = [
    ResolutionSetting {
        width: 1280,
        height: 720,
    },
    ResolutionSetting {
        width: 1600,
        height: 900,
    },
    ResolutionSetting {
        width: 1920,
        height: 1080,
    },
    ResolutionSetting {
        width: 2560,
        height: 1440,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowModeSetting {
    #[default]
    Windowed,
    Fullscreen,
}

impl WindowModeSetting {
    pub const ALL: [Self; 2] = [Self::Windowed, Self::Fullscreen];

    pub fn to_bevy(self) -> WindowMode {
        match self {
            Self::Windowed => WindowMode::Windowed,
            Self::Fullscreen => WindowMode::BorderlessFullscreen(MonitorSelection::Current),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Windowed => "Windowed",
            Self::Fullscreen => "Fullscreen",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowQualitySetting {
    Off,
    #[default]
    Low,
    High,
}

impl ShadowQualitySetting {
    pub const ALL: [Self; 3] = [Self::Off, Self::Low, Self::High];

    pub fn shadow_map_size(self) -> Option<usize> {
        match self {
            Self::Off => None,
            Self::Low => Some(1024),
            Self::High => Some(4096),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Low => "Low",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FpsLimitSetting {
    #[default]
    Default60,
    Unlimited,
}

impl FpsLimitSetting {
    pub const ALL: [Self; 2] = [Self::Default60, Self::Unlimited];

    pub fn to_update_mode(self) -> UpdateMode {
        match self {
            Self::Default60 => UpdateMode::reactive(Duration::from_secs_f64(1.0 / 60.0)),
            Self::Unlimited => UpdateMode::Continuous,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default60 => "60 FPS",
            Self::Unlimited => "Unlimited",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionSetting {
    pub width: u32,
    pub height: u32,
}

impl Default for ResolutionSetting {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl ResolutionSetting {
    pub fn presets() -> &'static [Self] {
        &RESOLUTION_PRESETS
    }

    pub fn label(self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphicsSettings {
    pub window_mode: WindowModeSetting,
    pub resolution: ResolutionSetting,
    pub shadow_quality: ShadowQualitySetting,
    pub vsync: bool,
    pub fps_limit: FpsLimitSetting,
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            window_mode: WindowModeSetting::Windowed,
            resolution: ResolutionSetting::default(),
            shadow_quality: ShadowQualitySetting::Low,
            vsync: true,
            fps_limit: FpsLimitSetting::Default60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Background music.
    pub ambient_enabled: bool,
    pub ambient_volume: f32,
    pub effects_enabled: bool,
    pub effects_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            ambient_enabled: true,
            ambient_volume: 0.4,
            effects_enabled: true,
            effects_volume: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/api".to_string(),
            request_timeout_secs: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleSettings {
    pub opening_delay_ms: u64,
    pub attack_delay_ms: u64,
    pub event_delay_ms: u64,
    pub victory_delay_ms: u64,
    pub fusion_timeout_secs: u64,
}

impl Default for BattleSettings {
    fn default() -> Self {
        Self {
            opening_delay_ms: 3500,
            attack_delay_ms: 3500,
            event_delay_ms: 4500,
            victory_delay_ms: 800,
            fusion_timeout_secs: 120,
        }
    }
}

/// Shortest pause between battle beats.
pub const MIN_BATTLE_DELAY_MS: u64 = 50;
pub const MIN_FUSION_TIMEOUT_SECS: u64 = 1;

impl BattleSettings {
    /// Raises every delay to its floor.
    pub fn clamped(&self) -> Self {
        Self {
            opening_delay_ms: self.opening_delay_ms.max(MIN_BATTLE_DELAY_MS),
            attack_delay_ms: self.attack_delay_ms.max(MIN_BATTLE_DELAY_MS),
            event_delay_ms: self.event_delay_ms.max(MIN_BATTLE_DELAY_MS),
            victory_delay_ms: self.victory_delay_ms.max(MIN_BATTLE_DELAY_MS),
            fusion_timeout_secs: self.fusion_timeout_secs.max(MIN_FUSION_TIMEOUT_SECS),
        }
    }

    pub fn timing(&self) -> BattleTiming {
        let settings = self.clamped();
        BattleTiming {
            opening: Duration::from_millis(settings.opening_delay_ms),
            after_attack: Duration::from_millis(settings.attack_delay_ms),
            after_event: Duration::from_millis(settings.event_delay_ms),
            victory_delay: Duration::from_millis(settings.victory_delay_ms),
            fusion_timeout: Duration::from_secs(settings.fusion_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Resource)]
#[serde(default)]
pub struct GameSettings {
    pub graphics: GraphicsSettings,
    pub audio: AudioSettings,
    pub service: ServiceSettings,
    pub battle: BattleSettings,
}

#[derive(Debug, Error)]
pub enum SettingsIoError {
    #[error("failed to read settings file: {0}")]
    Read(std::io::Error),
    #[error("failed to write settings file: {0}")]
    Write(std::io::Error),
    #[error("failed to decode YAML settings: {0}")]
    Deserialize(serde_yaml::Error),
    #[error("failed to encode YAML settings: {0}")]
    Serialize(serde_yaml::Error),
}

#[derive(Resource, Clone)]
pub struct SettingsResource {
    pub current: GameSettings,
    path: PathBuf,
}

impl SettingsResource {
    pub fn new(current: GameSettings) -> Self {
        Self {
            current,
            path: PathBuf::from(SETTINGS_FILE_PATH),
        }
    }

    pub fn with_path(current: GameSettings, path: impl Into<PathBuf>) -> Self {
        Self {
            current,
            path: path.into(),
        }
    }

    pub fn save_to_disk(&self) -> Result<(), SettingsIoError> {
        write_settings_to_path(&self.current, &self.path)
    }
}

/// Which sound categories may play, with their volumes.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct AudioCategoryState {
    pub ambient_enabled: bool,
    pub ambient_volume: f32,
    pub effects_enabled: bool,
    pub effects_volume: f32,
}

impl Default for AudioCategoryState {
    fn default() -> Self {
        Self::from(&AudioSettings::default())
    }
}

impl From<&AudioSettings> for AudioCategoryState {
    fn from(audio: &AudioSettings) -> Self {
        Self {
            ambient_enabled: audio.ambient_enabled,
            ambient_volume: audio.ambient_volume.clamp(0.0, 1.0),
            effects_enabled: audio.effects_enabled,
            effects_volume: audio.effects_volume.clamp(0.0, 1.0),
        }
    }
}

pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AudioCategoryState>()
            .add_systems(Update, apply_runtime_settings);
    }
}

pub fn load_settings_or_default() -> GameSettings {
    let path = Path::new(SETTINGS_FILE_PATH);

    if !path.exists() {
        return GameSettings::default();
    }

    match load_settings_from_path(path) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!(
                "Failed to load settings from '{}': {}. Falling back to defaults.",
                SETTINGS_FILE_PATH, error
            );
            GameSettings::default()
        }
    }
}

pub fn ensure_settings_file_exists(settings: &GameSettings) -> Result<(), SettingsIoError> {
    let path = Path::new(SETTINGS_FILE_PATH);
    if path.exists() {
        return Ok(());
    }

    write_settings_to_path(settings, path)
}

pub fn present_mode_for(graphics: &GraphicsSettings) -> PresentMode {
    if matches!(graphics.fps_limit, FpsLimitSetting::Unlimited) || !graphics.vsync {
        PresentMode::AutoNoVsync
    } else {
        PresentMode::AutoVsync
    }
}

pub fn load_settings_from_path(path: &Path) -> Result<GameSettings, SettingsIoError> {
    let raw = fs::read_to_string(path).map_err(SettingsIoError::Read)?;
    let mut settings =
        serde_yaml::from_str::<GameSettings>(&raw).map_err(SettingsIoError::Deserialize)?;
    settings.battle = settings.battle.clamped();
    Ok(settings)
}

fn write_settings_to_path(settings: &GameSettings, path: &Path) -> Result<(), SettingsIoError> {
    let encoded = serde_yaml::to_string(settings).map_err(SettingsIoError::Serialize)?;
    fs::write(path, encoded).map_err(SettingsIoError::Write)
}

fn apply_runtime_settings(
    settings: Res<SettingsResource>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    winit_settings: Option<ResMut<WinitSettings>>,
    mut suns: Query<&mut DirectionalLight>,
    added_suns: Query<(), Added<DirectionalLight>>,
    mut shadow_map: Option<ResMut<DirectionalLightShadowMap>>,
    mut audio_categories: ResMut<AudioCategoryState>,
    mut last_applied: Local<Option<GameSettings>>,
) {
    if last_applied.as_ref() == Some(&settings.current) && added_suns.is_empty() {
        return;
    }
    let graphics = &settings.current.graphics;

    if let Ok(mut window) = windows.single_mut() {
        let target_mode = graphics.window_mode.to_bevy();
        window.mode = target_mode;
        if matches!(target_mode, WindowMode::Windowed) {
            window.resolution =
                WindowResolution::new(graphics.resolution.width, graphics.resolution.height);
        }
        window.present_mode = present_mode_for(graphics);
    }

    if let Some(mut winit_settings) = winit_settings {
        let update_mode = graphics.fps_limit.to_update_mode();
        winit_settings.focused_mode = update_mode;
        winit_settings.unfocused_mode = update_mode;
    }

    let map_size = graphics.shadow_quality.shadow_map_size();
    for mut light in &mut suns {
        light.shadows_enabled = map_size.is_some();
    }
    if let (Some(size), Some(map)) = (map_size, shadow_map.as_deref_mut()) {
        map.size = size;
    }

    *audio_categories = AudioCategoryState::from(&settings.current.audio);
    *last_applied = Some(settings.current.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults_for_the_rest() {
        let settings: GameSettings = serde_yaml::from_str(
            "service:\n  base_url: http://example.test/api\nbattle:\n  attack_delay_ms: 100\n",
        )
        .unwrap();
        assert_eq!(settings.service.base_url, "http://example.test/api");
        assert_eq!(settings.service.request_timeout_secs, 90);
        assert_eq!(settings.battle.attack_delay_ms, 100);
        assert_eq!(settings.battle.event_delay_ms, 4500);
        assert_eq!(settings.graphics, GraphicsSettings::default());
    }

    #[test]
    fn battle_settings_become_director_timing() {
        let timing = BattleSettings::default().timing();
        assert_eq!(timing, BattleTiming::default());
    }

    #[test]
    fn settings_survive_a_trip_through_disk() {
        let path = std::env::temp_dir().join(format!("arena-settings-{}.yaml", std::process::id()));
        let mut current = GameSettings::default();
        current.audio.effects_enabled = false;
        current.graphics.shadow_quality = ShadowQualitySetting::High;

        SettingsResource::with_path(current.clone(), &path)
            .save_to_disk()
            .unwrap();
        let loaded = load_settings_from_path(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, current);
    }

    #[test]
    fn volumes_are_clamped() {
        let audio = AudioSettings {
            effects_volume: 3.0,
            ambient_volume: -1.0,
            ..Default::default()
        };
        let state = AudioCategoryState::from(&audio);
        assert_eq!(state.effects_volume, 1.0);
        assert_eq!(state.ambient_volume, 0.0);
    }

    #[test]
    fn zero_delays_are_raised_to_the_floor() {
        let settings: GameSettings = serde_yaml::from_str(
            "battle:\n  opening_delay_ms: 0\n  event_delay_ms: 5\n  fusion_timeout_secs: 0\n",
        )
        .unwrap();
        let battle = settings.battle.clamped();
        assert_eq!(battle.opening_delay_ms, MIN_BATTLE_DELAY_MS);
        assert_eq!(battle.event_delay_ms, MIN_BATTLE_DELAY_MS);
        assert_eq!(battle.attack_delay_ms, 3500);
        assert_eq!(battle.fusion_timeout_secs, MIN_FUSION_TIMEOUT_SECS);

        let timing = settings.battle.timing();
        assert_eq!(timing.opening, Duration::from_millis(MIN_BATTLE_DELAY_MS));
        assert_eq!(timing.after_event, Duration::from_millis(MIN_BATTLE_DELAY_MS));
    }
}
