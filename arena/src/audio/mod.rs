//! Sound effects and background music.
//!
//! Files are optional: a cue whose file is missing under `assets/` is
//! skipped, so the game runs silent without the sound pack.

use std::path::Path;

use bevy::audio::Volume;
use bevy::prelude::*;

use crate::AppState;
use crate::combat::AttackImpact;
use crate::settings::AudioCategoryState;

const ASSET_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../assets");

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Hit,
    Win,
    Lose,
    Button,
    FusionSuccess,
    FusionFailure,
}

impl SoundCue {
    pub fn path(self) -> &'static str {
        match self {
            Self::Hit => "sounds/se_hit.mp3",
            Self::Win => "sounds/se_win.mp3",
            Self::Lose => "sounds/se_lose.mp3",
            Self::Button => "sounds/se_button.mp3",
            Self::FusionSuccess => "sounds/se_super_fusion_success.mp3",
            Self::FusionFailure => "sounds/se_super_fusion_failure.mp3",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Music {
    Field,
    Battle,
}

impl Music {
    pub fn for_state(state: AppState) -> Self {
        match state {
            AppState::Field => Self::Field,
            AppState::Battle => Self::Battle,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Field => "sounds/bgm_field.mp3",
            Self::Battle => "sounds/bgm_battle.mp3",
        }
    }
}

#[derive(Component, Debug)]
pub struct BackgroundMusic(pub Music);

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SoundCue>().add_systems(
            Update,
            ((cue_attack_hits, play_sound_cues).chain(), sync_music),
        );
    }
}

pub fn asset_exists(path: &str) -> bool {
    Path::new(ASSET_ROOT).join(path).is_file()
}

fn cue_attack_hits(mut impacts: MessageReader<AttackImpact>, mut cues: MessageWriter<SoundCue>) {
    for _ in impacts.read() {
        cues.write(SoundCue::Hit);
    }
}

fn play_sound_cues(
    mut commands: Commands,
    mut cues: MessageReader<SoundCue>,
    categories: Res<AudioCategoryState>,
    asset_server: Option<Res<AssetServer>>,
) {
    let Some(asset_server) = asset_server else {
        cues.read().for_each(drop);
        return;
    };
    for cue in cues.read() {
        if !categories.effects_enabled || !asset_exists(cue.path()) {
            continue;
        }
        commands.spawn((
            AudioPlayer::<AudioSource>::new(asset_server.load(cue.path())),
            PlaybackSettings::DESPAWN.with_volume(Volume::Linear(categories.effects_volume)),
        ));
    }
}

/// Keeps one looping track matching the scene, or none when ambient sound
/// is off.
fn sync_music(
    mut commands: Commands,
    state: Res<State<AppState>>,
    categories: Res<AudioCategoryState>,
    playing: Query<Entity, With<BackgroundMusic>>,
    asset_server: Option<Res<AssetServer>>,
    mut last: Local<Option<(Option<Music>, u32)>>,
) {
    let wanted = categories
        .ambient_enabled
        .then(|| Music::for_state(*state.get()));
    let key = (wanted, categories.ambient_volume.to_bits());
    if *last == Some(key) {
        return;
    }
    *last = Some(key);

    for entity in &playing {
        commands.entity(entity).despawn();
    }
    let (Some(music), Some(asset_server)) = (wanted, asset_server) else {
        return;
    };
    if !asset_exists(music.path()) {
        debug!("No music at '{}'", music.path());
        return;
    }
    commands.spawn((
        BackgroundMusic(music),
        AudioPlayer::<AudioSource>::new(asset_server.load(music.path())),
        PlaybackSettings::LOOP.with_volume(Volume::Linear(categories.ambient_volume)),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scene_has_its_track() {
        assert_eq!(Music::for_state(AppState::Field), Music::Field);
        assert_eq!(Music::for_state(AppState::Battle), Music::Battle);
        assert_ne!(Music::Field.path(), Music::Battle.path());
    }

    #[test]
    fn missing_sound_files_are_reported_absent() {
        assert!(!asset_exists("sounds/does_not_exist.mp3"));
        assert!(asset_exists("data/boss_model.json"));
    }
}
