pub mod hit_burst;

pub use hit_burst::{BurstConfig, BurstMeshes, ImpactFlash, Particle, spawn_hit_burst};

use bevy::prelude::*;

use crate::AppState;
use crate::combat::AttackImpact;
use crate::session::SessionRng;

pub struct VfxPlugin;

impl Plugin for VfxPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BurstMeshes>()
            .add_systems(
                FixedUpdate,
                (spawn_impact_bursts, age_particles, age_impact_flashes),
            )
            .add_systems(OnExit(AppState::Battle), clear_effects);
    }
}

pub fn spawn_impact_bursts(
    mut commands: Commands,
    mut impacts: MessageReader<AttackImpact>,
    burst_meshes: Res<BurstMeshes>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut rng: ResMut<SessionRng>,
) {
    for impact in impacts.read() {
        let count = spawn_hit_burst(
            &mut commands,
            &burst_meshes,
            &mut materials,
            impact.position,
            impact.element,
            &mut rng.0,
        );
        debug!("Spawned {count} {:?} particles", impact.element);
    }
}

pub fn age_particles(
    mut commands: Commands,
    mut particles: Query<(
        Entity,
        &mut Particle,
        &mut Transform,
        &MeshMaterial3d<StandardMaterial>,
    )>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, mut particle, mut transform, material) in &mut particles {
        match particle.step(&mut transform) {
            Some(opacity) => {
                if let Some(material) = materials.get_mut(&material.0) {
                    material.base_color.set_alpha(opacity);
                }
            }
            None => {
                materials.remove(&material.0);
                commands.entity(entity).despawn();
            }
        }
    }
}

pub fn age_impact_flashes(
    mut commands: Commands,
    mut flashes: Query<(Entity, &mut ImpactFlash, &mut PointLight)>,
) {
    for (entity, mut flash, mut light) in &mut flashes {
        match flash.step() {
            Some(intensity) => light.intensity = intensity,
            None => commands.entity(entity).despawn(),
        }
    }
}

/// Drops every live particle and flash.
pub fn clear_effects(
    mut commands: Commands,
    particles: Query<(Entity, &MeshMaterial3d<StandardMaterial>), With<Particle>>,
    flashes: Query<Entity, With<ImpactFlash>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, material) in &particles {
        materials.remove(&material.0);
        commands.entity(entity).despawn();
    }
    for entity in &flashes {
        commands.entity(entity).despawn();
    }
}
