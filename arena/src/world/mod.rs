pub mod grid;

pub use grid::{FloorGridConfig, draw_floor_grid};

use bevy::camera::{ClearColorConfig, PerspectiveProjection, Projection};
use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;

use crate::AppState;
use crate::battle::stage::BATTLE_FLOOR_DROP;

const BACKGROUND: Color = Color::srgb(0.039, 0.039, 0.059);

/// Where the camera sits for a scene, and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub eye: Vec3,
    pub target: Vec3,
}

impl CameraView {
    pub const FIELD: Self = Self {
        eye: Vec3::new(0.0, 8.0, 20.0),
        target: Vec3::ZERO,
    };
    pub const BATTLE: Self = Self {
        eye: Vec3::new(0.0, 2.0, 16.0),
        target: Vec3::new(0.0, -1.0, 0.0),
    };

    pub fn for_state(state: AppState) -> Self {
        match state {
            AppState::Field => Self::FIELD,
            AppState::Battle => Self::BATTLE,
        }
    }

    pub fn transform(self) -> Transform {
        Transform::from_translation(self.eye).looking_at(self.target, Vec3::Y)
    }
}

/// Height of the floor; lowered while a battle is on.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct FloorHeight(pub f32);

impl FloorHeight {
    pub fn for_state(state: AppState) -> Self {
        match state {
            AppState::Field => Self(0.0),
            AppState::Battle => Self(-BATTLE_FLOOR_DROP),
        }
    }
}

#[derive(Component)]
pub struct WorldCamera;

#[derive(Component)]
pub struct ArenaFloor;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FloorHeight>()
            .init_resource::<FloorGridConfig>()
            .insert_resource(GlobalAmbientLight {
                color: Color::srgb_u8(0x40, 0x40, 0x60),
                brightness: 200.0,
                affects_lightmapped_meshes: true,
            })
            .add_systems(Startup, (setup_world_camera, setup_arena))
            .add_systems(OnEnter(AppState::Field), frame_scene)
            .add_systems(OnEnter(AppState::Battle), frame_scene)
            .add_systems(Update, (follow_floor_height, draw_grid));
    }
}

fn setup_world_camera(mut commands: Commands) {
    commands.spawn((
        WorldCamera,
        Camera3d::default(),
        Camera {
            order: 0,
            clear_color: ClearColorConfig::Custom(BACKGROUND),
            ..Default::default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: 60f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        DistanceFog {
            color: BACKGROUND,
            falloff: FogFalloff::Linear {
                start: 20.0,
                end: 80.0,
            },
            ..default()
        },
        CameraView::FIELD.transform(),
    ));
}

fn setup_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    for (color, position) in [
        (Color::srgb_u8(0x00, 0xff, 0xff), Vec3::new(-10.0, 5.0, 10.0)),
        (Color::srgb_u8(0xff, 0x00, 0xff), Vec3::new(10.0, 5.0, -10.0)),
    ] {
        commands.spawn((
            PointLight {
                color,
                intensity: 400_000.0,
                range: 50.0,
                ..default()
            },
            Transform::from_translation(position),
        ));
    }

    commands.spawn((
        ArenaFloor,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(100.0, 100.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb_u8(0x0a, 0x0a, 0x15),
            perceptual_roughness: 0.8,
            metallic: 0.2,
            ..default()
        })),
        Transform::default(),
    ));
}

fn frame_scene(
    state: Res<State<AppState>>,
    mut floor: ResMut<FloorHeight>,
    mut cameras: Query<&mut Transform, With<WorldCamera>>,
) {
    let state = *state.get();
    *floor = FloorHeight::for_state(state);
    for mut transform in &mut cameras {
        *transform = CameraView::for_state(state).transform();
    }
}

fn follow_floor_height(floor: Res<FloorHeight>, mut floors: Query<&mut Transform, With<ArenaFloor>>) {
    if !floor.is_changed() {
        return;
    }
    for mut transform in &mut floors {
        transform.translation.y = floor.0;
    }
}

fn draw_grid(mut gizmos: Gizmos, floor: Res<FloorHeight>, config: Res<FloorGridConfig>) {
    draw_floor_grid(&mut gizmos, floor.0, &config);
}
