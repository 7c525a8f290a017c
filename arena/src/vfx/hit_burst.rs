//! Element-coloured particle burst and light flash played where an attack
//! connects. Particles are plain entities aged on the fixed tick.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;
use common::Element;
use rand::Rng;

/// Ticks the flash light stays on.
pub const FLASH_LIFE: u32 = 22;
pub const FLASH_RANGE: f32 = 18.0;
/// Light intensity at the moment of impact; fades linearly to zero.
pub const FLASH_INTENSITY: f32 = 800_000.0;
const SPHERE_CHANCE: f32 = 0.65;
const PARTICLE_EMISSIVE: f32 = 1.2;

/// Look and motion of the burst for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstConfig {
    pub colors: [&'static str; 3],
    pub count: usize,
    pub speed: f32,
    /// Subtracted from the vertical velocity every tick; negative floats up.
    pub gravity: f32,
    pub life: u32,
    pub spread: f32,
    pub up: f32,
    pub size: (f32, f32),
    pub emissive: bool,
}

impl BurstConfig {
    pub fn for_element(element: Element) -> Self {
        match element {
            Element::Fire => Self {
                colors: ["#ff4400", "#ff8800", "#ffcc00"],
                count: 55,
                speed: 0.14,
                gravity: -0.003,
                life: 50,
                spread: 0.7,
                up: 0.2,
                size: (0.1, 0.35),
                emissive: true,
            },
            Element::Water => Self {
                colors: ["#0088ff", "#00ccff", "#44ddff"],
                count: 50,
                speed: 0.15,
                gravity: 0.005,
                life: 44,
                spread: 1.2,
                up: 0.12,
                size: (0.08, 0.28),
                emissive: true,
            },
            Element::Wind => Self {
                colors: ["#44ff88", "#22cc66", "#88ffaa"],
                count: 45,
                speed: 0.08,
                gravity: -0.001,
                life: 60,
                spread: 0.9,
                up: 0.04,
                size: (0.07, 0.22),
                emissive: true,
            },
            Element::Earth => Self {
                colors: ["#cc8833", "#aa6622", "#ddaa44"],
                count: 50,
                speed: 0.18,
                gravity: 0.008,
                life: 35,
                spread: 1.0,
                up: 0.16,
                size: (0.12, 0.35),
                emissive: false,
            },
            Element::Dark => Self {
                colors: ["#aa44ff", "#8800cc", "#cc66ff"],
                count: 55,
                speed: 0.1,
                gravity: -0.002,
                life: 58,
                spread: 0.6,
                up: 0.02,
                size: (0.08, 0.28),
                emissive: true,
            },
            Element::Light => Self {
                colors: ["#ffdd44", "#ffffff", "#ffeeaa"],
                count: 60,
                speed: 0.12,
                gravity: -0.003,
                life: 52,
                spread: 0.8,
                up: 0.06,
                size: (0.06, 0.25),
                emissive: true,
            },
        }
    }

    pub fn flash_color(&self) -> Color {
        hex(self.colors[0])
    }
}

fn hex(value: &str) -> Color {
    Srgba::hex(value).map(Color::from).unwrap_or(Color::WHITE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleShape {
    Sphere,
    Cube,
}

/// A single burst particle; `size` is its resting scale.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Particle {
    pub velocity: Vec3,
    pub gravity: f32,
    pub age: u32,
    pub life: u32,
    pub size: f32,
}

/// Randomised start of one particle.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSeed {
    pub particle: Particle,
    pub shape: ParticleShape,
    pub color: Color,
}

impl Particle {
    /// Rolls a particle: random azimuth, elevation biased upward.
    pub fn launch<R: Rng + ?Sized>(config: &BurstConfig, rng: &mut R) -> ParticleSeed {
        let color = hex(config.colors[rng.gen_range(0..config.colors.len())]);
        let size = config.size.0 + rng.r#gen::<f32>() * (config.size.1 - config.size.0);
        let shape = if rng.r#gen::<f32>() < SPHERE_CHANCE {
            ParticleShape::Sphere
        } else {
            ParticleShape::Cube
        };
        let azimuth = rng.r#gen::<f32>() * TAU;
        let elevation = (rng.r#gen::<f32>() - 0.3) * PI * 0.5;
        let speed = config.speed * (0.3 + rng.r#gen::<f32>());
        let horizontal = elevation.cos() * speed * config.spread;
        let velocity = Vec3::new(
            azimuth.cos() * horizontal,
            config.up * (0.4 + rng.r#gen::<f32>()) + elevation.sin() * speed * 0.3,
            azimuth.sin() * horizontal,
        );
        let life = (config.life as f32 * (0.5 + rng.r#gen::<f32>() * 0.7)).floor() as u32;

        ParticleSeed {
            particle: Particle {
                velocity,
                gravity: config.gravity,
                age: 0,
                life: life.max(1),
                size,
            },
            shape,
            color,
        }
    }

    /// Ages the particle by one tick and moves it. Returns the new opacity,
    /// or `None` once the particle has lived out its life.
    pub fn step(&mut self, transform: &mut Transform) -> Option<f32> {
        self.age += 1;
        if self.age >= self.life {
            return None;
        }
        let progress = self.age as f32 / self.life as f32;
        transform.translation += self.velocity;
        self.velocity.y -= self.gravity;
        let grow = if progress < 0.2 {
            1.0 + progress * 2.0
        } else {
            1.4 - progress * 0.6
        };
        transform.scale = Vec3::splat(self.size * grow);
        transform.rotate_local_x(0.12);
        transform.rotate_local_y(0.18);
        Some(1.0 - progress * progress)
    }
}

/// Point light fading out after an impact.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ImpactFlash {
    pub age: u32,
    pub life: u32,
}

impl ImpactFlash {
    /// Ages the flash; returns the new intensity or `None` when it is spent.
    pub fn step(&mut self) -> Option<f32> {
        self.age += 1;
        if self.age >= self.life {
            return None;
        }
        Some(FLASH_INTENSITY * (1.0 - self.age as f32 / self.life as f32))
    }
}

/// Unit meshes shared by every particle; particles are sized by scale.
#[derive(Resource, Debug, Clone)]
pub struct BurstMeshes {
    pub sphere: Handle<Mesh>,
    pub cube: Handle<Mesh>,
}

impl FromWorld for BurstMeshes {
    fn from_world(world: &mut World) -> Self {
        let mut meshes = world.resource_mut::<Assets<Mesh>>();
        Self {
            sphere: meshes.add(Sphere::new(1.0).mesh().uv(8, 8)),
            cube: meshes.add(Cuboid::new(1.0, 1.0, 1.0)),
        }
    }
}

/// Spawns the particles and the light of one burst. Each particle owns its
/// material so it can fade on its own.
pub fn spawn_hit_burst<R: Rng + ?Sized>(
    commands: &mut Commands,
    burst_meshes: &BurstMeshes,
    materials: &mut Assets<StandardMaterial>,
    position: Vec3,
    element: Element,
    rng: &mut R,
) -> usize {
    let config = BurstConfig::for_element(element);
    for _ in 0..config.count {
        let seed = Particle::launch(&config, rng);
        let emissive = if config.emissive {
            seed.color.to_linear() * PARTICLE_EMISSIVE
        } else {
            LinearRgba::BLACK
        };
        let material = materials.add(StandardMaterial {
            base_color: seed.color,
            emissive,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });
        let mesh = match seed.shape {
            ParticleShape::Sphere => burst_meshes.sphere.clone(),
            ParticleShape::Cube => burst_meshes.cube.clone(),
        };
        commands.spawn((
            Name::new("HitParticle"),
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(position).with_scale(Vec3::splat(seed.particle.size)),
            seed.particle,
        ));
    }

    commands.spawn((
        Name::new("HitFlash"),
        PointLight {
            color: config.flash_color(),
            intensity: FLASH_INTENSITY,
            range: FLASH_RANGE,
            ..default()
        },
        Transform::from_translation(position),
        ImpactFlash {
            age: 0,
            life: FLASH_LIFE,
        },
    ));
    config.count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn every_element_has_a_burst_in_range() {
        for element in Element::ALL {
            let config = BurstConfig::for_element(element);
            assert!((45..=60).contains(&config.count), "{element:?}");
            assert!(config.size.0 < config.size.1);
        }
        assert!(!BurstConfig::for_element(Element::Earth).emissive);
        assert_eq!(BurstConfig::for_element(Element::Light).count, 60);
        assert_eq!(BurstConfig::for_element(Element::Water).gravity, 0.005);
    }

    #[test]
    fn launched_particles_respect_the_config() {
        let config = BurstConfig::for_element(Element::Fire);
        let mut rng = StdRng::seed_from_u64(21);
        let palette: Vec<Color> = config.colors.iter().map(|c| hex(c)).collect();
        let mut spheres = 0;
        for _ in 0..500 {
            let seed = Particle::launch(&config, &mut rng);
            assert!(seed.particle.size >= 0.1 && seed.particle.size <= 0.35);
            assert!(seed.particle.life >= 25 && seed.particle.life <= 60);
            assert!(palette.contains(&seed.color));
            if seed.shape == ParticleShape::Sphere {
                spheres += 1;
            }
        }
        assert!((250..400).contains(&spheres), "{spheres}");
    }

    #[test]
    fn particle_fades_and_dies_after_its_life() {
        let mut particle = Particle {
            velocity: Vec3::new(0.1, 0.2, 0.0),
            gravity: 0.01,
            age: 0,
            life: 10,
            size: 0.2,
        };
        let mut transform = Transform::IDENTITY;
        let mut last = 1.0;
        for _ in 0..9 {
            let opacity = particle.step(&mut transform).unwrap();
            assert!(opacity < last);
            last = opacity;
        }
        assert!(particle.step(&mut transform).is_none());
        assert!(transform.translation.x > 0.8);
        assert!((particle.velocity.y - 0.11).abs() < 1e-5);
    }

    #[test]
    fn particle_swells_then_shrinks() {
        let mut particle = Particle {
            velocity: Vec3::ZERO,
            gravity: 0.0,
            age: 0,
            life: 10,
            size: 1.0,
        };
        let mut transform = Transform::IDENTITY;
        particle.step(&mut transform);
        assert!((transform.scale.x - 1.2).abs() < 1e-5);
        for _ in 0..7 {
            particle.step(&mut transform);
        }
        assert!((transform.scale.x - (1.4 - 0.8 * 0.6)).abs() < 1e-5);
    }

    #[test]
    fn flash_dims_linearly_and_expires() {
        let mut flash = ImpactFlash {
            age: 0,
            life: FLASH_LIFE,
        };
        let first = flash.step().unwrap();
        assert!((first - FLASH_INTENSITY * (1.0 - 1.0 / 22.0)).abs() < 1.0);
        for _ in 0..20 {
            assert!(flash.step().is_some());
        }
        assert!(flash.step().is_none());
    }
}
