//! The built-in sun / planet / moon variants, expressed as data.

use orrery_materials::{ChannelFlags, DEFAULT_DISPLACEMENT_SCALE, rgba_from_hex};

use crate::body::Geometry;
use crate::definition::{BodyDef, MaterialDef, SceneDef};
use crate::orbit::OrbitParams;

/// Orbit radius of the planet around the sun. Only its magnitude matters.
pub const PLANET_ORBIT_RADIUS: f32 = std::f32::consts::PI;

/// Orbit radius of the moon around the planet.
pub const MOON_ORBIT_RADIUS: f32 = 1.0;

/// Z amplitude of the moon in [`inclined_moon`].
pub const MOON_ORBIT_DEPTH: f32 = 0.5;

pub const SUN_SPIN_RATE: f32 = 0.1;
pub const PLANET_SPIN_RATE: f32 = 2.0;
pub const MOON_SPIN_RATE: f32 = 10.0;

/// Flat-colored cubes: red sun, green planet, blue moon. No textures, no spin.
pub fn simple_cubes() -> SceneDef {
    let solid = |hex| MaterialDef {
        base_color: rgba_from_hex(hex),
        ..Default::default()
    };

    SceneDef {
        bodies: vec![
            BodyDef {
                name: "sun".into(),
                parent: None,
                geometry: Geometry::Cube { size: 1.0 },
                position: [0.0, 0.0, 0.0],
                orbit: None,
                spin_rate: 0.0,
                material: solid(0xff0000),
            },
            BodyDef {
                name: "planet".into(),
                parent: Some("sun".into()),
                geometry: Geometry::Cube { size: 0.5 },
                position: [2.0, 0.0, 0.0],
                orbit: Some(OrbitParams::circular(PLANET_ORBIT_RADIUS, 1.0)),
                spin_rate: 0.0,
                material: solid(0x00ff00),
            },
            BodyDef {
                name: "moon".into(),
                parent: Some("planet".into()),
                geometry: Geometry::Cube { size: 0.2 },
                position: [1.0, 0.0, 0.0],
                orbit: Some(OrbitParams::circular(MOON_ORBIT_RADIUS, 2.0)),
                spin_rate: 0.0,
                material: solid(0x0000ff),
            },
        ],
    }
}

fn textured(dir: &str, channels: ChannelFlags) -> MaterialDef {
    MaterialDef {
        channels,
        texture_dir: Some(dir.to_string()),
        ..Default::default()
    }
}

/// Spheres with the standard channel set, each spinning.
pub fn textured_spheres() -> SceneDef {
    textured_spheres_with(ChannelFlags::standard())
}

fn textured_spheres_with(channels: ChannelFlags) -> SceneDef {
    SceneDef {
        bodies: vec![
            BodyDef {
                name: "sun".into(),
                parent: None,
                geometry: Geometry::Sphere { radius: 1.0 },
                position: [0.0, 0.0, 0.0],
                orbit: None,
                spin_rate: SUN_SPIN_RATE,
                material: textured("sun", channels),
            },
            BodyDef {
                name: "planet".into(),
                parent: Some("sun".into()),
                geometry: Geometry::Sphere { radius: 0.5 },
                position: [2.0, 0.0, 0.0],
                orbit: Some(OrbitParams::circular(PLANET_ORBIT_RADIUS, 1.0)),
                spin_rate: PLANET_SPIN_RATE,
                material: textured("planet", channels),
            },
            BodyDef {
                name: "moon".into(),
                parent: Some("planet".into()),
                geometry: Geometry::Sphere { radius: 0.2 },
                position: [1.0, 0.0, 0.0],
                orbit: Some(OrbitParams::circular(MOON_ORBIT_RADIUS, 2.0)),
                spin_rate: MOON_SPIN_RATE,
                material: textured("moon", channels),
            },
        ],
    }
}

/// Every channel enabled, with a displacement scale per body.
pub fn fully_mapped() -> SceneDef {
    let mut def = textured_spheres_with(ChannelFlags::all());
    for body in &mut def.bodies {
        match body.name.as_str() {
            "sun" => {
                body.material.tint = Some([1.0, 0.85, 0.6, 1.0]);
                body.material.displacement_scale = 0.05;
            }
            "moon" => body.material.displacement_scale = 0.02,
            _ => body.material.displacement_scale = DEFAULT_DISPLACEMENT_SCALE,
        }
    }
    def
}

/// [`textured_spheres`] with the moon also moving along Z.
pub fn inclined_moon() -> SceneDef {
    let mut def = textured_spheres();
    if let Some(orbit) = def
        .bodies
        .iter_mut()
        .find(|body| body.name == "moon")
        .and_then(|moon| moon.orbit.as_mut())
    {
        orbit.radius_z = Some(MOON_ORBIT_DEPTH);
    }
    def
}
