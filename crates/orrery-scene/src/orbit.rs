//! Closed-form parametric orbits.
//!
//! Positions are pure functions of elapsed time: there is no integration step
//! and no velocity state, so evaluating the same `t` twice yields the same
//! bits.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Constants of a body's motion around its parent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitParams {
    /// Half-extent along X.
    pub radius_x: f32,
    /// Half-extent along Y.
    pub radius_y: f32,
    /// Half-extent along Z. `None` keeps the body in the `z = 0` plane.
    #[serde(default)]
    pub radius_z: Option<f32>,
    /// Radians per second.
    pub angular_speed: f32,
    /// Angle at `t = 0`, in radians.
    #[serde(default)]
    pub phase: f32,
}

impl OrbitParams {
    /// A planar orbit with equal X/Y radii and zero phase.
    pub fn circular(radius: f32, angular_speed: f32) -> Self {
        Self {
            radius_x: radius,
            radius_y: radius,
            radius_z: None,
            angular_speed,
            phase: 0.0,
        }
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    /// Make the orbit three-dimensional.
    pub fn with_depth(mut self, radius_z: f32) -> Self {
        self.radius_z = Some(radius_z);
        self
    }

    pub fn is_three_dimensional(&self) -> bool {
        self.radius_z.is_some()
    }

    /// Name of the first non-finite parameter, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        [
            ("radius_x", self.radius_x),
            ("radius_y", self.radius_y),
            ("radius_z", self.radius_z.unwrap_or(0.0)),
            ("angular_speed", self.angular_speed),
            ("phase", self.phase),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }
}

/// Transform produced for one body at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitSample {
    pub position: Vec3,
    /// Rotation about +Y in radians.
    pub y_rotation: f32,
}

/// Position of an orbiting body at time `t` given its parent's position at `t`.
///
/// ```text
/// x = cos(t·ω + φ)·rx + parent.x
/// y = sin(t·ω + φ)·ry + parent.y
/// z = sin(t·ω)·rz + parent.z   (three-dimensional)
/// z = 0                        (planar)
/// ```
pub fn evaluate(t: f64, parent_position: Vec3, params: &OrbitParams) -> Vec3 {
    let omega_t = t * f64::from(params.angular_speed);
    let angle = omega_t + f64::from(params.phase);

    let x = angle.cos() * f64::from(params.radius_x) + f64::from(parent_position.x);
    let y = angle.sin() * f64::from(params.radius_y) + f64::from(parent_position.y);
    let z = match params.radius_z {
        Some(radius_z) => omega_t.sin() * f64::from(radius_z) + f64::from(parent_position.z),
        None => 0.0,
    };

    Vec3::new(x as f32, y as f32, z as f32)
}

/// Self-rotation about +Y after `t` seconds.
pub fn spin(t: f64, spin_rate: f32) -> f32 {
    (t * f64::from(spin_rate)) as f32
}

/// Full sample for a body: roots stay at `anchor`, children follow `orbit`
/// around `parent_position`.
pub fn sample(
    t: f64,
    anchor: Vec3,
    parent_position: Option<Vec3>,
    orbit: Option<&OrbitParams>,
    spin_rate: f32,
) -> OrbitSample {
    let position = match (parent_position, orbit) {
        (Some(parent), Some(orbit)) => evaluate(t, parent, orbit),
        _ => anchor,
    };
    OrbitSample {
        position,
        y_rotation: spin(t, spin_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f32 = 1e-5;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPS
    }

    #[test]
    fn test_circle_at_zero_and_quarter_turn() {
        let params = OrbitParams::circular(5.0, 1.0);
        let start = evaluate(0.0, Vec3::ZERO, &params);
        assert!(close(start, Vec3::new(5.0, 0.0, 0.0)));
        let quarter = evaluate(FRAC_PI_2, Vec3::ZERO, &params);
        assert!(close(quarter, Vec3::new(0.0, 5.0, 0.0)), "{quarter}");
    }

    #[test]
    fn test_offset_by_parent() {
        let params = OrbitParams::circular(1.0, 2.0);
        let parent = Vec3::new(5.0, -1.0, 0.0);
        let pos = evaluate(0.0, parent, &params);
        assert!(close(pos, Vec3::new(6.0, -1.0, 0.0)));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let params = OrbitParams {
            radius_x: 3.0,
            radius_y: 1.5,
            radius_z: Some(0.7),
            angular_speed: 1.3,
            phase: 0.4,
        };
        let parent = Vec3::new(0.25, 0.5, -2.0);
        for i in 0..100 {
            let t = f64::from(i) * 0.731;
            let a = evaluate(t, parent, &params);
            let b = evaluate(t, parent, &params);
            let (a, b) = (a.to_array(), b.to_array());
            assert_eq!(a.map(f32::to_bits), b.map(f32::to_bits));
        }
    }

    #[test]
    fn test_phase_shifts_start() {
        let params = OrbitParams::circular(2.0, 1.0).with_phase(PI as f32);
        let start = evaluate(0.0, Vec3::ZERO, &params);
        assert!(close(start, Vec3::new(-2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_elliptical_radii() {
        let params = OrbitParams {
            radius_x: 4.0,
            radius_y: 1.0,
            ..OrbitParams::circular(0.0, 1.0)
        };
        let quarter = evaluate(FRAC_PI_2, Vec3::ZERO, &params);
        assert!(close(quarter, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_planar_orbit_holds_z_at_zero() {
        let params = OrbitParams::circular(1.0, 1.0);
        let pos = evaluate(1.0, Vec3::new(0.0, 0.0, 3.0), &params);
        assert_eq!(pos.z, 0.0);
    }

    #[test]
    fn test_depth_ignores_phase() {
        let params = OrbitParams::circular(1.0, 1.0)
            .with_phase(1.0)
            .with_depth(2.0);
        let parent = Vec3::new(0.0, 0.0, 1.0);
        let start = evaluate(0.0, parent, &params);
        let expected = Vec3::new(1.0f32.cos(), 1.0f32.sin(), 1.0);
        assert!(close(start, expected));
        let pos = evaluate(FRAC_PI_2, parent, &params);
        assert!((pos.z - 3.0).abs() < EPS);
    }

    #[test]
    fn test_root_sample_stays_at_anchor() {
        let anchor = Vec3::new(1.0, 2.0, 3.0);
        for t in [0.0, 1.0, 100.0] {
            let s = sample(t, anchor, None, None, 0.1);
            assert_eq!(s.position, anchor);
            assert!((s.y_rotation - (t * 0.1) as f32).abs() < EPS);
        }
    }

    #[test]
    fn test_non_finite_detection() {
        assert_eq!(OrbitParams::circular(1.0, 1.0).first_non_finite(), None);
        let bad = OrbitParams::circular(1.0, f32::NAN);
        assert_eq!(bad.first_non_finite(), Some("angular_speed"));
        let bad_depth = OrbitParams::circular(1.0, 1.0).with_depth(f32::INFINITY);
        assert_eq!(bad_depth.first_non_finite(), Some("radius_z"));
    }
}
