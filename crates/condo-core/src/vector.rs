//! Serialized vector and quaternion records.
//!
//! The converter writes transforms as `{x, y, z}` and `{x, y, z, w}` objects.
//! These records keep that shape on the wire and convert to `glam` types for
//! arithmetic.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// A 3-component vector as stored in the save (`{x, y, z}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector3 {
    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A vector with every component set to one (the default item scale).
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
}

impl From<DVec3> for Vector3 {
    fn from(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector3> for DVec3 {
    fn from(v: Vector3) -> Self {
        DVec3::new(v.x, v.y, v.z)
    }
}

/// A rotation quaternion as stored in the save (`{x, y, z, w}`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
    /// W (scalar) component.
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        DQuat::IDENTITY.into()
    }
}

impl From<DQuat> for Quaternion {
    fn from(q: DQuat) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

impl From<Quaternion> for DQuat {
    fn from(q: Quaternion) -> Self {
        DQuat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

/// Parse `x,y,z` into a vector. Whitespace around components is ignored.
pub fn parse_xyz(s: &str) -> Option<DVec3> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [x, y, z] => Some(DVec3::new(*x, *y, *z)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_serializes_as_xyz_object() {
        let v = Vector3::new(1.0, -2.5, 3.0);
        let json = serde_json::to_value(v).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1.0, "y": -2.5, "z": 3.0}));
    }

    #[test]
    fn quaternion_default_is_identity() {
        let q = Quaternion::default();
        assert_eq!(q.w, 1.0);
        assert_eq!((q.x, q.y, q.z), (0.0, 0.0, 0.0));
    }

    #[test]
    fn glam_conversion_preserves_components() {
        let q = Quaternion {
            x: 0.1,
            y: 0.2,
            z: 0.3,
            w: 0.9,
        };
        let back: Quaternion = DQuat::from(q).into();
        assert_eq!(back, q);
    }

    #[test]
    fn parse_xyz_accepts_spaces() {
        assert_eq!(parse_xyz("1, 2,3"), Some(DVec3::new(1.0, 2.0, 3.0)));
        assert_eq!(parse_xyz("1,2"), None);
        assert_eq!(parse_xyz("a,b,c"), None);
    }
}
