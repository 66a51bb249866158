//! Built-in transforms over a selection of objects.
//!
//! Tools take the save and the handles of the objects to move. Every write
//! goes through the entity accessors, so mirrored fields stay in sync.

use glam::{DQuat, DVec3, EulerRot};

use crate::entity::EntityId;
use crate::error::CondoResult;
use crate::suitebro::Suitebro;

/// Move the objects so their centroid lands on `offset`.
pub fn center(save: &mut Suitebro, ids: &[EntityId], offset: DVec3) -> CondoResult<()> {
    let centroid = save.select(ids).centroid()?;
    for id in ids {
        let Some(obj) = save.get_mut(*id) else {
            continue;
        };
        if let Some(pos) = obj.position() {
            obj.set_position(pos - centroid + offset);
        }
    }
    Ok(())
}

/// The world-space rotation for extrinsic X, then Y, then Z Euler angles in degrees.
pub fn euler_rotation(degrees: DVec3) -> DQuat {
    DQuat::from_euler(
        EulerRot::ZYX,
        degrees.z.to_radians(),
        degrees.y.to_radians(),
        degrees.x.to_radians(),
    )
}

/// Rotate the objects in world space.
///
/// Positions turn around the selection centroid, or around the world origin
/// when `about_centroid` is false.
pub fn rotate(
    save: &mut Suitebro,
    ids: &[EntityId],
    euler_degrees: DVec3,
    about_centroid: bool,
) -> CondoResult<()> {
    let pivot = if about_centroid {
        save.select(ids).centroid()?
    } else {
        DVec3::ZERO
    };
    let turn = euler_rotation(euler_degrees);

    for id in ids {
        let Some(obj) = save.get_mut(*id) else {
            continue;
        };
        if let Some(rotation) = obj.rotation() {
            obj.set_rotation(turn * rotation);
        }
        if let Some(pos) = obj.position() {
            obj.set_position(turn * (pos - pivot) + pivot);
        }
    }
    Ok(())
}
