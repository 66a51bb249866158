//! Typed access to the tagged property envelopes inside item and properties
//! sections, and the mirrored transform writes that keep them in sync.

use glam::{DQuat, DVec3};
use serde_json::{Value, json};

use crate::record::{ItemData, PropertiesData, PropertyMap};

/// Property key holding the group tag.
pub const GROUP_ID: &str = "GroupID";
/// Property key holding the user-assigned display name.
pub const ITEM_CUSTOM_NAME: &str = "ItemCustomName";
/// Property key holding the world scale vector of spawn-capable objects.
pub const WORLD_SCALE: &str = "WorldScale";
/// Property key holding the respawn transform.
pub const RESPAWN_LOCATION: &str = "RespawnLocation";
/// Property key holding the logic connection array.
pub const ITEM_CONNECTIONS: &str = "ItemConnections";

const WORLD_SCALE_VECTOR: &str = "/Struct/value/Vector";
const RESPAWN_TRANSLATION: &str = "/Struct/value/Struct/Translation/Struct/value/Vector";
const RESPAWN_ROTATION: &str = "/Struct/value/Struct/Rotation/Struct/value/Quat";
const RESPAWN_SCALE: &str = "/Struct/value/Struct/Scale3D/Struct/value/Vector";

/// Read a `{"Int": {"value": n}}` envelope.
pub fn read_int(props: &PropertyMap, key: &str) -> Option<i64> {
    props.get(key)?.pointer("/Int/value")?.as_i64()
}

/// Write a `{"Int": {"value": n}}` envelope, replacing any existing entry.
pub fn write_int(props: &mut PropertyMap, key: &str, value: i64) {
    props.insert(key.to_string(), json!({"Int": {"value": value}}));
}

/// Read a `{"Name": {"value": s}}` envelope.
pub fn read_name<'a>(props: &'a PropertyMap, key: &str) -> Option<&'a str> {
    props.get(key)?.pointer("/Name/value")?.as_str()
}

fn read_vector(value: &Value) -> Option<DVec3> {
    Some(DVec3::new(
        value.get("x")?.as_f64()?,
        value.get("y")?.as_f64()?,
        value.get("z")?.as_f64()?,
    ))
}

fn read_quat(value: &Value) -> Option<DQuat> {
    Some(DQuat::from_xyzw(
        value.get("x")?.as_f64()?,
        value.get("y")?.as_f64()?,
        value.get("z")?.as_f64()?,
        value.get("w")?.as_f64()?,
    ))
}

/// Read the `WorldScale` vector, if present and well formed.
pub fn world_scale(props: &PropertyMap) -> Option<DVec3> {
    read_vector(props.get(WORLD_SCALE)?.pointer(WORLD_SCALE_VECTOR)?)
}

/// The respawn transform carried by spawn-capable objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespawnLocation {
    /// Respawn translation.
    pub translation: DVec3,
    /// Respawn rotation.
    pub rotation: DQuat,
    /// Respawn 3-D scale.
    pub scale: DVec3,
}

impl RespawnLocation {
    /// Decode the `RespawnLocation` envelope from a property map.
    pub fn from_properties(props: &PropertyMap) -> Option<Self> {
        let raw = props.get(RESPAWN_LOCATION)?;
        Some(Self {
            translation: read_vector(raw.pointer(RESPAWN_TRANSLATION)?)?,
            rotation: read_quat(raw.pointer(RESPAWN_ROTATION)?)?,
            scale: read_vector(raw.pointer(RESPAWN_SCALE)?)?,
        })
    }
}

/// Which transform field a [`SpatialWrite`] targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialField {
    /// `item.position`.
    Position,
    /// `item.rotation`.
    Rotation,
    /// `item.scale`.
    Scale,
}

/// A nested location in the properties section that mirrors an item field.
#[derive(Debug, Clone, Copy)]
struct MirrorTarget {
    /// Top-level property key; the whole entry is re-attached to the item.
    key: &'static str,
    /// JSON pointer from that entry to the `{x, y, z[, w]}` object.
    pointer: &'static str,
}

const POSITION_MIRRORS: &[MirrorTarget] = &[MirrorTarget {
    key: RESPAWN_LOCATION,
    pointer: RESPAWN_TRANSLATION,
}];

const ROTATION_MIRRORS: &[MirrorTarget] = &[MirrorTarget {
    key: RESPAWN_LOCATION,
    pointer: RESPAWN_ROTATION,
}];

const SCALE_MIRRORS: &[MirrorTarget] = &[
    MirrorTarget {
        key: WORLD_SCALE,
        pointer: WORLD_SCALE_VECTOR,
    },
    MirrorTarget {
        key: RESPAWN_LOCATION,
        pointer: RESPAWN_SCALE,
    },
];

impl SpatialField {
    fn mirrors(self) -> &'static [MirrorTarget] {
        match self {
            Self::Position => POSITION_MIRRORS,
            Self::Rotation => ROTATION_MIRRORS,
            Self::Scale => SCALE_MIRRORS,
        }
    }
}

/// One logical transform write, fanned out to the item field and every
/// mirror target that exists in the properties section.
#[derive(Debug, Clone, Copy)]
pub struct SpatialWrite {
    field: SpatialField,
    components: [f64; 4],
}

const COMPONENT_KEYS: [&str; 4] = ["x", "y", "z", "w"];

impl SpatialWrite {
    /// Write a new world position.
    pub fn position(v: DVec3) -> Self {
        Self {
            field: SpatialField::Position,
            components: [v.x, v.y, v.z, 0.0],
        }
    }

    /// Write a new rotation quaternion.
    pub fn rotation(q: DQuat) -> Self {
        Self {
            field: SpatialField::Rotation,
            components: [q.x, q.y, q.z, q.w],
        }
    }

    /// Write a new local scale.
    pub fn scale(v: DVec3) -> Self {
        Self {
            field: SpatialField::Scale,
            components: [v.x, v.y, v.z, 0.0],
        }
    }

    /// The field this write targets.
    pub fn field(&self) -> SpatialField {
        self.field
    }

    fn arity(&self) -> usize {
        match self.field {
            SpatialField::Rotation => 4,
            SpatialField::Position | SpatialField::Scale => 3,
        }
    }

    /// Apply the write to the item and mirror it into `properties`.
    pub fn apply(&self, item: &mut ItemData, properties: Option<&mut PropertiesData>) {
        let [x, y, z, w] = self.components;
        match self.field {
            SpatialField::Position => item.position = DVec3::new(x, y, z).into(),
            SpatialField::Rotation => item.rotation = DQuat::from_xyzw(x, y, z, w).into(),
            SpatialField::Scale => item.scale = DVec3::new(x, y, z).into(),
        }

        let Some(properties) = properties else {
            return;
        };
        for target in self.field.mirrors() {
            let Some(entry) = properties.properties.get_mut(target.key) else {
                continue;
            };
            match entry.pointer_mut(target.pointer).and_then(Value::as_object_mut) {
                Some(slot) => {
                    for (key, value) in COMPONENT_KEYS.iter().zip(self.components).take(self.arity()) {
                        slot.insert((*key).to_string(), json!(value));
                    }
                }
                None => {
                    tracing::warn!(
                        property = target.key,
                        path = target.pointer,
                        "mirror target is malformed; skipping"
                    );
                    continue;
                }
            }
            item.properties.insert(target.key.to_string(), entry.clone());
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    /// A `RespawnLocation` envelope with the given translation.
    pub fn respawn_location(x: f64, y: f64, z: f64) -> Value {
        json!({
            "Struct": {
                "value": {
                    "Struct": {
                        "Rotation": {"Struct": {"value": {"Quat": {"x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0}}}},
                        "Translation": {"Struct": {"value": {"Vector": {"x": x, "y": y, "z": z}}}},
                        "Scale3D": {"Struct": {"value": {"Vector": {"x": 1.0, "y": 1.0, "z": 1.0}}}}
                    }
                },
                "struct_type": {"Struct": "Transform"}
            }
        })
    }

    /// A `WorldScale` envelope.
    pub fn world_scale(x: f64, y: f64, z: f64) -> Value {
        json!({"Struct": {"value": {"Vector": {"x": x, "y": y, "z": z}}, "struct_type": "Vector"}})
    }
}
