use std::cmp::Ordering;
use std::fmt;

use glam::{DQuat, DVec3};
use uuid::Uuid;

use crate::connection::{self, ItemConnection};
use crate::error::{CondoError, CondoResult};
use crate::property::{self, RespawnLocation, SpatialWrite};
use crate::record::{ItemData, PropertiesData};

/// Process-local handle for an entity.
///
/// Save GUIDs only exist on objects with an item section, so selections key on
/// this handle instead. It is never written to the save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random entity handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Generate a lowercase hyphenated GUID in the form the save uses.
pub fn new_guid() -> String {
    Uuid::new_v4().to_string()
}

/// Property-only objects that must lead the save, in this order.
const LEADING_METADATA: [&str; 3] = ["CondoWeather", "CondoSettingsManager", "Ultra_Dynamic_Sky"];

/// One object of the save, merged from its item and properties sections.
///
/// At least one of the two sections is always present. Objects without an
/// item are non-physical metadata such as weather or condo settings.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    item: Option<ItemData>,
    properties: Option<PropertiesData>,
}

impl Entity {
    /// Build an entity from its sections. Fails if both are absent.
    pub fn new(item: Option<ItemData>, properties: Option<PropertiesData>) -> CondoResult<Self> {
        if item.is_none() && properties.is_none() {
            return Err(CondoError::EmptyEntity);
        }
        Ok(Self {
            id: EntityId::new(),
            item,
            properties,
        })
    }

    /// An object that exists in the world but has no configurable behaviour.
    pub fn from_item(item: ItemData) -> Self {
        Self {
            id: EntityId::new(),
            item: Some(item),
            properties: None,
        }
    }

    /// A non-physical metadata object.
    pub fn from_properties(properties: PropertiesData) -> Self {
        Self {
            id: EntityId::new(),
            item: None,
            properties: Some(properties),
        }
    }

    /// A placed object together with its behaviour configuration.
    pub fn paired(item: ItemData, properties: PropertiesData) -> Self {
        Self {
            id: EntityId::new(),
            item: Some(item),
            properties: Some(properties),
        }
    }

    /// The process-local handle of this entity.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The item section, if this object exists in the world.
    pub fn item(&self) -> Option<&ItemData> {
        self.item.as_ref()
    }

    /// The properties section, if this object has configurable behaviour.
    pub fn properties(&self) -> Option<&PropertiesData> {
        self.properties.as_ref()
    }

    /// Mutable access to the raw item section.
    ///
    /// Writing transforms through this bypasses mirroring; prefer the
    /// `set_position`/`set_rotation`/`set_scale` accessors.
    pub fn item_mut(&mut self) -> Option<&mut ItemData> {
        self.item.as_mut()
    }

    /// Mutable access to the raw properties section.
    pub fn properties_mut(&mut self) -> Option<&mut PropertiesData> {
        self.properties.as_mut()
    }

    /// Consume the entity, returning its sections.
    pub fn into_parts(self) -> (Option<ItemData>, Option<PropertiesData>) {
        (self.item, self.properties)
    }

    /// Item type name, or the properties name for metadata objects.
    pub fn name(&self) -> &str {
        match (&self.item, &self.properties) {
            (Some(item), _) => &item.name,
            (None, Some(props)) => &props.name,
            (None, None) => "",
        }
    }

    /// The user-assigned display name, or `""` when none is set.
    pub fn custom_name(&self) -> &str {
        self.item
            .as_ref()
            .and_then(|item| property::read_name(&item.properties, property::ITEM_CUSTOM_NAME))
            .unwrap_or("")
    }

    /// Case-insensitive match against the proper name or the custom name.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.name().to_lowercase() == name || self.custom_name().to_lowercase() == name
    }

    /// The save GUID, only present on objects with an item.
    pub fn guid(&self) -> Option<&str> {
        self.item.as_ref().map(|item| item.guid.as_str())
    }

    /// Whether this is a paintable canvas object.
    pub fn is_canvas(&self) -> bool {
        let Some(item) = &self.item else {
            return false;
        };
        item.name.starts_with("Canvas")
            || item.properties.contains_key("SurfaceMaterial")
            || item.properties.contains_key("URL")
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// The group tag, or `None` when ungrouped.
    pub fn group_id(&self) -> Option<i32> {
        let item = self.item.as_ref()?;
        let id = property::read_int(&item.properties, property::GROUP_ID)?;
        i32::try_from(id).ok().filter(|id| *id >= 0)
    }

    /// Tag this object with a group, mirroring into the properties section.
    pub fn set_group_id(&mut self, group_id: i32) {
        let Some(item) = self.item.as_mut() else {
            tracing::warn!(name = self.name(), "cannot group a properties-only object");
            return;
        };
        property::write_int(&mut item.properties, property::GROUP_ID, group_id.into());
        if let Some(props) = self.properties.as_mut() {
            property::write_int(&mut props.properties, property::GROUP_ID, group_id.into());
        }
    }

    /// Remove the group tag from both sections.
    pub fn ungroup(&mut self) {
        if let Some(item) = self.item.as_mut() {
            item.properties.shift_remove(property::GROUP_ID);
        }
        if let Some(props) = self.properties.as_mut() {
            props.properties.shift_remove(property::GROUP_ID);
        }
    }

    /// Deep copy with a fresh GUID and a fresh handle.
    pub fn copy(&self) -> Self {
        let mut copied = self.clone();
        copied.id = EntityId::new();
        if let Some(item) = copied.item.as_mut() {
            item.guid = new_guid();
        }
        copied
    }

    // -----------------------------------------------------------------------
    // Transforms
    // -----------------------------------------------------------------------

    /// World position.
    pub fn position(&self) -> Option<DVec3> {
        self.item.as_ref().map(|item| item.position.into())
    }

    /// World rotation.
    pub fn rotation(&self) -> Option<DQuat> {
        self.item.as_ref().map(|item| item.rotation.into())
    }

    /// Local scale.
    pub fn scale(&self) -> Option<DVec3> {
        self.item.as_ref().map(|item| item.scale.into())
    }

    /// Move the object. Also moves its respawn location, if it has one.
    pub fn set_position(&mut self, position: DVec3) {
        self.apply(SpatialWrite::position(position));
    }

    /// Rotate the object. Also rotates its respawn location, if it has one.
    pub fn set_rotation(&mut self, rotation: DQuat) {
        self.apply(SpatialWrite::rotation(rotation));
    }

    /// Rescale the object, along with its world scale and respawn scale.
    pub fn set_scale(&mut self, scale: DVec3) {
        self.apply(SpatialWrite::scale(scale));
    }

    /// Apply a transform write. A no-op with a warning on properties-only objects.
    pub fn apply(&mut self, write: SpatialWrite) {
        match self.item.as_mut() {
            Some(item) => write.apply(item, self.properties.as_mut()),
            None => tracing::warn!(
                name = self.name(),
                field = ?write.field(),
                "ignoring transform write on a properties-only object"
            ),
        }
    }

    /// The respawn transform, for spawn-capable objects.
    pub fn respawn_location(&self) -> Option<RespawnLocation> {
        RespawnLocation::from_properties(&self.properties.as_ref()?.properties)
    }

    /// The `WorldScale` vector from the properties section.
    pub fn world_scale(&self) -> Option<DVec3> {
        property::world_scale(&self.properties.as_ref()?.properties)
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    fn item_for(&mut self, operation: &'static str) -> CondoResult<&mut ItemData> {
        let properties = &self.properties;
        self.item.as_mut().ok_or_else(|| CondoError::MissingItem {
            name: properties
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            operation,
        })
    }

    fn mirror_connections(&mut self) {
        let (Some(item), Some(props)) = (self.item.as_ref(), self.properties.as_mut()) else {
            return;
        };
        if let Some(container) = item.properties.get(property::ITEM_CONNECTIONS) {
            props
                .properties
                .insert(property::ITEM_CONNECTIONS.to_string(), container.clone());
        }
    }

    /// Append a logic connection.
    pub fn add_connection(&mut self, connection: ItemConnection) -> CondoResult<()> {
        let item = self.item_for("add a connection")?;
        connection::ensure_elements(&mut item.properties)?.push(connection.to_value());
        self.mirror_connections();
        Ok(())
    }

    /// All logic connections. Creates an empty container if none exists yet.
    pub fn connections(&mut self) -> CondoResult<Vec<ItemConnection>> {
        let item = self.item_for("read connections")?;
        connection::decode_all(connection::ensure_elements(&mut item.properties)?)
    }

    /// Replace every logic connection.
    pub fn set_connections(&mut self, connections: &[ItemConnection]) -> CondoResult<()> {
        let item = self.item_for("set connections")?;
        *connection::ensure_elements(&mut item.properties)? =
            connections.iter().map(ItemConnection::to_value).collect();
        self.mirror_connections();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Save ordering
    // -----------------------------------------------------------------------

    fn metadata_rank(&self) -> usize {
        let name = self.name();
        LEADING_METADATA
            .iter()
            .position(|prefix| name.starts_with(prefix))
            .unwrap_or(LEADING_METADATA.len())
    }

    /// The order objects are written in on save.
    ///
    /// Metadata objects come first, led by weather, settings, and sky in that
    /// order, then by name. Items follow, sorted by item name. The game relies
    /// on this layout.
    pub fn save_order(&self, other: &Self) -> Ordering {
        match (&self.item, &other.item) {
            (None, None) => self
                .metadata_rank()
                .cmp(&other.metadata_rank())
                .then_with(|| self.name().cmp(other.name())),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.name.cmp(&b.name),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        let custom = self.custom_name();
        if !custom.is_empty() {
            write!(f, " \"{custom}\"")?;
        }
        if let Some(guid) = self.guid() {
            write!(f, " [{guid}]")?;
        }
        Ok(())
    }
}
