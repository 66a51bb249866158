//! Property-based tests for the selection algebra and the save round trip.

use std::collections::{BTreeMap, HashMap};

use condo_core::entity::new_guid;
use condo_core::{Entity, ItemData, PropertiesData, Selection, Selector, Suitebro};
use glam::DVec3;
use proptest::collection::vec;
use proptest::prelude::*;
use serde_json::Map;

const NAMES: [&str; 4] = ["Chair", "Lamp", "CanvasWedge", "Relay"];
/// Item types that always carry a properties section.
const PAIRED: [&str; 2] = ["Chair", "Lamp"];

fn grid_entity(x: i32, y: i32) -> Entity {
    let mut item = ItemData::new("Chair", new_guid());
    item.position = DVec3::new(f64::from(x), f64::from(y), 0.0).into();
    Entity::from_item(item)
}

fn subset<'a>(objs: &'a [Entity], mask: &[bool]) -> Selection<'a> {
    objs.iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(e, _)| e)
        .collect()
}

fn build_save(layout: &[(usize, i32)]) -> Suitebro {
    let mut save = Suitebro::default();
    save.add_object(Entity::from_properties(PropertiesData::new(
        "CondoWeather_C_0",
    )));
    for (i, (name, group)) in layout.iter().enumerate() {
        let name = NAMES[*name];
        let item = ItemData::new(name, new_guid());
        let mut obj = if PAIRED.contains(&name) {
            Entity::paired(item, PropertiesData::new(format!("{name}_C_{}", 99 - i)))
        } else {
            Entity::from_item(item)
        };
        if *group >= 0 {
            obj.set_group_id(*group);
        }
        save.add_object(obj);
    }
    save
}

// =============================================================================
// SELECTION ALGEBRA
// =============================================================================

proptest! {
    /// Union is commutative.
    #[test]
    fn union_commutes(masks in vec((any::<bool>(), any::<bool>()), 0..30)) {
        let objs: Vec<Entity> = masks.iter().map(|_| grid_entity(0, 0)).collect();
        let (a, b): (Vec<bool>, Vec<bool>) = masks.into_iter().unzip();
        let x = subset(&objs, &a);
        let y = subset(&objs, &b);
        prop_assert_eq!(x.clone() + y.clone(), y + x);
    }

    /// An intersection is contained in both operands.
    #[test]
    fn intersection_is_subset(masks in vec((any::<bool>(), any::<bool>()), 0..30)) {
        let objs: Vec<Entity> = masks.iter().map(|_| grid_entity(0, 0)).collect();
        let (a, b): (Vec<bool>, Vec<bool>) = masks.into_iter().unzip();
        let x = subset(&objs, &a);
        let y = subset(&objs, &b);
        let both = x.clone() * y.clone();
        prop_assert!(both.is_subset(&x));
        prop_assert!(both.is_subset(&y));
    }

    /// Adding the empty selection changes nothing.
    #[test]
    fn nothing_is_union_identity(mask in vec(any::<bool>(), 0..30)) {
        let objs: Vec<Entity> = mask.iter().map(|_| grid_entity(0, 0)).collect();
        let x = subset(&objs, &mask);
        let none = Selector::Nothing.select(&x).unwrap();
        prop_assert_eq!(x.clone() + none, x);
    }

    /// A degenerate box selects exactly the objects at that point.
    #[test]
    fn point_box_selects_exact_position(
        cells in vec((0i32..3, 0i32..3), 1..25),
        px in 0i32..3,
        py in 0i32..3,
    ) {
        let objs: Vec<Entity> = cells.iter().map(|(x, y)| grid_entity(*x, *y)).collect();
        let all: Selection = objs.iter().collect();
        let p = DVec3::new(f64::from(px), f64::from(py), 0.0);

        let hits = Selector::bounding_box(p, p).select(&all).unwrap();
        for obj in &objs {
            prop_assert_eq!(hits.contains(obj.id()), obj.position() == Some(p));
        }
    }

    /// Sampling never invents members and respects the requested size.
    #[test]
    fn take_is_bounded_subset(n in 0usize..40, size in 0usize..30) {
        let objs: Vec<Entity> = (0..size).map(|_| grid_entity(0, 0)).collect();
        let all: Selection = objs.iter().collect();
        let taken = Selector::Take(n).select(&all).unwrap();
        prop_assert_eq!(taken.len(), n.min(size));
        prop_assert!(taken.is_subset(&all));
    }
}

// =============================================================================
// ROUND TRIP
// =============================================================================

proptest! {
    /// Splitting and reloading keeps every object and its content.
    #[test]
    fn split_then_reload_preserves_objects(
        layout in vec((0usize..NAMES.len(), -1i32..4), 0..20)
    ) {
        let mut save = build_save(&layout);
        let doc = save.to_json().unwrap();
        let reloaded = Suitebro::from_json(doc).unwrap();

        let key = |e: &Entity| (e.name().to_string(), e.guid().map(str::to_string));
        let mut before: Vec<_> = save.iter().map(key).collect();
        let mut after: Vec<_> = reloaded.iter().map(key).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);

        let by_guid: HashMap<_, _> = save.iter().filter_map(|e| Some((e.guid()?, e))).collect();
        for obj in reloaded.iter() {
            if let Some(guid) = obj.guid() {
                let original = by_guid[guid];
                prop_assert_eq!(obj.item(), original.item());
                prop_assert_eq!(obj.properties(), original.properties());
                prop_assert_eq!(obj.group_id(), original.group_id());
            }
        }
    }

    /// Paired properties names are numbered 0..n per root after splitting.
    #[test]
    fn renaming_is_contiguous(
        layout in vec((0usize..NAMES.len(), -1i32..4), 0..20)
    ) {
        let mut save = build_save(&layout);
        let split = save.split();

        let mut seen: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for props in split.properties.iter().skip(1) {
            let (root, index) = props.name.rsplit_once('_').unwrap();
            seen.entry(root.to_string()).or_default().push(index.parse().unwrap());
        }
        for indices in seen.values() {
            let expected: Vec<usize> = (0..indices.len()).collect();
            prop_assert_eq!(indices, &expected);
        }
    }

    /// Group metadata matches the live group tags.
    #[test]
    fn groups_meta_reflects_tags(
        layout in vec((0usize..NAMES.len(), -1i32..4), 0..20)
    ) {
        let mut save = build_save(&layout);
        save.update_groups_meta();

        let mut expected: BTreeMap<i32, usize> = BTreeMap::new();
        for (_, group) in &layout {
            if *group >= 0 {
                *expected.entry(*group).or_default() += 1;
            }
        }
        let actual: BTreeMap<i32, usize> = save
            .groups_meta()
            .unwrap()
            .into_iter()
            .map(|g| (g.group_id, g.item_count))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn empty_save_round_trips() {
    let mut save = Suitebro::new(Map::new());
    let doc = save.to_json().unwrap();
    assert!(Suitebro::from_json(doc).unwrap().is_empty());
}
