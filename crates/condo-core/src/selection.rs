//! Set-valued queries over the objects of a save.
//!
//! A [`Selection`] borrows entities from a [`Suitebro`](crate::Suitebro) and
//! supports union (`+`) and intersection (`*`). A [`Selector`] maps one
//! selection to a narrower one, so selectors chain into pipelines:
//!
//! ```
//! # use condo_core::{Suitebro, Selector};
//! # let save = Suitebro::default();
//! let chairs = Selector::ObjectName("Chair".into()).select(&save.select_all())?;
//! let half = Selector::Percent(50.0).select(&chairs)?;
//! # Ok::<(), condo_core::CondoError>(())
//! ```

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign};
use std::str::FromStr;

use glam::DVec3;
use rand::Rng;
use rand::seq::SliceRandom;
use regex::{Regex, RegexBuilder};

use crate::entity::{Entity, EntityId};
use crate::error::{CondoError, CondoResult};
use crate::vector::parse_xyz;

/// A set of borrowed entities, keyed by [`EntityId`].
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    members: BTreeMap<EntityId, &'a Entity>,
}

impl<'a> Selection<'a> {
    /// An empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of selected entities.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether the entity with `id` is selected.
    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains_key(&id)
    }

    /// Add an entity. Returns `false` if it was already selected.
    pub fn insert(&mut self, entity: &'a Entity) -> bool {
        self.members.insert(entity.id(), entity).is_none()
    }

    /// Iterate over the selected entities.
    pub fn iter(&self) -> impl Iterator<Item = &'a Entity> {
        self.members.values().copied()
    }

    /// Handles of the selected entities.
    pub fn ids(&self) -> Vec<EntityId> {
        self.members.keys().copied().collect()
    }

    /// An arbitrary member, or `None` when empty.
    pub fn first(&self) -> Option<&'a Entity> {
        self.members.values().next().copied()
    }

    /// Whether every member of `self` is also in `other`.
    pub fn is_subset(&self, other: &Selection<'_>) -> bool {
        self.members.keys().all(|id| other.members.contains_key(id))
    }

    /// Partition the grouped members by tag, in tag order.
    pub fn groups(&self) -> BTreeMap<i32, Selection<'a>> {
        let mut groups: BTreeMap<i32, Selection<'a>> = BTreeMap::new();
        for entity in self.iter() {
            if let Some(tag) = entity.group_id() {
                groups.entry(tag).or_default().insert(entity);
            }
        }
        groups
    }

    /// Members without a group tag.
    pub fn ungrouped(&self) -> Selection<'a> {
        self.iter().filter(|e| e.group_id().is_none()).collect()
    }

    /// Mean position of the members.
    pub fn centroid(&self) -> CondoResult<DVec3> {
        if self.is_empty() {
            return Err(CondoError::EmptySelection);
        }
        let mut sum = DVec3::ZERO;
        for entity in self.iter() {
            sum += position_of(entity)?;
        }
        Ok(sum / self.len() as f64)
    }
}

impl PartialEq for Selection<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.members.keys().eq(other.members.keys())
    }
}

impl Eq for Selection<'_> {}

impl<'a> FromIterator<&'a Entity> for Selection<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Entity>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().map(|e| (e.id(), e)).collect(),
        }
    }
}

impl<'a> IntoIterator for Selection<'a> {
    type Item = &'a Entity;
    type IntoIter = btree_map::IntoValues<EntityId, &'a Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_values()
    }
}

impl<'a> Add for Selection<'a> {
    type Output = Selection<'a>;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign for Selection<'_> {
    fn add_assign(&mut self, rhs: Self) {
        self.members.extend(rhs.members);
    }
}

impl<'a> Mul for Selection<'a> {
    type Output = Selection<'a>;

    fn mul(mut self, rhs: Self) -> Self::Output {
        self *= rhs;
        self
    }
}

impl MulAssign for Selection<'_> {
    fn mul_assign(&mut self, rhs: Self) {
        self.members.retain(|id, _| rhs.members.contains_key(id));
    }
}

fn position_of(entity: &Entity) -> CondoResult<DVec3> {
    entity
        .position()
        .ok_or_else(|| CondoError::MissingPosition(entity.name().to_string()))
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// A pure mapping from one selection to a subset of it.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Proper or custom name equals the given name, ignoring case.
    Name(String),
    /// Custom name equals the given name, ignoring case.
    CustomName(String),
    /// Proper name equals the given name, ignoring case.
    ObjectName(String),
    /// Proper or custom name starts with a match of the pattern, ignoring case.
    /// Build with [`Selector::regex`].
    Regex {
        /// The pattern as written.
        pattern: String,
        /// The anchored, case-insensitive compiled form.
        compiled: Regex,
    },
    /// Group tag equals the given tag.
    Group(i32),
    /// Entities placed in the world.
    Item,
    /// The whole input.
    Everything,
    /// Nothing.
    Nothing,
    /// A uniform random sample of the given percentage, rounded half up.
    Percent(f64),
    /// A uniform random sample of N entities, or all of them if fewer.
    Take(usize),
    /// Keep each entity independently with the given probability.
    Random(f64),
    /// Position inside the box, bounds inclusive. Build with [`Selector::bounding_box`].
    Box {
        /// Lower corner.
        min: DVec3,
        /// Upper corner.
        max: DVec3,
    },
    /// Position strictly inside the sphere.
    Sphere {
        /// Sphere center.
        center: DVec3,
        /// Sphere radius.
        radius: f64,
    },
}

impl Selector {
    /// A prefix-matching, case-insensitive regex selector.
    pub fn regex(pattern: &str) -> CondoResult<Self> {
        let anchored = format!("^(?:{pattern})");
        RegexBuilder::new(&anchored)
            .case_insensitive(true)
            .build()
            .map(|compiled| Self::Regex {
                pattern: pattern.to_string(),
                compiled,
            })
            .map_err(|e| CondoError::InvalidSelector(e.to_string()))
    }

    /// A box selector spanning two arbitrary corners.
    pub fn bounding_box(corner_a: DVec3, corner_b: DVec3) -> Self {
        Self::Box {
            min: corner_a.min(corner_b),
            max: corner_a.max(corner_b),
        }
    }

    /// A sphere selector.
    pub fn sphere(center: DVec3, radius: f64) -> Self {
        Self::Sphere { center, radius }
    }

    /// Apply the selector, sampling from the thread RNG where needed.
    pub fn select<'a>(&self, input: &Selection<'a>) -> CondoResult<Selection<'a>> {
        self.select_with_rng(input, &mut rand::rng())
    }

    /// Apply the selector, sampling from `rng` where needed.
    ///
    /// Spatial selectors fail with [`CondoError::MissingPosition`] if the
    /// input holds a properties-only entity.
    pub fn select_with_rng<'a, R: Rng + ?Sized>(
        &self,
        input: &Selection<'a>,
        rng: &mut R,
    ) -> CondoResult<Selection<'a>> {
        let selected = match self {
            Self::Name(name) => filter(input, |e| e.matches_name(name)),
            Self::CustomName(name) => {
                let name = name.to_lowercase();
                filter(input, |e| e.custom_name().to_lowercase() == name)
            }
            Self::ObjectName(name) => {
                let name = name.to_lowercase();
                filter(input, |e| e.name().to_lowercase() == name)
            }
            Self::Regex { compiled, .. } => filter(input, |e| {
                compiled.is_match(e.name()) || compiled.is_match(e.custom_name())
            }),
            Self::Group(tag) => filter(input, |e| e.group_id() == Some(*tag)),
            Self::Item => filter(input, |e| e.item().is_some()),
            Self::Everything => input.clone(),
            Self::Nothing => Selection::new(),
            Self::Percent(percent) => {
                let cutoff = (input.len() as f64 * percent / 100.0 + 0.5).floor();
                sample(input, cutoff.max(0.0) as usize, rng)
            }
            Self::Take(n) => sample(input, *n, rng),
            Self::Random(probability) => {
                filter(input, |_| rng.random::<f64>() < *probability)
            }
            Self::Box { min, max } => filter_positions(input, |p| {
                p.cmpge(*min).all() && p.cmple(*max).all()
            })?,
            Self::Sphere { center, radius } => {
                filter_positions(input, |p| center.distance(p) < *radius)?
            }
        };
        Ok(selected)
    }
}

fn filter<'a>(input: &Selection<'a>, mut keep: impl FnMut(&Entity) -> bool) -> Selection<'a> {
    input.iter().filter(|&e| keep(e)).collect()
}

fn filter_positions<'a>(
    input: &Selection<'a>,
    keep: impl Fn(DVec3) -> bool,
) -> CondoResult<Selection<'a>> {
    let mut out = Selection::new();
    for entity in input.iter() {
        if keep(position_of(entity)?) {
            out.insert(entity);
        }
    }
    Ok(out)
}

fn sample<'a, R: Rng + ?Sized>(input: &Selection<'a>, n: usize, rng: &mut R) -> Selection<'a> {
    let mut pool: Vec<&'a Entity> = input.iter().collect();
    pool.shuffle(rng);
    pool.into_iter().take(n).collect()
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(n) => write!(f, "name:{n}"),
            Self::CustomName(n) => write!(f, "customname:{n}"),
            Self::ObjectName(n) => write!(f, "objectname:{n}"),
            Self::Regex { pattern, .. } => write!(f, "regex:{pattern}"),
            Self::Group(g) => write!(f, "group:{g}"),
            Self::Item => write!(f, "items"),
            Self::Everything => write!(f, "everything"),
            Self::Nothing => write!(f, "nothing"),
            Self::Percent(p) => write!(f, "percent:{p}"),
            Self::Take(n) => write!(f, "take:{n}"),
            Self::Random(p) => write!(f, "random:{p}"),
            Self::Box { min, max } => {
                write!(f, "box:{},{},{};{},{},{}", min.x, min.y, min.z, max.x, max.y, max.z)
            }
            Self::Sphere { center, radius } => {
                write!(f, "sphere:{},{},{};{radius}", center.x, center.y, center.z)
            }
        }
    }
}

impl FromStr for Selector {
    type Err = CondoError;

    /// Parse `kind` or `kind:argument`, e.g. `group:3` or `box:0,0,0;10,10,10`.
    fn from_str(s: &str) -> CondoResult<Self> {
        let invalid = |why: &str| CondoError::InvalidSelector(format!("{s:?}: {why}"));
        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind.trim().to_ascii_lowercase(), Some(arg.trim())),
            None => (s.trim().to_ascii_lowercase(), None),
        };

        match (kind.as_str(), arg) {
            ("everything", None) => Ok(Self::Everything),
            ("nothing", None) => Ok(Self::Nothing),
            ("items", None) => Ok(Self::Item),
            ("name", Some(n)) => Ok(Self::Name(n.to_string())),
            ("customname", Some(n)) => Ok(Self::CustomName(n.to_string())),
            ("objectname", Some(n)) => Ok(Self::ObjectName(n.to_string())),
            ("regex", Some(p)) => Self::regex(p),
            ("group", Some(g)) => g
                .parse()
                .map(Self::Group)
                .map_err(|_| invalid("group tag must be an integer")),
            ("percent", Some(p)) => match p.parse::<f64>() {
                Ok(p) if (0.0..=100.0).contains(&p) => Ok(Self::Percent(p)),
                _ => Err(invalid("percentage must be between 0 and 100")),
            },
            ("take", Some(n)) => n
                .parse()
                .map(Self::Take)
                .map_err(|_| invalid("count must be a non-negative integer")),
            ("random", Some(p)) => match p.parse::<f64>() {
                Ok(p) if (0.0..=1.0).contains(&p) => Ok(Self::Random(p)),
                _ => Err(invalid("probability must be between 0 and 1")),
            },
            ("box", Some(corners)) => {
                let (a, b) = corners
                    .split_once(';')
                    .ok_or_else(|| invalid("expected two corners separated by ';'"))?;
                let a = parse_xyz(a).ok_or_else(|| invalid("corner must be x,y,z"))?;
                let b = parse_xyz(b).ok_or_else(|| invalid("corner must be x,y,z"))?;
                Ok(Self::bounding_box(a, b))
            }
            ("sphere", Some(args)) => {
                let (center, radius) = args
                    .split_once(';')
                    .ok_or_else(|| invalid("expected center and radius separated by ';'"))?;
                let center = parse_xyz(center).ok_or_else(|| invalid("center must be x,y,z"))?;
                let radius = radius
                    .trim()
                    .parse()
                    .map_err(|_| invalid("radius must be a number"))?;
                Ok(Self::sphere(center, radius))
            }
            _ => Err(invalid("unknown selector")),
        }
    }
}
