use std::path::Path;

use condo_core::{Selector, tools};
use glam::DVec3;

use super::{Context, plural};

pub fn run(
    ctx: &Context,
    path: &Path,
    selectors: &[Selector],
    rotation: DVec3,
    about_centroid: bool,
    output: Option<&Path>,
) -> Result<(), String> {
    let mut save = ctx.load(path)?;
    let ids = super::select_ids(&save, selectors)?;

    tools::rotate(&mut save, &ids, rotation, about_centroid).map_err(|e| e.to_string())?;
    let pivot = if about_centroid { "centroid" } else { "origin" };
    println!(
        "  Rotated {} object{} by {}, {}, {} degrees about the {pivot}",
        ids.len(),
        plural(ids.len()),
        rotation.x,
        rotation.y,
        rotation.z
    );

    ctx.store(&mut save, path, output)
}
