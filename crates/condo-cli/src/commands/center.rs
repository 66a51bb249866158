use std::path::Path;

use condo_core::{Selector, tools};
use glam::DVec3;

use super::{Context, plural};

pub fn run(
    ctx: &Context,
    path: &Path,
    selectors: &[Selector],
    offset: DVec3,
    output: Option<&Path>,
) -> Result<(), String> {
    let mut save = ctx.load(path)?;
    let ids = super::select_ids(&save, selectors)?;

    tools::center(&mut save, &ids, offset).map_err(|e| e.to_string())?;
    println!(
        "  Centered {} object{} at {}, {}, {}",
        ids.len(),
        plural(ids.len()),
        offset.x,
        offset.y,
        offset.z
    );

    ctx.store(&mut save, path, output)
}
