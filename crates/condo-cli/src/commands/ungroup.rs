use std::path::Path;

use condo_core::Selector;

use super::{Context, plural};

pub fn run(
    ctx: &Context,
    path: &Path,
    selectors: &[Selector],
    output: Option<&Path>,
) -> Result<(), String> {
    let mut save = ctx.load(path)?;
    let ids = super::select_ids(&save, selectors)?;

    let grouped = save
        .select(&ids)
        .iter()
        .filter(|o| o.group_id().is_some())
        .count();
    save.ungroup(&ids);
    println!("  Ungrouped {grouped} object{}", plural(grouped));

    ctx.store(&mut save, path, output)
}
