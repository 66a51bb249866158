use std::path::Path;

use condo_core::Selector;

use super::{Context, plural};

pub fn run(ctx: &Context, path: &Path, selectors: &[Selector]) -> Result<(), String> {
    let save = ctx.load(path)?;
    let selection = super::apply_selectors(&save, selectors)?;

    if selection.is_empty() {
        println!("  No objects selected.");
        return Ok(());
    }

    let mut objs: Vec<_> = selection.iter().collect();
    objs.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.guid().cmp(&b.guid())));

    for obj in &objs {
        match obj.group_id() {
            Some(group) => println!("  {obj} (group {group})"),
            None => println!("  {obj}"),
        }
    }
    println!();
    println!("  {} object{} selected", objs.len(), plural(objs.len()));

    Ok(())
}
