use std::path::Path;

use colored::Colorize;

use super::Context;

pub fn run(ctx: &Context, path: &Path, name: &str) -> Result<(), String> {
    let save = ctx.load(path)?;

    let obj = save
        .find_item(name)
        .ok_or_else(|| format!("object not found: \"{name}\""))?;

    let kind = if obj.item().is_some() { "item" } else { "metadata" };
    println!("  {} [{}]", obj.name().bold(), kind.dimmed());

    if !obj.custom_name().is_empty() {
        println!("  custom name: {}", obj.custom_name());
    }
    if let Some(guid) = obj.guid() {
        println!("  guid:        {guid}");
    }
    if let Some(props) = obj.properties() {
        println!("  properties:  {}", props.name);
    }
    if let Some(p) = obj.position() {
        println!("  position:    {:.3}, {:.3}, {:.3}", p.x, p.y, p.z);
    }
    if let Some(s) = obj.scale() {
        println!("  scale:       {:.3}, {:.3}, {:.3}", s.x, s.y, s.z);
    }
    if let Some(group) = obj.group_id() {
        println!("  group:       {group}");
    }
    if obj.is_canvas() {
        println!("  canvas:      yes");
    }

    Ok(())
}
