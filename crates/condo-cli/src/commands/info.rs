use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::{Context, plural};

pub fn run(ctx: &Context, path: &Path, inventory: bool) -> Result<(), String> {
    let save = ctx.load(path)?;

    let items = save.items().len();
    let metadata = save.len() - items;
    let groups = save.select_all().groups().len();

    println!("  {}", path.display().to_string().bold());
    println!();
    println!("  objects:    {}", save.len());
    println!("  items:      {items}");
    println!("  inventory:  {}", save.inventory_items().len());
    println!("  metadata:   {metadata}");
    println!("  groups:     {groups}");
    println!();

    let counts = if inventory {
        save.inventory_count()
    } else {
        save.item_count()
    };
    if counts.is_empty() {
        println!("  No items.");
        return Ok(());
    }

    let mut rows: Vec<(&String, &usize)> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Item", "Count"]);
    for (name, count) in rows {
        table.add_row(vec![name.clone(), count.to_string()]);
    }

    println!("{table}");
    println!();
    println!("  {} item type{}", counts.len(), plural(counts.len()));

    Ok(())
}
