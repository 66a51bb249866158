use std::path::{Path, PathBuf};

use colored::Colorize;
use condo_core::converter::json_path;
use condo_core::{Converter, Direction};

use super::Context;

pub fn run(
    ctx: &Context,
    input: &Path,
    direction: Direction,
    output: Option<&Path>,
) -> Result<(), String> {
    if ctx.json_only() {
        return Err("convert runs the converter and cannot be used with --json-only".into());
    }

    let output: PathBuf = match (output, direction) {
        (Some(path), _) => path.to_path_buf(),
        (None, Direction::ToJson) => json_path(input),
        (None, Direction::ToSave) => match input.extension() {
            Some(ext) if ext == "json" => input.with_extension(""),
            _ => return Err("input has no .json extension; pass --output".into()),
        },
    };

    ctx.converter()
        .convert(direction, input, &output)
        .map_err(|e| e.to_string())?;
    println!(
        "  {} {} to {}",
        "Converted".green(),
        input.display(),
        output.display()
    );
    Ok(())
}
