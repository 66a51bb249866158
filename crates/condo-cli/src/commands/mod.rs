pub mod center;
pub mod convert;
pub mod find;
pub mod info;
pub mod rotate;
pub mod select;
pub mod ungroup;

use std::path::{Path, PathBuf};

use colored::Colorize;
use condo_core::converter;
use condo_core::{ConverterConfig, EntityId, LoadOptions, Selection, Selector, SuitebroExe, Suitebro};

/// Global options every command shares.
pub struct Context {
    options: LoadOptions,
    converter: SuitebroExe,
}

impl Context {
    pub fn new(json_only: bool, converter: Option<PathBuf>) -> Self {
        let mut config = ConverterConfig::from_env();
        if let Some(path) = converter {
            config = config.with_executable(path);
        }
        Self {
            options: LoadOptions { json_only },
            converter: SuitebroExe::new(config),
        }
    }

    pub fn json_only(&self) -> bool {
        self.options.json_only
    }

    pub fn converter(&self) -> &SuitebroExe {
        &self.converter
    }

    /// Load a save, through the converter unless running JSON-only.
    pub fn load(&self, path: &Path) -> Result<Suitebro, String> {
        converter::load(path, self.options, &self.converter).map_err(|e| e.to_string())
    }

    /// Write a save to `output`, or back over `input` when no output is given.
    pub fn store(&self, save: &mut Suitebro, input: &Path, output: Option<&Path>) -> Result<(), String> {
        let path = output.unwrap_or(input);
        converter::store(save, path, self.options, &self.converter).map_err(|e| e.to_string())?;
        println!("  {} {}", "Saved".green(), path.display());
        Ok(())
    }
}

/// Run the selector pipeline over every object. Each selector narrows the
/// result of the previous one; with no selectors, every item is selected.
pub fn apply_selectors<'a>(save: &'a Suitebro, selectors: &[Selector]) -> Result<Selection<'a>, String> {
    let mut selection = save.select_all();
    let default = [Selector::Item];
    let pipeline = if selectors.is_empty() { &default[..] } else { selectors };
    for selector in pipeline {
        selection = selector.select(&selection).map_err(|e| e.to_string())?;
        tracing::debug!(%selector, remaining = selection.len(), "applied selector");
    }
    Ok(selection)
}

/// Handles of the selected objects, failing on an empty selection.
pub fn select_ids(save: &Suitebro, selectors: &[Selector]) -> Result<Vec<EntityId>, String> {
    let ids = apply_selectors(save, selectors)?.ids();
    if ids.is_empty() {
        return Err("selection is empty".into());
    }
    Ok(ids)
}

/// `"s"` when `n` is not one.
pub fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
