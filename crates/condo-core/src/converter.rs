//! Loading and writing saves through the external suitebro converter.
//!
//! The binary save format is never parsed here. A [`Converter`] turns the
//! save into a JSON document next to it, the JSON is decoded into a
//! [`Suitebro`], and saving runs the same steps in reverse.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CondoError, CondoResult};
use crate::suitebro::Suitebro;

/// Environment variable overriding the converter executable.
pub const CONVERTER_ENV: &str = "CONDO_CONVERTER";

/// Which way a conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Binary save to JSON document.
    ToJson,
    /// JSON document to binary save.
    ToSave,
}

impl Direction {
    /// The converter sub-command for this direction.
    pub fn as_arg(self) -> &'static str {
        match self {
            Self::ToJson => "to-json",
            Self::ToSave => "to-save",
        }
    }
}

/// Settings for the external converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Path to the converter executable.
    pub executable: PathBuf,
    /// Pass `-!` so existing outputs are replaced.
    pub overwrite: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            executable: platform_executable(),
            overwrite: true,
        }
    }
}

impl ConverterConfig {
    /// Defaults, with the executable taken from `CONDO_CONVERTER` when set.
    pub fn from_env() -> Self {
        match std::env::var_os(CONVERTER_ENV) {
            Some(path) if !path.is_empty() => Self::default().with_executable(path),
            _ => Self::default(),
        }
    }

    /// Use a specific converter executable.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Set whether existing outputs are overwritten.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Whether this process runs inside a Docker container.
fn in_container() -> bool {
    fs::read_to_string("/proc/1/cgroup").is_ok_and(|cgroups| cgroups.contains("docker"))
}

/// Converter directory and file name for a Linux host. Containers get the
/// statically linked musl build.
fn linux_executable(container: bool) -> (&'static str, &'static str) {
    if container {
        ("linux-container", "tower-unite-save-x86_64-unknown-linux-musl")
    } else {
        ("linux", "tower-unite-save-x86_64-unknown-linux-gnu")
    }
}

fn platform_executable() -> PathBuf {
    let (dir, exe) = if cfg!(target_os = "windows") {
        ("win64", "tower-unite-save-x86_64-pc-windows-msvc.exe")
    } else if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
        ("apple-aarch64", "tower-unite-save-aarch64-apple-darwin")
    } else if cfg!(target_os = "macos") {
        ("apple-x86", "tower-unite-save-x86_64-apple-darwin")
    } else {
        linux_executable(in_container())
    };
    Path::new("lib").join(dir).join(exe)
}

/// Converts between binary saves and JSON documents.
pub trait Converter {
    /// Convert `input` into `output`. Blocks until done.
    fn convert(&self, direction: Direction, input: &Path, output: &Path) -> CondoResult<()>;
}

/// The tower-unite-suitebro command-line converter.
#[derive(Debug, Clone, Default)]
pub struct SuitebroExe {
    config: ConverterConfig,
}

impl SuitebroExe {
    /// Create a converter runner.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn command(&self, direction: Direction, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.config.executable);
        cmd.arg(direction.as_arg());
        if self.config.overwrite {
            cmd.arg("-!");
        }
        cmd.arg("-i").arg(input).arg("-o").arg(output);
        cmd
    }
}

impl Converter for SuitebroExe {
    fn convert(&self, direction: Direction, input: &Path, output: &Path) -> CondoResult<()> {
        let mut cmd = self.command(direction, input, output);
        let command = format!("{cmd:?}");
        tracing::info!(%command, "running converter");

        let out = cmd.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => CondoError::ConverterNotFound(self.config.executable.clone()),
            _ => CondoError::io(&self.config.executable, e),
        })?;
        for line in String::from_utf8_lossy(&out.stdout).lines() {
            tracing::info!("{line}");
        }
        for line in String::from_utf8_lossy(&out.stderr).lines() {
            tracing::warn!("{line}");
        }

        if !out.status.success() {
            return Err(CondoError::ConverterFailed {
                status: out.status,
                command,
            });
        }
        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            "converted"
        );
        Ok(())
    }
}

/// How a save path is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// The path is already a JSON document; skip the converter.
    pub json_only: bool,
}

/// The JSON document path that sits next to a save: `<path>.json`.
pub fn json_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".json");
    PathBuf::from(name)
}

/// Read a JSON document.
pub fn load_json(path: &Path) -> CondoResult<Suitebro> {
    let text = fs::read_to_string(path).map_err(|e| CondoError::io(path, e))?;
    let value = serde_json::from_str(&text)?;
    let save = Suitebro::from_json(value)?;
    tracing::info!(path = %path.display(), objects = save.len(), "loaded save");
    Ok(save)
}

/// Write a JSON document, pretty-printed.
pub fn write_json(save: &mut Suitebro, path: &Path) -> CondoResult<()> {
    let text = serde_json::to_string_pretty(&save.to_json()?)?;
    fs::write(path, text).map_err(|e| CondoError::io(path, e))?;
    tracing::info!(path = %path.display(), objects = save.len(), "wrote save");
    Ok(())
}

/// Convert a binary save to `<path>.json` and load it.
pub fn load_save(path: &Path, converter: &dyn Converter) -> CondoResult<Suitebro> {
    let json = json_path(path);
    converter.convert(Direction::ToJson, path, &json)?;
    load_json(&json)
}

/// Write `<path>.json` and convert it into the binary save at `path`.
pub fn write_save(save: &mut Suitebro, path: &Path, converter: &dyn Converter) -> CondoResult<()> {
    let json = json_path(path);
    write_json(save, &json)?;
    converter.convert(Direction::ToSave, &json, path)
}

/// Load from `path` as a binary save, or as JSON with `json_only`.
pub fn load(path: &Path, options: LoadOptions, converter: &dyn Converter) -> CondoResult<Suitebro> {
    if options.json_only {
        load_json(path)
    } else {
        load_save(path, converter)
    }
}

/// Write to `path` as a binary save, or as JSON with `json_only`.
pub fn store(
    save: &mut Suitebro,
    path: &Path,
    options: LoadOptions,
    converter: &dyn Converter,
) -> CondoResult<()> {
    if options.json_only {
        write_json(save, path)
    } else {
        write_save(save, path, converter)
    }
}
