//! # amv-cli — Addon Metadata Validator CLI
//!
//! Provides the `amv` command-line interface.
//!
//! ## Subcommands
//!
//! - `amv validate` — Run the selected rules against one addon directory.
//! - `amv list` — Print every registered rule.
//!
//! ```bash
//! amv validate --env production --version latest ./addons/reference-addon
//! amv validate --disabled AM0004,AM0005 --format json ./addons/reference-addon
//! amv list
//! ```
//!
//! Reports go to stdout, logs to stderr. Exit code is `0` when every
//! selected rule passed and `1` otherwise.

pub mod config;
pub mod list;
pub mod report;
pub mod validate;

use std::path::{Path, PathBuf};

/// Make `path` absolute against the current directory.
///
/// The path is not canonicalized; symlinks and `..` are left alone so that
/// error messages show what the operator typed.
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
