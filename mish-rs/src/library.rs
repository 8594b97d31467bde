//! Script lookup.
//!
//! Scripts live as `<name>.<extension>` files in a single directory.  The
//! directory is chosen by [`resolve_scripts_dir`].

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_EXTENSION: &str = "mish";
pub const SCRIPTS_DIR_ENV: &str = "MISH_SCRIPTS_DIR";

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Script '{file}' not found in {}", .dir.display())]
    NotFound { file: String, dir: PathBuf },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A directory of scripts.
#[derive(Debug, Clone)]
pub struct Library {
    dir: PathBuf,
    extension: String,
}

impl Library {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self { dir: dir.into(), extension: extension.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for script `name`.
    pub fn file_name(&self, name: &str) -> String {
        format!("{name}.{}", self.extension)
    }

    /// Path of an existing script.
    ///
    /// Names are plain file stems; anything containing a path separator or
    /// naming a parent directory is never found.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, LibraryError> {
        let file = self.file_name(name);
        let not_found = || LibraryError::NotFound { file: file.clone(), dir: self.dir.clone() };

        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(not_found());
        }
        let path = self.dir.join(&file);
        if path.is_file() {
            debug!(path = %path.display(), "resolved script");
            Ok(path)
        } else {
            Err(not_found())
        }
    }

    /// Open script `name` for line-by-line reading.
    pub fn open(&self, name: &str) -> Result<BufReader<File>, LibraryError> {
        let path = self.resolve(name)?;
        let file = File::open(&path).map_err(|source| LibraryError::Io { path, source })?;
        Ok(BufReader::new(file))
    }

    /// Names of all scripts in the directory, sorted, without extension.
    pub fn list(&self) -> Result<Vec<String>, LibraryError> {
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|source| LibraryError::Io { path: self.dir.clone(), source })?;

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.extension().is_some_and(|x| x == self.extension.as_str()))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "mish")
}

/// Platform data directory for scripts, e.g. `~/.local/share/mish/scripts`.
pub fn default_scripts_dir() -> Option<PathBuf> {
    project_dirs().map(|p| p.data_dir().join("scripts"))
}

/// Platform config directory, e.g. `~/.config/mish`.
pub fn config_dir() -> Option<PathBuf> {
    project_dirs().map(|p| p.config_dir().to_path_buf())
}

/// Determine the scripts directory.
///
/// Priority: `-L <dir>` CLI flag → `MISH_SCRIPTS_DIR` env var → rc-file
/// `scripts_dir` → platform data directory (if it exists) → `./scripts`.
pub fn resolve_scripts_dir(cli_override: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    resolve_scripts_dir_from(
        cli_override,
        std::env::var_os(SCRIPTS_DIR_ENV).map(PathBuf::from),
        configured,
    )
}

fn resolve_scripts_dir_from(
    cli_override: Option<&Path>,
    from_env: Option<PathBuf>,
    configured: Option<&Path>,
) -> PathBuf {
    if let Some(d) = cli_override {
        return d.to_path_buf();
    }
    if let Some(d) = from_env.filter(|d| !d.as_os_str().is_empty()) {
        return d;
    }
    if let Some(d) = configured {
        return d.to_path_buf();
    }
    default_scripts_dir()
        .filter(|d| d.is_dir())
        .unwrap_or_else(|| PathBuf::from("scripts"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
