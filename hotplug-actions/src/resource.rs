//! Sound resource selection.
//!
//! Precedence, first match wins:
//!
//! 1. a file with the local candidate name in the search directory
//! 2. the user override path, when given and existing (a missing override is a warning)
//! 3. the bundled asset
//!
//! Results are resolved fresh for every event since files may appear or vanish while the
//! monitor runs.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::assets;
use crate::error::{ActionError, Result};

/// Which cue an event calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    Connect,
    Disconnect,
}

impl SoundKind {
    /// File name looked for in the search directory.
    pub fn local_name(&self) -> &'static str {
        match self {
            SoundKind::Connect => "connect.wav",
            SoundKind::Disconnect => "disconnect.wav",
        }
    }

    /// Identifier of the bundled fallback.
    pub fn bundled_id(&self) -> &'static str {
        match self {
            SoundKind::Connect => assets::CONNECT,
            SoundKind::Disconnect => assets::DISCONNECT,
        }
    }
}

/// Outcome of a selection: where to read the sound from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    /// Filesystem path, or bundled identifier when `bundled` is set
    pub path: PathBuf,
    pub bundled: bool,
}

impl ResolvedResource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bundled: false,
        }
    }

    pub fn bundled(id: &str) -> Self {
        Self {
            path: PathBuf::from(id),
            bundled: true,
        }
    }

    /// Load the resource bytes, borrowing them when bundled.
    pub fn open(&self) -> Result<Cow<'static, [u8]>> {
        if self.bundled {
            let id = self.path.to_string_lossy();
            return assets::bundled(&id)
                .map(Cow::Borrowed)
                .ok_or_else(|| ActionError::UnknownAsset(id.into_owned()));
        }

        std::fs::read(&self.path)
            .map(Cow::Owned)
            .map_err(|source| ActionError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

impl std::fmt::Display for ResolvedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.bundled {
            write!(f, "bundled:{}", self.path.display())
        } else {
            write!(f, "{}", self.path.display())
        }
    }
}

/// Resolves sound resources against a search directory.
#[derive(Debug, Clone)]
pub struct ResourceSelector {
    search_dir: PathBuf,
}

impl Default for ResourceSelector {
    /// Searches the process's current working directory.
    fn default() -> Self {
        Self::new(".")
    }
}

impl ResourceSelector {
    pub fn new(search_dir: impl Into<PathBuf>) -> Self {
        Self {
            search_dir: search_dir.into(),
        }
    }

    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// Resolve a resource. Never fails; the bundled fallback is always available.
    ///
    /// An empty `user_override` means no override was given.
    pub fn select(&self, local_name: &str, user_override: &Path, bundled_id: &str) -> ResolvedResource {
        let local = self.search_dir.join(local_name);
        if local.exists() {
            return ResolvedResource::file(local);
        }

        if !user_override.as_os_str().is_empty() {
            if user_override.exists() {
                return ResolvedResource::file(user_override);
            }
            tracing::warn!(
                "Custom sound file {} not found, falling back to bundled {}",
                user_override.display(),
                bundled_id
            );
        }

        ResolvedResource::bundled(bundled_id)
    }

    /// Resolve the resource for a cue, with an optional override.
    pub fn select_sound(&self, kind: SoundKind, user_override: Option<&Path>) -> ResolvedResource {
        self.select(
            kind.local_name(),
            user_override.unwrap_or_else(|| Path::new("")),
            kind.bundled_id(),
        )
    }
}
