//! Allow-list path validation
//!
//! [`AllowedRoots`] holds the configured root directories: absolute,
//! lexically normalized, built once at startup and immutable afterwards.
//! [`AllowedRoots::resolve_request`] runs the full validation pipeline for
//! a caller-supplied path and yields the normalized target path, or the
//! gateway error describing the first failed check.
//!
//! Containment is component-wise (`Path::starts_with`), never plain string
//! prefixing: `/tmp-evil/x.ply` does not match a root of `/tmp`.

use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;

use crate::config::{ConfigError, ConfigResult};

use super::error::GatewayError;

/// The single file suffix the gateway will serve, matched case-insensitively
pub const ALLOWED_EXTENSION: &str = ".ply";

/// Ordered set of allowed root directories
#[derive(Debug, Clone)]
pub struct AllowedRoots {
    roots: Vec<PathBuf>,
}

impl AllowedRoots {
    /// Build the root set from configured paths.
    ///
    /// Each root must be absolute; `.` and `..` segments are collapsed and
    /// trailing separators dropped. A relative root or an empty set is a
    /// startup error: a misconfigured allow-list must not boot a half-open
    /// gateway.
    pub fn new(roots: &[PathBuf]) -> ConfigResult<Self> {
        if roots.is_empty() {
            return Err(ConfigError::EmptyRootSet);
        }
        let mut normalized = Vec::with_capacity(roots.len());
        for root in roots {
            if !root.is_absolute() {
                return Err(ConfigError::RelativeRoot {
                    root: root.display().to_string(),
                });
            }
            normalized.push(root.absolutize()?.into_owned());
        }
        Ok(Self { roots: normalized })
    }

    /// Parse a comma-separated root list, e.g. the `GS_PLY_ROOTS` value
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let roots: Vec<PathBuf> = crate::config::parse_list(raw)
            .into_iter()
            .map(PathBuf::from)
            .collect();
        Self::new(&roots)
    }

    /// The normalized roots, in configuration order
    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path)
    }

    /// Whether a normalized absolute path is contained in some root.
    ///
    /// A path is contained iff it equals a root or descends from one;
    /// `Path::starts_with` compares whole components, so the separator
    /// boundary is respected by construction.
    pub fn contains(&self, path: &Path) -> bool {
        self.roots.iter().any(|root| path.starts_with(root))
    }

    /// Validate a caller-supplied raw path and resolve it to the target.
    ///
    /// Pipeline, each step short-circuiting:
    /// 1. non-empty
    /// 2. no embedded NUL
    /// 3. absolute as given (a relative input is never resolved against the
    ///    working directory, it is refused outright)
    /// 4. lexical normalization collapsing `.` and `..` segments
    /// 5. allow-list containment
    /// 6. allowed file suffix, case-insensitive
    pub fn resolve_request(&self, raw: &str) -> Result<PathBuf, GatewayError> {
        if raw.is_empty() {
            return Err(GatewayError::MissingPath);
        }
        if raw.contains('\0') {
            return Err(GatewayError::InvalidPath);
        }
        let candidate = Path::new(raw);
        if !candidate.is_absolute() {
            return Err(GatewayError::PathNotAllowed);
        }
        let resolved = candidate
            .absolutize()
            .map_err(|_| GatewayError::InvalidPath)?
            .into_owned();
        if !self.contains(&resolved) {
            return Err(GatewayError::PathNotAllowed);
        }
        if !has_allowed_extension(&resolved) {
            return Err(GatewayError::UnsupportedFileType);
        }
        Ok(resolved)
    }
}

/// Case-insensitive check for the allowed file suffix
fn has_allowed_extension(path: &Path) -> bool {
    match path.to_str() {
        Some(s) => s.to_ascii_lowercase().ends_with(ALLOWED_EXTENSION),
        None => false,
    }
}
