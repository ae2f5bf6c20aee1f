use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during path validation
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Path '{path}' is outside allowed root directory '{root}'")]
    OutsideRootDirectory { path: PathBuf, root: PathBuf },

    #[error("Path does not exist: '{path}'")]
    PathNotFound { path: PathBuf },

    #[error("Path is not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    #[error("IO error for path '{path}': {error}")]
    IoError { path: PathBuf, error: io::Error },
}

/// Validates a path handed to the linter.
///
/// The path is canonicalized (resolving `.`, `..` and symlinks) and must
/// exist. When `root` is set the canonical path must lie inside the
/// canonical root, so a symlink pointing out of the root is rejected too.
///
/// # Examples
///
/// ```rust,ignore
/// let playbook = validate_path("site.yml", config.security.root_path.as_deref())?;
/// ```
pub fn validate_path(input_path: &str, root: Option<&Path>) -> Result<PathBuf, PathSecurityError> {
    let path = Path::new(input_path);

    let canonical_path = path.canonicalize().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            PathSecurityError::PathNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PathSecurityError::IoError {
                path: path.to_path_buf(),
                error: e,
            }
        }
    })?;

    let Some(root) = root else {
        return Ok(canonical_path);
    };

    let canonical_root = root.canonicalize().map_err(|e| PathSecurityError::IoError {
        path: root.to_path_buf(),
        error: e,
    })?;

    if !canonical_path.starts_with(&canonical_root) {
        return Err(PathSecurityError::OutsideRootDirectory {
            path: canonical_path,
            root: canonical_root,
        });
    }

    Ok(canonical_path)
}

/// Same as [`validate_path`] but also requires a directory.
pub fn validate_dir(input_path: &str, root: Option<&Path>) -> Result<PathBuf, PathSecurityError> {
    let path = validate_path(input_path, root)?;
    if !path.is_dir() {
        return Err(PathSecurityError::NotADirectory { path });
    }
    Ok(path)
}
