use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Collapses `.` and `..` lexically; `..` may never climb above the root.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StorageError::PathTraversalAttempt {
                        message: path.display().to_string().into(),
                        context: Some("Path climbs above the storage root".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::PathTraversalAttempt {
                    message: path.display().to_string().into(),
                    context: Some("Absolute paths are not allowed".into()),
                });
            },
        }
    }

    if out.as_os_str().is_empty() {
        return Err(StorageError::FileNotFound {
            message: path.display().to_string().into(),
            context: Some("Target must name a file inside the storage root".into()),
        });
    }

    Ok(out)
}

/// Joins `path` onto `root`, refusing anything that resolves outside it.
///
/// Existing targets are canonicalized so symlinks cannot point out of the sandbox; for
/// targets that do not exist yet, the nearest existing ancestor is checked instead.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let joined = root.join(normalize_relative(path.as_ref())?);

    match joined.canonicalize() {
        Ok(canonical) if canonical.starts_with(root) => Ok(canonical),
        Ok(canonical) => Err(StorageError::PathTraversalAttempt {
            message: canonical.display().to_string().into(),
            context: Some("Target resolves outside the storage root".into()),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => check_ancestors(root, joined),
        Err(e) => Err(StorageError::Io { source: e, context: None }),
    }
}

fn check_ancestors(root: &Path, joined: PathBuf) -> Result<PathBuf, StorageError> {
    let mut current = joined.parent();

    while let Some(ancestor) = current {
        if ancestor == root {
            return Ok(joined);
        }

        if ancestor.exists() {
            return match ancestor.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined),
                Ok(canonical) => Err(StorageError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing parent directory links outside the root".into()),
                }),
                Err(e) => Err(StorageError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = ancestor.parent();
    }

    Err(StorageError::PathTraversalAttempt {
        message: joined.display().to_string().into(),
        context: Some("No ancestor inside the storage root".into()),
    })
}
