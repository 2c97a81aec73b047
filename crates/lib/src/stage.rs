//! Staging the built binary as `bootstrap`.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StageError {
  #[error("{} already exists and rewriteBootstrap is not set; refusing to overwrite it", path.display())]
  ArtifactExists { path: PathBuf },

  #[error("failed to remove existing {}: {source}", path.display())]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Copy `source` to `dest`.
///
/// An existing `dest` is removed first when `overwrite` is set; otherwise
/// staging fails with [`StageError::ArtifactExists`] and `dest` is left as is.
/// The copy keeps the source's permission bits, so the executable bit survives.
pub fn stage_artifact(source: &Path, dest: &Path, overwrite: bool) -> Result<(), StageError> {
  if dest.exists() {
    if !overwrite {
      return Err(StageError::ArtifactExists {
        path: dest.to_path_buf(),
      });
    }
    debug!(path = %dest.display(), "removing existing artifact");
    std::fs::remove_file(dest).map_err(|source| StageError::Remove {
      path: dest.to_path_buf(),
      source,
    })?;
  }

  std::fs::copy(source, dest).map_err(|source_err| StageError::Copy {
    from: source.to_path_buf(),
    to: dest.to_path_buf(),
    source: source_err,
  })?;

  debug!(from = %source.display(), to = %dest.display(), "staged artifact");
  Ok(())
}
