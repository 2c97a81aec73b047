//! Packaging state shared by the build and clean hooks.
//!
//! The build hook never edits the service definition. It produces one
//! [`BuildOutcome`] per built function and hands it to a [`PackageRegistry`],
//! which records the include pattern and the cleanup flag. The clean hook
//! reads the flags back from the same registry.
//!
//! # Storage Layout
//!
//! When the two hooks run in separate processes the state is persisted under
//! the working directory:
//!
//! ```text
//! {working_dir}/.slsrust/
//! └── state.json          # PackageState
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ServiceConfig;
use crate::consts::APP_NAME;

/// Current version of the state file format.
pub const STATE_VERSION: u32 = 1;

const STATE_FILENAME: &str = "state.json";

/// Which include list a pattern is added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternScope {
  /// The function's own list (individually packaged services).
  Function,
  /// The service-wide list (one shared package).
  Service,
}

/// What building one function produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutcome {
  pub function: String,
  /// Where the binary was staged.
  pub artifact: PathBuf,
  /// Pattern that includes the artifact in the package.
  pub pattern: String,
  pub scope: PatternScope,
  /// Whether the clean hook must remove the artifact.
  pub clean: bool,
}

/// The narrow interface the hooks use to update packaging state.
pub trait PackageRegistry {
  /// Record a build outcome: add its pattern and cleanup flag.
  fn register(&mut self, outcome: &BuildOutcome);

  /// Whether the function's staged artifact still has to be removed.
  fn is_marked(&self, function: &str) -> bool;

  /// Forget the cleanup flag once the artifact is gone.
  fn clear_cleanup(&mut self, function: &str);
}

/// Packaging state of one function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPackage {
  pub patterns: Vec<String>,
  pub clean_bootstrap: bool,
}

/// Include patterns and cleanup flags for a whole service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageState {
  pub version: u32,
  pub service_patterns: Vec<String>,
  pub functions: BTreeMap<String, FunctionPackage>,
}

impl Default for PackageState {
  fn default() -> Self {
    Self {
      version: STATE_VERSION,
      service_patterns: Vec::new(),
      functions: BTreeMap::new(),
    }
  }
}

impl PackageState {
  /// Start from the patterns already declared in the service definition.
  pub fn from_config(config: &ServiceConfig) -> Self {
    let functions = config
      .functions
      .iter()
      .map(|f| {
        (
          f.name.clone(),
          FunctionPackage {
            patterns: f.package.patterns.clone(),
            clean_bootstrap: false,
          },
        )
      })
      .collect();

    Self {
      version: STATE_VERSION,
      service_patterns: config.package.patterns.clone(),
      functions,
    }
  }

  pub fn function_patterns(&self, function: &str) -> &[String] {
    self.functions.get(function).map(|f| f.patterns.as_slice()).unwrap_or_default()
  }

  /// Keep the cleanup marks of an earlier, uncleaned run.
  ///
  /// A later build that fails before restaging must not forget a `bootstrap`
  /// that is still on disk.
  pub fn carry_marks(&mut self, previous: &PackageState) {
    for name in previous.marked() {
      self.functions.entry(name.to_string()).or_default().clean_bootstrap = true;
    }
  }

  /// Functions whose staged artifact has not been cleaned yet.
  pub fn marked(&self) -> impl Iterator<Item = &str> {
    self
      .functions
      .iter()
      .filter(|(_, f)| f.clean_bootstrap)
      .map(|(name, _)| name.as_str())
  }
}

impl PackageRegistry for PackageState {
  fn register(&mut self, outcome: &BuildOutcome) {
    let function = self.functions.entry(outcome.function.clone()).or_default();
    if outcome.clean {
      function.clean_bootstrap = true;
    }
    match outcome.scope {
      PatternScope::Function => function.patterns.push(outcome.pattern.clone()),
      PatternScope::Service => self.service_patterns.push(outcome.pattern.clone()),
    }
  }

  fn is_marked(&self, function: &str) -> bool {
    self.functions.get(function).is_some_and(|f| f.clean_bootstrap)
  }

  fn clear_cleanup(&mut self, function: &str) {
    if let Some(f) = self.functions.get_mut(function) {
      f.clean_bootstrap = false;
    }
  }
}

#[derive(Debug, Error)]
pub enum StateError {
  #[error("failed to create state directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  #[error("failed to read state file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to write state file {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },

  #[error("failed to parse state file {}: {source}", path.display())]
  Parse { path: PathBuf, source: serde_json::Error },

  #[error("failed to serialize state: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("unsupported state file version {0} (expected {STATE_VERSION})")]
  UnsupportedVersion(u32),
}

/// Reads and writes [`PackageState`] for a working directory.
#[derive(Debug, Clone)]
pub struct StateStore {
  base_path: PathBuf,
}

impl StateStore {
  pub fn new(working_dir: &Path) -> Self {
    Self {
      base_path: working_dir.join(format!(".{APP_NAME}")),
    }
  }

  pub fn path(&self) -> PathBuf {
    self.base_path.join(STATE_FILENAME)
  }

  /// Load the saved state.
  ///
  /// Returns `None` if no build has saved state.
  pub fn load(&self) -> Result<Option<PackageState>, StateError> {
    let path = self.path();

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(source) => return Err(StateError::Read { path, source }),
    };

    let state: PackageState = serde_json::from_str(&content).map_err(|source| StateError::Parse {
      path: path.clone(),
      source,
    })?;

    if state.version != STATE_VERSION {
      return Err(StateError::UnsupportedVersion(state.version));
    }

    Ok(Some(state))
  }

  /// Save the state, writing to a temp file and renaming it into place.
  pub fn save(&self, state: &PackageState) -> Result<(), StateError> {
    fs::create_dir_all(&self.base_path).map_err(|source| StateError::CreateDir {
      path: self.base_path.clone(),
      source,
    })?;

    let path = self.path();
    let temp_path = self.base_path.join(format!("{STATE_FILENAME}.tmp"));

    let content = serde_json::to_string_pretty(state).map_err(StateError::Serialize)?;
    fs::write(&temp_path, &content).map_err(|source| StateError::Write {
      path: temp_path.clone(),
      source,
    })?;
    fs::rename(&temp_path, &path).map_err(|source| StateError::Write { path, source })?;

    Ok(())
  }

  /// Remove the saved state. Missing state is not an error.
  pub fn remove(&self) -> Result<(), StateError> {
    let path = self.path();
    match fs::remove_file(&path) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(source) => return Err(StateError::Write { path, source }),
    }
    // Only succeeds once the directory is empty.
    let _ = fs::remove_dir(&self.base_path);
    Ok(())
  }
}
