//! Configuration loading functionality.
//!
//! This module provides the [`WorkspaceLoader`] type for loading workspace
//! configurations from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{Category, HolidayCalendar, Person, Snapshot, Trip};

use super::types::{WorkspaceConfig, WorkspaceFile};

/// Loads and provides access to workspace configuration.
///
/// The `WorkspaceLoader` reads YAML configuration files from a directory
/// and provides methods to query categories and holiday calendars.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/sample/
/// ├── workspace.yaml       # Name, working days and categories
/// └── calendars/
///     ├── au-vic-2024.yaml # One holiday calendar per file
///     └── au-vic-2025.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use entitlement_engine::config::WorkspaceLoader;
///
/// let loader = WorkspaceLoader::load("./config/sample").unwrap();
///
/// let annual = loader.get_category("annual").unwrap();
/// println!("Category: {}", annual.name);
/// ```
#[derive(Debug, Clone)]
pub struct WorkspaceLoader {
    config: WorkspaceConfig,
}

impl WorkspaceLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/sample")
    ///
    /// # Returns
    ///
    /// Returns a `WorkspaceLoader` instance on success, or an error if:
    /// - `workspace.yaml` is missing
    /// - Any file contains invalid YAML
    /// - Category ids or calendar (id, year) pairs are duplicated
    /// - A working day index is outside 0..=6
    ///
    /// A missing `calendars` directory is not an error; people referencing
    /// calendars then degrade to weekends only.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use entitlement_engine::config::WorkspaceLoader;
    ///
    /// let loader = WorkspaceLoader::load("./config/sample")?;
    /// # Ok::<(), entitlement_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let workspace_path = path.join("workspace.yaml");
        let file = Self::load_yaml::<WorkspaceFile>(&workspace_path)?;

        let calendars_dir = path.join("calendars");
        let calendars = Self::load_calendars(&calendars_dir)?;

        let config = WorkspaceConfig::new(
            file.workspace,
            file.working_days,
            file.categories,
            calendars,
        );
        Self::from_config(config)
    }

    /// Wraps an already assembled configuration after validating it.
    pub fn from_config(config: WorkspaceConfig) -> EngineResult<Self> {
        validate(&config)?;
        debug!(
            workspace = %config.workspace().name,
            categories = config.categories().len(),
            calendars = config.calendars().len(),
            "Loaded workspace configuration"
        );
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every calendar file from the calendars directory.
    fn load_calendars(calendars_dir: &Path) -> EngineResult<Vec<HolidayCalendar>> {
        if !calendars_dir.exists() {
            return Ok(Vec::new());
        }

        let calendars_dir_str = calendars_dir.display().to_string();
        let entries = fs::read_dir(calendars_dir).map_err(|_| EngineError::ConfigNotFound {
            path: calendars_dir_str.clone(),
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: calendars_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
                paths.push(path);
            }
        }
        paths.sort();

        paths
            .iter()
            .map(|path| Self::load_yaml::<HolidayCalendar>(path))
            .collect()
    }

    /// Returns the underlying workspace configuration.
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Gets a category by its id.
    ///
    /// # Returns
    ///
    /// Returns the category if found, or `CategoryNotFound` error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use entitlement_engine::config::WorkspaceLoader;
    ///
    /// let loader = WorkspaceLoader::load("./config/sample")?;
    /// let category = loader.get_category("annual")?;
    /// println!("Category: {}", category.name);
    /// # Ok::<(), entitlement_engine::error::EngineError>(())
    /// ```
    pub fn get_category(&self, id: &str) -> EngineResult<&Category> {
        self.config
            .categories()
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::CategoryNotFound { id: id.to_string() })
    }

    /// Gets the holiday calendar for a configuration id and year.
    pub fn get_calendar(&self, id: &str, year: i32) -> Option<&HolidayCalendar> {
        self.config
            .calendars()
            .iter()
            .find(|c| c.id == id && c.year == year)
    }

    /// Builds a snapshot of the workspace for the given people and trips.
    pub fn snapshot(&self, persons: Vec<Person>, trips: Vec<Trip>) -> Snapshot {
        self.config.snapshot(persons, trips)
    }
}

/// Rejects configurations the engine cannot index unambiguously.
fn validate(config: &WorkspaceConfig) -> EngineResult<()> {
    let mut category_ids = HashSet::new();
    for category in config.categories() {
        if !category_ids.insert(category.id.as_str()) {
            return Err(EngineError::InvalidConfig {
                message: format!("duplicate category id '{}'", category.id),
            });
        }
    }

    let mut calendar_keys = HashSet::new();
    for calendar in config.calendars() {
        if !calendar_keys.insert((calendar.id.as_str(), calendar.year)) {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "duplicate holiday calendar '{}' for {}",
                    calendar.id, calendar.year
                ),
            });
        }
    }

    let invalid = config.working_days().invalid_indices();
    if !invalid.is_empty() {
        return Err(EngineError::InvalidConfig {
            message: format!("working day indices must be 0..=6, found {:?}", invalid),
        });
    }

    Ok(())
}
