//! Configuration loading and management for the Entitlement Engine.
//!
//! This module provides functionality to load a workspace from YAML files:
//! its working days, its leave categories and the holiday calendars people
//! reference.
//!
//! # Example
//!
//! ```no_run
//! use entitlement_engine::config::WorkspaceLoader;
//!
//! let loader = WorkspaceLoader::load("./config/sample").unwrap();
//! println!("Loaded workspace: {}", loader.config().workspace().name);
//! ```

mod loader;
mod types;

pub use loader::WorkspaceLoader;
pub use types::{WorkspaceConfig, WorkspaceFile, WorkspaceMetadata};
