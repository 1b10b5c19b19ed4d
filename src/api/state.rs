//! Application state for the Entitlement Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::WorkspaceLoader;

/// Shared application state.
///
/// Holds the loaded workspace. Handlers build a fresh snapshot from it per
/// request, so no calculation state is shared between requests.
#[derive(Clone)]
pub struct AppState {
    /// The loaded workspace configuration.
    workspace: Arc<WorkspaceLoader>,
}

impl AppState {
    /// Creates a new application state with the given workspace loader.
    pub fn new(workspace: WorkspaceLoader) -> Self {
        Self {
            workspace: Arc::new(workspace),
        }
    }

    /// Returns a reference to the workspace loader.
    pub fn workspace(&self) -> &WorkspaceLoader {
        &self.workspace
    }
}
