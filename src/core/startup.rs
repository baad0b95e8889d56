use anyhow::{Context, Result};
use tracing::info;

use crate::api::client::Services;
use crate::core::config::Config;
use crate::core::state::AppState;
use crate::stores::assignment_cache::AssignmentIdCache;

// this runs at boot time
pub fn build_state(config: Config) -> Result<AppState> {
    let services = Services::from_config(&config.services).context("Failed to create service clients")?;

    info!(
        classroom = %config.services.classroom_url,
        assignments = %config.services.assignments_url,
        users = %config.services.users_url,
        stage = %config.services.stage,
        timeout_seconds = config.services.request_timeout_secs,
        "Service clients ready"
    );

    let cache = AssignmentIdCache::open(config.storage.cache_path.clone())
        .context("Failed to restore assignment cache")?;

    let state = AppState::new(config, services, cache);

    info!(
        cached_scopes = state.assignment_cache.scope_count(),
        "Application state initialized"
    );

    Ok(state)
}
