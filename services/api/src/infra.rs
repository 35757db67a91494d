use metrics_exporter_prometheus::PrometheusHandle;
use prefab_directory::accounts::Role;
use prefab_directory::config::AppConfig;
use prefab_directory::error::AppError;
use prefab_directory::storage::SqliteStore;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) store: Arc<SqliteStore>,
}

pub(crate) fn open_store(config: &AppConfig) -> Result<Arc<SqliteStore>, AppError> {
    let store = SqliteStore::open_location(&config.database.path)?;
    if config.database.is_in_memory() {
        info!("using in-memory database; data is discarded on exit");
    }
    Ok(Arc::new(store))
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, String> {
    Role::from_label(raw).ok_or_else(|| format!("unknown role '{raw}' (expected admin or editor)"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_role_accepts_mixed_case() {
        assert_eq!(parse_role(" Admin "), Ok(Role::Admin));
        assert_eq!(parse_role("editor"), Ok(Role::Editor));
        assert!(parse_role("owner").unwrap_err().contains("owner"));
    }
}
