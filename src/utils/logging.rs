use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Inicializa o subscriber global (`RUST_LOG`, padrão `default_level`)
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Em testes o subscriber pode já ter sido instalado
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_session_resolved(user: &str, nivel_acesso: &str) {
    info!("Session resolved for {} (nível de acesso: {})", user, nivel_acesso);
}

pub fn log_session_closed() {
    info!("Session closed, tokens removed");
}

pub fn log_visits_fetched(year: i32, month: u32, total: usize, shown: usize) {
    info!("Visits fetched for {}-{:02}: {} total, {} after filter", year, month, total, shown);
}

pub fn log_unexpected_shape(year: i32, month: u32) {
    warn!("Unexpected visit list shape for {}-{:02}, treating as empty", year, month);
}

pub fn log_api_error(operation: &str, error: &str) {
    error!("Backoffice API error: {} - Error: {}", operation, error);
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_visit_saved(id: &str, empresa: &str) {
    info!("Visit saved: {} - Empresa: {}", id, empresa);
}

pub fn log_transition_issued(id: &str, status: &str, operation: &str) {
    info!("Status transition issued: visit {} -> {} via {}", id, status, operation);
}

pub fn log_drop_ignored(id: &str, reason: &str) {
    debug!("Drop ignored for visit {}: {}", id, reason);
}

pub fn log_layout_changed(layout: &str, width: u32) {
    debug!("Board layout switched to {} (viewport {}px)", layout, width);
}
