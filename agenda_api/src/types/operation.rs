//! Operações de atualização de status expostas pelo backend
//!
//! Versões diferentes da API expuseram nomes diferentes para a mesma ação.
//! Cada operação é configurada como `"<MÉTODO> <caminho>"`, com `{id}`
//! substituído pelo identificador da visita.

use crate::error::{ApiError, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Operações conhecidas de atualização de visita
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOperation {
    /// `updateVisitaStatus(id, status, extra)`
    UpdateStatus,
    /// `marcarRealizada(id)`
    MarkDone,
    /// `cancelarVisita(id, {motivo_cancelamento})`
    Cancel,
    /// `alterarStatus(id, payload)`
    ChangeStatus,
    /// `update(id, payload)`
    Update,
    /// `patchVisita(id, payload)`
    Patch,
    /// `saveVisita(id, payload)`
    Save,
    /// `updateVisita(id, payload)`
    UpdateVisit,
}

impl UpdateOperation {
    pub const ALL: [UpdateOperation; 8] = [
        UpdateOperation::UpdateStatus,
        UpdateOperation::MarkDone,
        UpdateOperation::Cancel,
        UpdateOperation::ChangeStatus,
        UpdateOperation::Update,
        UpdateOperation::Patch,
        UpdateOperation::Save,
        UpdateOperation::UpdateVisit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOperation::UpdateStatus => "update_status",
            UpdateOperation::MarkDone => "mark_done",
            UpdateOperation::Cancel => "cancel",
            UpdateOperation::ChangeStatus => "change_status",
            UpdateOperation::Update => "update",
            UpdateOperation::Patch => "patch",
            UpdateOperation::Save => "save",
            UpdateOperation::UpdateVisit => "update_visit",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name.trim())
    }

    /// Rota padrão de cada operação
    pub fn default_route(&self) -> OperationRoute {
        let (method, path) = match self {
            UpdateOperation::UpdateStatus => (Method::PATCH, "/visitas/{id}/status/"),
            UpdateOperation::MarkDone => (Method::POST, "/visitas/{id}/realizada/"),
            UpdateOperation::Cancel => (Method::POST, "/visitas/{id}/cancelar/"),
            UpdateOperation::ChangeStatus => (Method::POST, "/visitas/{id}/alterar-status/"),
            UpdateOperation::Update => (Method::PUT, "/visitas/{id}/"),
            UpdateOperation::Patch => (Method::PATCH, "/visitas/{id}/"),
            UpdateOperation::Save => (Method::POST, "/visitas/{id}/salvar/"),
            UpdateOperation::UpdateVisit => (Method::PUT, "/visitas/{id}/atualizar/"),
        };
        OperationRoute {
            method,
            path: path.to_string(),
        }
    }
}

impl std::fmt::Display for UpdateOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Método + template de caminho de uma operação
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRoute {
    pub method: Method,
    pub path: String,
}

impl OperationRoute {
    /// Lê `"PATCH /visitas/{id}/status/"`; sem método assume `POST`
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let (method, path) = match spec.split_once(char::is_whitespace) {
            Some((method, path)) => {
                let method = Method::from_bytes(method.to_uppercase().as_bytes()).map_err(|_| {
                    ApiError::ConfigError(format!("Método HTTP inválido na rota '{}'", spec))
                })?;
                (method, path.trim())
            }
            None => (Method::POST, spec),
        };

        if !path.starts_with('/') || !path.contains("{id}") {
            return Err(ApiError::ConfigError(format!(
                "Rota '{}' deve começar com '/' e conter '{{id}}'",
                spec
            )));
        }

        Ok(Self {
            method,
            path: path.to_string(),
        })
    }

    /// Substitui `{id}` pelo identificador (URL-encoded)
    pub fn endpoint_for(&self, id: &str) -> String {
        self.path.replace("{id}", &urlencoding::encode(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parse() {
        let route = OperationRoute::parse("patch /visitas/{id}/status/").unwrap();
        assert_eq!(route.method, Method::PATCH);
        assert_eq!(route.endpoint_for("42"), "/visitas/42/status/");

        let route = OperationRoute::parse("/visitas/{id}/salvar/").unwrap();
        assert_eq!(route.method, Method::POST);
    }

    #[test]
    fn test_route_rejects_missing_placeholder() {
        assert!(OperationRoute::parse("PUT /visitas/").is_err());
        assert!(OperationRoute::parse("PUT visitas/{id}").is_err());
    }

    #[test]
    fn test_endpoint_encodes_id() {
        let route = UpdateOperation::Patch.default_route();
        assert_eq!(route.endpoint_for("a b"), "/visitas/a%20b/");
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in UpdateOperation::ALL {
            assert_eq!(UpdateOperation::parse(op.as_str()), Some(op));
        }
        assert_eq!(UpdateOperation::parse("delete"), None);
    }
}
