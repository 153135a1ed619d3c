//! Tipos de erro para o crate agenda_api

use thiserror::Error;

/// Erros do cliente do back-office
#[derive(Debug, Error)]
pub enum ApiError {
    /// Erro de requisição HTTP (conexão, timeout do transporte, corpo ilegível)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Erro da API (status code não-2xx)
    #[error("Backoffice API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Erro de autenticação (sem token, refresh recusado)
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Erro de IO ao ler/gravar o arquivo de tokens
    #[error("Token storage failed: {0}")]
    StorageError(#[from] std::io::Error),

    /// Recurso não encontrado
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Erro de configuração
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Operação não exposta pela API configurada
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    /// Erro de validação
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ApiError {
    /// `true` quando o servidor recusou as credenciais
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::ApiError { status: 401, .. } | ApiError::AuthError(_))
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = ApiError::ApiError {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Backoffice API error (status 500): boom");

        let err = ApiError::Unsupported("update_status".to_string());
        assert_eq!(err.to_string(), "Operation not supported: update_status");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(ApiError::AuthError("sem token".into()).is_unauthorized());
        assert!(ApiError::ApiError {
            status: 401,
            message: String::new()
        }
        .is_unauthorized());
        assert!(!ApiError::NotFound("visita".into()).is_unauthorized());
    }
}
