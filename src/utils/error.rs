use agenda_api::ApiError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Api(ApiError),
    ConfigError(String),
    ValidationError(String),
    SessionError(String),
    InternalError(String),
}

impl AppError {
    /// Mensagem exibida ao usuário no banner do quadro
    pub fn banner(&self) -> String {
        match self {
            AppError::Api(err) if err.is_unauthorized() => {
                "Sua sessão expirou. Faça login novamente.".to_string()
            }
            AppError::Api(ApiError::HttpError(_)) => {
                "Não foi possível contatar o servidor. Tente novamente.".to_string()
            }
            AppError::Api(ApiError::ApiError { message, .. }) => {
                format!("O servidor recusou a operação: {}", message)
            }
            AppError::Api(ApiError::NotFound(_)) => "Visita não encontrada.".to_string(),
            AppError::Api(ApiError::Unsupported(_)) => {
                "A API configurada não oferece operação para alterar o status.".to_string()
            }
            AppError::Api(err) => format!("Erro na comunicação com o servidor: {}", err),
            AppError::ConfigError(msg) => format!("Configuração inválida: {}", msg),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::SessionError(msg) => msg.clone(),
            AppError::InternalError(msg) => format!("Erro interno: {}", msg),
        }
    }

    /// Erros que o usuário resolve corrigindo o formulário (nada foi enviado)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError(_) | AppError::Api(ApiError::ValidationError(_))
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(err) => write!(f, "Backoffice API error: {}", err),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::SessionError(msg) => write!(f, "Session error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Api(err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
