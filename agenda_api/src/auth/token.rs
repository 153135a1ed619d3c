use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Par de tokens (access/refresh) emitido pelo back-office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    /// Momento em que o access token foi obtido (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obtained_at: Option<String>,
}

impl TokenPair {
    /// Cria um novo par marcando o instante de obtenção
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            access: access.into(),
            refresh,
            obtained_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    /// Retorna o token no formato de autorização para requisições HTTP
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access)
    }

    /// Aplica a resposta do refresh; o backend pode ou não rotacionar o refresh token
    pub fn rotated(&self, response: RefreshResponse) -> Self {
        Self::new(response.access, response.refresh.or_else(|| self.refresh.clone()))
    }
}

/// Resposta de `POST /token/`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: Option<String>,
}

impl From<TokenResponse> for TokenPair {
    fn from(response: TokenResponse) -> Self {
        Self::new(response.access, response.refresh)
    }
}

/// Resposta de `POST /token/refresh/`
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    pub refresh: Option<String>,
}

/// Armazenamento durável do par de tokens
///
/// Com `path` configurado, cada leitura vai ao arquivo (outro processo pode ter
/// renovado ou removido a sessão); sem `path`, fica só em memória.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    path: Option<PathBuf>,
    cache: Arc<RwLock<Option<TokenPair>>>,
}

impl TokenStore {
    /// Store apenas em memória
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store persistido em arquivo JSON
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lê o par atual
    pub async fn load(&self) -> Result<Option<TokenPair>> {
        let Some(path) = &self.path else {
            return Ok(self.cache.read().await.clone());
        };

        match tokio::fs::read_to_string(path).await {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => {
                let tokens: TokenPair = serde_json::from_str(&content)?;
                *self.cache.write().await = Some(tokens.clone());
                Ok(Some(tokens))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Salva o par (arquivo + memória)
    pub async fn save(&self, tokens: &TokenPair) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, serde_json::to_vec_pretty(tokens)?).await?;
        }
        *self.cache.write().await = Some(tokens.clone());
        tracing::debug!("Token pair saved");
        Ok(())
    }

    /// Remove o par
    pub async fn clear(&self) -> Result<()> {
        if let Some(path) = &self.path {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        *self.cache.write().await = None;
        tracing::debug!("Token pair cleared");
        Ok(())
    }
}
