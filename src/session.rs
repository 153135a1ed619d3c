//! Sessão do usuário
//!
//! Objeto único por processo, criado explicitamente com `Session::init` e
//! encerrado com `Session::teardown`, injetado em quem precisa dele (o quadro
//! de visitas recebe `&Session` ao ser montado).

use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use agenda_api::{AgendaClient, ApiError, Usuario};
use tokio::sync::RwLock;

/// Estado da sessão
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(Usuario),
}

/// Sessão do back-office
#[derive(Debug)]
pub struct Session {
    client: AgendaClient,
    state: RwLock<SessionState>,
}

impl Session {
    /// Sessão ainda não resolvida (anônima)
    pub fn new(client: AgendaClient) -> Self {
        Self {
            client,
            state: RwLock::new(SessionState::Anonymous),
        }
    }

    /// Sessão já autenticada para um usuário conhecido
    pub fn with_user(client: AgendaClient, usuario: Usuario) -> Self {
        Self {
            client,
            state: RwLock::new(SessionState::Authenticated(usuario)),
        }
    }

    /// Resolve a sessão a partir dos tokens persistidos
    ///
    /// - sem tokens → anônima
    /// - tokens recusados (mesmo após refresh) → tokens apagados, anônima
    /// - falha de transporte → erro (o usuário tenta de novo)
    pub async fn init(client: AgendaClient) -> AppResult<Self> {
        let session = Self::new(client);

        if session.client.tokens().load().await?.is_none() {
            tracing::info!("No stored tokens, starting anonymous session");
            return Ok(session);
        }

        match session.client.current_user().await {
            Ok(usuario) => {
                log_session_resolved(&usuario.nome_completo, &usuario.nivel_acesso);
                *session.state.write().await = SessionState::Authenticated(usuario);
            }
            Err(err) if err.is_unauthorized() => {
                log_api_error("session init", &err.to_string());
                session.client.logout().await?;
            }
            Err(err) => {
                log_api_error("session init", &err.to_string());
                return Err(err.into());
            }
        }

        Ok(session)
    }

    /// Autentica e carrega o usuário
    pub async fn login(&self, username: &str, password: &str) -> AppResult<Usuario> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::ValidationError("Informe usuário e senha.".to_string()));
        }

        self.client.login(username.trim(), password).await.map_err(|err| {
            log_api_error("login", &err.to_string());
            match err {
                ApiError::AuthError(msg) => {
                    AppError::SessionError(format!("Login recusado: {}", msg))
                }
                other => AppError::Api(other),
            }
        })?;

        let usuario = self.client.current_user().await.map_err(|err| {
            log_api_error("current user", &err.to_string());
            AppError::Api(err)
        })?;

        log_session_resolved(&usuario.nome_completo, &usuario.nivel_acesso);
        *self.state.write().await = SessionState::Authenticated(usuario.clone());
        Ok(usuario)
    }

    /// Encerra a sessão: apaga os tokens e volta ao estado anônimo
    pub async fn teardown(&self) -> AppResult<()> {
        self.client.logout().await?;
        *self.state.write().await = SessionState::Anonymous;
        log_session_closed();
        Ok(())
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<Usuario> {
        match &*self.state.read().await {
            SessionState::Authenticated(usuario) => Some(usuario.clone()),
            SessionState::Anonymous => None,
        }
    }

    /// Usuário logado ou erro de sessão
    pub async fn require_user(&self) -> AppResult<Usuario> {
        self.current_user()
            .await
            .ok_or_else(|| AppError::SessionError("Faça login para acessar a agenda de visitas.".to_string()))
    }

    pub fn client(&self) -> &AgendaClient {
        &self.client
    }
}
