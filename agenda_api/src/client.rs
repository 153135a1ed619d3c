//! Cliente HTTP para a API do back-office

use crate::auth::{RefreshResponse, TokenPair, TokenResponse, TokenStore};
use crate::error::{ApiError, Result};
use crate::types::Usuario;
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

/// Cliente para interagir com a API do back-office
///
/// Todas as requisições levam `Authorization: Bearer <access>`, lido do
/// `TokenStore` a cada chamada. Um `401` dispara uma única troca do refresh
/// token seguida de uma única repetição da requisição original.
#[derive(Clone, Debug)]
pub struct AgendaClient {
    http_client: HttpClient,
    base_url: String,
    tokens: TokenStore,
}

impl AgendaClient {
    /// Cria um novo cliente
    ///
    /// # Timeouts
    ///
    /// - Total: 30s
    /// - Connect: 5s
    pub fn new(base_url: impl Into<String>, tokens: TokenStore) -> Result<Self> {
        Self::with_timeouts(base_url, tokens, 30, 5)
    }

    /// Cria um novo cliente com timeouts customizados
    pub fn with_timeouts(
        base_url: impl Into<String>,
        tokens: TokenStore,
        total_timeout_secs: u64,
        connect_timeout_secs: u64,
    ) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(total_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let base_url: String = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ApiError::ConfigError("Base URL da API vazia".to_string()));
        }

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Obtém a URL base da API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Armazenamento de tokens usado pelo cliente
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Executa uma requisição autenticada com refresh único em caso de 401
    pub async fn send(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Response> {
        let url = self.url(endpoint);

        let response = self.dispatch(method.clone(), &url, body).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return self.handle_response(response).await;
        }

        tracing::warn!("{} {} returned 401, trying token refresh", method, url);

        // Sem refresh token não há o que tentar: devolve o 401 original
        if !self.refresh_tokens().await? {
            return self.handle_response(response).await;
        }

        let retried = self.dispatch(method, &url, body).await?;
        self.handle_response(retried).await
    }

    /// Envia uma única vez, sem tratar status
    async fn dispatch(&self, method: Method, url: &str, body: Option<&Value>) -> Result<Response> {
        match body {
            Some(body) => tracing::debug!(
                "{} {} with body: {}",
                method,
                url,
                serde_json::to_string(body).unwrap_or_default()
            ),
            None => tracing::debug!("{} {}", method, url),
        }

        let mut request = self
            .http_client
            .request(method, url)
            .header("Content-Type", "application/json");

        if let Some(tokens) = self.tokens.load().await? {
            request = request.header("Authorization", tokens.authorization_header());
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Troca o refresh token por um novo access token
    ///
    /// Retorna `Ok(false)` quando não existe refresh token salvo. Se o servidor
    /// recusar o refresh, os tokens são descartados (sessão encerrada).
    async fn refresh_tokens(&self) -> Result<bool> {
        let Some(current) = self.tokens.load().await? else {
            return Ok(false);
        };
        let Some(refresh) = current.refresh.clone() else {
            return Ok(false);
        };

        let url = self.url("/token/refresh/");
        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::error!("Token refresh rejected (status {})", status);
            self.tokens.clear().await?;
            return Err(ApiError::AuthError(format!(
                "Sessão expirada (refresh recusado com status {})",
                status
            )));
        }

        let refreshed: RefreshResponse = response.json().await?;
        self.tokens.save(&current.rotated(refreshed)).await?;
        tracing::info!("Access token refreshed");
        Ok(true)
    }

    /// Executa uma requisição GET e parseia JSON
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.send(Method::GET, endpoint, None).await?;
        Ok(response.json().await?)
    }

    /// Executa uma requisição POST e parseia JSON
    pub async fn post_json<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<T> {
        let response = self.send(Method::POST, endpoint, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// Executa uma requisição PUT e parseia JSON
    pub async fn put_json<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<T> {
        let response = self.send(Method::PUT, endpoint, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// Executa qualquer método e devolve o corpo como JSON (`Null` se vazio)
    pub async fn send_value(&self, method: Method, endpoint: &str, body: &Value) -> Result<Value> {
        let response = self.send(method, endpoint, Some(body)).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Processa a resposta HTTP e trata erros
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        tracing::error!("Backoffice API error ({}): {}", status_code, error_body);

        let message = extract_error_message(&error_body);

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(message));
        }

        Err(ApiError::ApiError {
            status: status_code,
            message,
        })
    }

    /// Autentica com usuário e senha e salva o par de tokens
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let url = self.url("/token/");

        tracing::debug!("POST {} (login de {})", url, username);

        let response = self
            .http_client
            .post(&url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Login rejected ({}): {}", status, body);
            return Err(ApiError::AuthError(extract_error_message(&body)));
        }

        let tokens: TokenPair = response.json::<TokenResponse>().await?.into();
        self.tokens.save(&tokens).await?;
        Ok(tokens)
    }

    /// Descarta os tokens salvos
    pub async fn logout(&self) -> Result<()> {
        self.tokens.clear().await
    }

    /// Usuário dono do token atual
    pub async fn current_user(&self) -> Result<Usuario> {
        self.get_json("/usuarios/me/").await
    }
}

/// Tenta extrair a mensagem de erro de um corpo JSON (`detail`, `error`, `message`)
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json
            .get("detail")
            .or_else(|| json.get("error"))
            .or_else(|| json.get("message"))
            .and_then(|v| v.as_str())
        {
            return message.to_string();
        }
    }

    if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::PATCH;

    async fn client_with_tokens(server: &MockServer, tokens: Option<TokenPair>) -> AgendaClient {
        let store = TokenStore::in_memory();
        if let Some(tokens) = tokens {
            store.save(&tokens).await.unwrap();
        }
        AgendaClient::new(server.base_url(), store).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = AgendaClient::new("http://localhost:8000/api/", TokenStore::in_memory()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_client_rejects_empty_base_url() {
        assert!(AgendaClient::new("  ", TokenStore::in_memory()).is_err());
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(extract_error_message(r#"{"detail":"Não encontrado."}"#), "Não encontrado.");
        assert_eq!(extract_error_message(r#"{"message":"falhou"}"#), "falhou");
        assert_eq!(extract_error_message("texto puro"), "texto puro");
        assert_eq!(extract_error_message(""), "Unknown error");
    }

    #[tokio::test]
    async fn test_bearer_header_is_attached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/usuarios/me/")
                    .header("authorization", "Bearer a1");
                then.status(200).json_body(serde_json::json!({
                    "id": 1, "nome_completo": "Ana", "nivel_acesso": "admin"
                }));
            })
            .await;

        let client = client_with_tokens(&server, Some(TokenPair::new("a1", None))).await;
        let user = client.current_user().await.unwrap();

        mock.assert_async().await;
        assert_eq!(user.nome_completo, "Ana");
    }

    #[tokio::test]
    async fn test_401_refreshes_once_and_retries() {
        let server = MockServer::start_async().await;
        let expired = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/usuarios/me/")
                    .header("authorization", "Bearer velho");
                then.status(401).json_body(serde_json::json!({"detail": "token expirado"}));
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token/refresh/")
                    .json_body(serde_json::json!({"refresh": "r1"}));
                then.status(200).json_body(serde_json::json!({"access": "novo"}));
            })
            .await;
        let fresh = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/usuarios/me/")
                    .header("authorization", "Bearer novo");
                then.status(200).json_body(serde_json::json!({
                    "id": 1, "nome_completo": "Ana", "nivel_acesso": "admin"
                }));
            })
            .await;

        let client = client_with_tokens(&server, Some(TokenPair::new("velho", Some("r1".into())))).await;
        client.current_user().await.unwrap();

        expired.assert_hits_async(1).await;
        refresh.assert_hits_async(1).await;
        fresh.assert_hits_async(1).await;

        let saved = client.tokens().load().await.unwrap().unwrap();
        assert_eq!(saved.access, "novo");
        assert_eq!(saved.refresh.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_retry_after_refresh_is_not_repeated() {
        let server = MockServer::start_async().await;
        let always_401 = server
            .mock_async(|when, then| {
                when.method(GET).path("/visitas/");
                then.status(401);
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(POST).path("/token/refresh/");
                then.status(200).json_body(serde_json::json!({"access": "novo", "refresh": "r2"}));
            })
            .await;

        let client = client_with_tokens(&server, Some(TokenPair::new("velho", Some("r1".into())))).await;
        let err = client.get_json::<Value>("/visitas/").await.unwrap_err();

        assert!(err.is_unauthorized());
        always_401.assert_hits_async(2).await;
        refresh.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_tokens() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/visitas/");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token/refresh/");
                then.status(401).json_body(serde_json::json!({"detail": "refresh inválido"}));
            })
            .await;

        let client = client_with_tokens(&server, Some(TokenPair::new("velho", Some("r1".into())))).await;
        let err = client.get_json::<Value>("/visitas/").await.unwrap_err();

        assert!(matches!(err, ApiError::AuthError(_)));
        assert!(client.tokens().load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_401_without_refresh_token_is_returned() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/visitas/");
                then.status(401).json_body(serde_json::json!({"detail": "sem credenciais"}));
            })
            .await;

        let client = client_with_tokens(&server, None).await;
        match client.get_json::<Value>("/visitas/").await.unwrap_err() {
            ApiError::ApiError { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "sem credenciais");
            }
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_saves_tokens() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token/")
                    .json_body(serde_json::json!({"username": "ana", "password": "segredo"}));
                then.status(200).json_body(serde_json::json!({"access": "a1", "refresh": "r1"}));
            })
            .await;

        let client = client_with_tokens(&server, None).await;
        let tokens = client.login("ana", "segredo").await.unwrap();

        assert_eq!(tokens.access, "a1");
        assert_eq!(client.tokens().load().await.unwrap(), Some(tokens));

        client.logout().await.unwrap();
        assert!(client.tokens().load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_send_value_accepts_empty_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PATCH).path("/visitas/1/status/");
                then.status(204);
            })
            .await;

        let client = client_with_tokens(&server, Some(TokenPair::new("a1", None))).await;
        let value = client
            .send_value(Method::PATCH, "/visitas/1/status/", &serde_json::json!({"status": "realizada"}))
            .await
            .unwrap();
        assert_eq!(value, Value::Null);
    }
}
