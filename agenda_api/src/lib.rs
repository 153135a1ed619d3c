//! Cliente da API REST do back-office
//!
//! Este crate fornece uma interface tipo-segura para os endpoints consumidos
//! pelo quadro de visitas comerciais:
//!
//! - Autenticação por par de tokens (access/refresh) com refresh único em `401`
//! - Armazenamento durável dos tokens em arquivo JSON
//! - Listagem mensal, criação e edição de visitas
//! - Operações de status configuráveis (`UpdateOperation`)
//!
//! # Endpoints
//!
//! - **Token**: `/token/`, `/token/refresh/`
//! - **Usuário**: `/usuarios/me/`
//! - **Visitas**: `/visitas/?ano=&mes=`, `/visitas/`, `/visitas/{id}/`
//!
//! # Exemplo Básico
//!
//! ```rust,ignore
//! use agenda_api::{AgendaClient, TokenStore, VisitasApi};
//!
//! #[tokio::main]
//! async fn main() -> agenda_api::Result<()> {
//!     let client = AgendaClient::new("https://backoffice.local/api", TokenStore::file(".tokens.json"))?;
//!     client.login("ana", "segredo").await?;
//!
//!     let visitas = VisitasApi::new(client);
//!     let body = visitas.list_month(2025, 10).await?;
//!     println!("{}", body);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod types;
pub mod visitas;

pub use auth::{TokenPair, TokenStore};
pub use client::AgendaClient;
pub use error::{ApiError, Result};
pub use types::{
    ConfirmOutcome, NewVisit, OperationRoute, Responsavel, UpdateOperation, Usuario, Visit,
    VisitId, VisitListResponse, VisitStatus,
};
pub use visitas::VisitasApi;
