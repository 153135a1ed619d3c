use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    #[serde(default)]
    pub board: BoardSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Operações de status expostas pelo backend: nome -> "MÉTODO /caminho/{id}/"
    /// (valor vazio = rota padrão). Ausente = apenas `update_status`.
    #[serde(default)]
    pub operacoes: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BoardSettings {
    /// Largura (px) a partir da qual o quadro vira colunas
    #[serde(default = "default_breakpoint_px")]
    pub breakpoint_px: u32,
    /// Largura inicial do viewport
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionSettings {
    /// Arquivo onde o par de tokens é persistido
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_breakpoint_px() -> u32 {
    768
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_token_file() -> String {
    ".backoffice/tokens.json".to_string()
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            breakpoint_px: default_breakpoint_px(),
            viewport_width: default_viewport_width(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .set_default("api.base_url", "http://localhost:8000/api")?;

        // Variáveis de ambiente específicas
        if let Ok(url) = std::env::var("BACKOFFICE_API_URL") {
            builder = builder.set_override("api.base_url", url)?;
        }
        if let Ok(token_file) = std::env::var("BACKOFFICE_TOKEN_FILE") {
            builder = builder.set_override("session.token_file", token_file)?;
        }

        // BACKOFFICE__BOARD__BREAKPOINT_PX=900, etc.
        builder = builder.add_source(Environment::with_prefix("BACKOFFICE").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// Pares `(operação, rota)` no formato aceito por `VisitasApi::with_operations`
    pub fn operation_routes(&self) -> Vec<(&str, &str)> {
        self.api
            .operacoes
            .iter()
            .map(|(name, route)| (name.as_str(), route.as_str()))
            .collect()
    }
}
