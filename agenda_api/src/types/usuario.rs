//! Usuário autenticado do back-office

use serde::{Deserialize, Serialize};

/// Usuário devolvido por `/usuarios/me/`
///
/// `nivel_acesso` é uma string livre definida pelo backend (ex.: "admin",
/// "gerente", "vendedor"); as telas decidem o que exibir a partir dela.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usuario {
    #[serde(deserialize_with = "super::visit::string_or_number")]
    pub id: String,

    #[serde(default)]
    pub nome_completo: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub nivel_acesso: String,
}

impl Usuario {
    pub fn is_admin(&self) -> bool {
        self.nivel_acesso.eq_ignore_ascii_case("admin")
    }
}
