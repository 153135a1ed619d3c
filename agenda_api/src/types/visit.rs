//! Estrutura de visita comercial
//!
//! ## ⚠️ Notas sobre o payload
//!
//! - **id**: atribuído pelo servidor; pode vir como número ou string
//! - **obs / observacao**: o backend já usou os dois nomes, aceitamos ambos
//! - **data**: ISO `yyyy-mm-dd`; **hora**: `HH:MM` ou `HH:MM:SS`
//! - **responsavel**: apenas exibição, nunca enviado de volta

use super::status::VisitStatus;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identificador opaco de uma visita
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VisitId(String);

impl VisitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for VisitId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_or_number(deserializer).map(VisitId)
    }
}

/// Ids do backend chegam como número ou string; normalizamos para string
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

impl std::fmt::Display for VisitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VisitId {
    fn from(value: &str) -> Self {
        VisitId(value.to_string())
    }
}

impl From<i64> for VisitId {
    fn from(value: i64) -> Self {
        VisitId(value.to_string())
    }
}

/// `null` no JSON vira o valor padrão (texto vazio)
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Responsável pela visita (somente leitura)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Responsavel {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nome_completo: String,
}

/// Visita comercial como devolvida pela API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawVisit")]
pub struct Visit {
    pub id: VisitId,

    /// Nome da empresa visitada
    pub empresa: String,

    /// Data ISO `yyyy-mm-dd`
    pub data: String,

    /// Hora `HH:MM[:SS]`
    pub hora: String,

    /// Observação livre
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<String>,

    pub status: VisitStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivo_cancelamento: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsavel: Option<Responsavel>,
}

// Formato de leitura: campos de texto aceitam null e os dois nomes da
// observação podem vir juntos (`obs` tem prioridade)
#[derive(Deserialize)]
struct RawVisit {
    id: VisitId,
    #[serde(default, deserialize_with = "null_as_default")]
    empresa: String,
    #[serde(default, deserialize_with = "null_as_default")]
    data: String,
    #[serde(default, deserialize_with = "null_as_default")]
    hora: String,
    #[serde(default)]
    obs: Option<String>,
    #[serde(default)]
    observacao: Option<String>,
    #[serde(default)]
    status: VisitStatus,
    #[serde(default)]
    motivo_cancelamento: Option<String>,
    #[serde(default)]
    responsavel: Option<Responsavel>,
}

impl From<RawVisit> for Visit {
    fn from(raw: RawVisit) -> Self {
        Self {
            id: raw.id,
            empresa: raw.empresa,
            data: raw.data,
            hora: raw.hora,
            obs: raw.obs.or(raw.observacao),
            status: raw.status,
            motivo_cancelamento: raw.motivo_cancelamento,
            responsavel: raw.responsavel,
        }
    }
}

impl Visit {
    /// Visita ainda editável (status "agendado")
    pub fn is_editable(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Chave de ordenação do quadro: (data, hora)
    ///
    /// Comparação lexicográfica basta porque os dois campos usam formato ISO com zero à esquerda.
    pub fn schedule_key(&self) -> (&str, &str) {
        (self.data.as_str(), self.hora.as_str())
    }

    pub fn responsavel_nome(&self) -> Option<&str> {
        self.responsavel
            .as_ref()
            .map(|r| r.nome_completo.as_str())
            .filter(|n| !n.is_empty())
    }
}

/// Payload de criação/edição
///
/// Status é sempre "agendado": criação nunca nasce em status terminal e a edição
/// só é permitida enquanto a visita está agendada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewVisit {
    pub empresa: String,
    pub data: String,
    pub hora: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obs: Option<String>,
    pub status: VisitStatus,
}

impl NewVisit {
    pub fn new(
        empresa: impl Into<String>,
        data: impl Into<String>,
        hora: impl Into<String>,
        obs: Option<String>,
    ) -> Self {
        Self {
            empresa: empresa.into(),
            data: data.into(),
            hora: hora.into(),
            obs: obs.filter(|o| !o.trim().is_empty()),
            status: VisitStatus::Agendado,
        }
    }
}

/// Formatos aceitos pela listagem mensal: array puro ou paginado `{results: [...]}`
///
/// Só o envelope é validado aqui; cada item é lido em `into_visits`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VisitListResponse {
    Plain(Vec<Value>),
    Paged { results: Vec<Value> },
}

impl VisitListResponse {
    /// Itens que não formam uma visita são descartados (com aviso); o resto segue
    pub fn into_visits(self) -> Vec<Visit> {
        let items = match self {
            VisitListResponse::Plain(items) => items,
            VisitListResponse::Paged { results } => results,
        };

        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value::<Visit>(item) {
                Ok(visit) => Some(visit),
                Err(e) => {
                    tracing::warn!("Skipping visit #{} in listing: {}", index, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visit_accepts_numeric_id_and_observacao_alias() {
        let visit: Visit = serde_json::from_value(json!({
            "id": 7,
            "empresa": "Acme",
            "data": "2025-10-05",
            "hora": "09:00",
            "observacao": "levar proposta",
            "status": "agendado",
            "responsavel": {"nome_completo": "Maria Souza"}
        }))
        .unwrap();

        assert_eq!(visit.id, VisitId::new("7"));
        assert_eq!(visit.obs.as_deref(), Some("levar proposta"));
        assert_eq!(visit.responsavel_nome(), Some("Maria Souza"));
        assert!(visit.is_editable());
    }

    #[test]
    fn test_new_visit_is_always_agendado() {
        let payload = NewVisit::new("Acme", "2025-10-05", "09:00", Some("  ".into()));
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["status"], "agendado");
        assert!(body.get("obs").is_none());
    }

    #[test]
    fn test_list_response_shapes() {
        let plain: VisitListResponse =
            serde_json::from_value(json!([{"id": 1, "empresa": "A"}])).unwrap();
        assert_eq!(plain.into_visits().len(), 1);

        let paged: VisitListResponse =
            serde_json::from_value(json!({"count": 1, "results": [{"id": "x"}]})).unwrap();
        assert_eq!(paged.into_visits()[0].id.as_str(), "x");

        assert!(serde_json::from_value::<VisitListResponse>(json!({"data": []})).is_err());
    }

    #[test]
    fn test_both_note_names_in_one_row() {
        let visit: Visit = serde_json::from_value(json!({
            "id": 1, "empresa": "Acme", "data": "2025-10-05", "hora": "09:00",
            "obs": "levar catálogo", "observacao": "texto antigo"
        }))
        .unwrap();
        assert_eq!(visit.obs.as_deref(), Some("levar catálogo"));

        let visit: Visit = serde_json::from_value(json!({
            "id": 2, "obs": null, "observacao": "só no campo antigo"
        }))
        .unwrap();
        assert_eq!(visit.obs.as_deref(), Some("só no campo antigo"));
    }

    #[test]
    fn test_null_text_fields_become_empty() {
        let visit: Visit = serde_json::from_value(json!({
            "id": 3, "empresa": null, "data": "2025-10-05", "hora": null,
            "status": null, "responsavel": {"nome_completo": null}
        }))
        .unwrap();
        assert_eq!(visit.empresa, "");
        assert_eq!(visit.hora, "");
        assert_eq!(visit.status, VisitStatus::Agendado);
        assert_eq!(visit.responsavel_nome(), None);
    }

    #[test]
    fn test_bad_row_does_not_drop_the_listing() {
        let listing: VisitListResponse = serde_json::from_value(json!([
            {"id": 1, "empresa": "Acme", "obs": "a", "observacao": "a"},
            {"id": 2, "empresa": "Beta", "hora": null},
            {"empresa": "sem id"},
            "lixo",
            {"id": 4, "empresa": "Delta"}
        ]))
        .unwrap();

        let ids: Vec<String> = listing.into_visits().into_iter().map(|v| v.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
    }
}
