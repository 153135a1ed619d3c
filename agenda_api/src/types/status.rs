//! Status de visitas comerciais
//!
//! O ciclo de vida é curto e de mão única:
//! - "agendado" (inicial, único status editável)
//! - "realizada" (terminal, carrega resultado + comentário)
//! - "cancelada" (terminal, exige motivo_cancelamento)

use serde::{Deserialize, Deserializer, Serialize};

/// Status de uma visita
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    /// Visita marcada, ainda não aconteceu (padrão)
    Agendado,
    /// Visita concluída
    Realizada,
    /// Visita cancelada com motivo
    Cancelada,
}

// Deserializer customizado: status ausente, null ou desconhecido cai em "agendado"
impl<'de> Deserialize<'de> for VisitStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .as_deref()
            .and_then(VisitStatus::parse)
            .unwrap_or_default())
    }
}

impl VisitStatus {
    /// Ordem fixa das colunas/seções do quadro
    pub const ALL: [VisitStatus; 3] = [
        VisitStatus::Agendado,
        VisitStatus::Realizada,
        VisitStatus::Cancelada,
    ];

    /// Valor usado no wire
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::Agendado => "agendado",
            VisitStatus::Realizada => "realizada",
            VisitStatus::Cancelada => "cancelada",
        }
    }

    /// Rótulo legível
    pub fn label(&self) -> &'static str {
        match self {
            VisitStatus::Agendado => "Agendadas",
            VisitStatus::Realizada => "Realizadas",
            VisitStatus::Cancelada => "Canceladas",
        }
    }

    /// Reconhece o valor do wire (sem diferenciar maiúsculas)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "agendado" | "agendada" => Some(VisitStatus::Agendado),
            "realizada" | "realizado" => Some(VisitStatus::Realizada),
            "cancelada" | "cancelado" => Some(VisitStatus::Cancelada),
            _ => None,
        }
    }

    /// Status terminais não aceitam edição nem nova transição
    pub fn is_terminal(&self) -> bool {
        !matches!(self, VisitStatus::Agendado)
    }

    /// Transições válidas: apenas de "agendado" para um status terminal
    pub fn can_transition_to(&self, target: VisitStatus) -> bool {
        matches!(self, VisitStatus::Agendado) && target.is_terminal()
    }
}

impl Default for VisitStatus {
    fn default() -> Self {
        VisitStatus::Agendado
    }
}

impl std::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resultado registrado ao confirmar uma visita
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmOutcome {
    /// Proposta enviada ao cliente
    PropostaEnviada,
    /// Em negociação
    EmNegociacao,
    /// Cliente sem interesse
    SemInteresse,
}

impl ConfirmOutcome {
    pub const ALL: [ConfirmOutcome; 3] = [
        ConfirmOutcome::PropostaEnviada,
        ConfirmOutcome::EmNegociacao,
        ConfirmOutcome::SemInteresse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmOutcome::PropostaEnviada => "proposta_enviada",
            ConfirmOutcome::EmNegociacao => "em_negociacao",
            ConfirmOutcome::SemInteresse => "sem_interesse",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfirmOutcome::PropostaEnviada => "Proposta enviada",
            ConfirmOutcome::EmNegociacao => "Em negociação",
            ConfirmOutcome::SemInteresse => "Sem interesse",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|o| o.as_str() == normalized)
    }
}

impl Default for ConfirmOutcome {
    fn default() -> Self {
        ConfirmOutcome::PropostaEnviada
    }
}

impl std::fmt::Display for ConfirmOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_value(VisitStatus::Cancelada).unwrap(), json!("cancelada"));
        let status: VisitStatus = serde_json::from_value(json!("realizada")).unwrap();
        assert_eq!(status, VisitStatus::Realizada);
    }

    #[test]
    fn test_unknown_status_defaults_to_agendado() {
        let status: VisitStatus = serde_json::from_value(json!("pendente")).unwrap();
        assert_eq!(status, VisitStatus::Agendado);
        let status: VisitStatus = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(status, VisitStatus::Agendado);
    }

    #[test]
    fn test_transitions_are_one_directional() {
        assert!(VisitStatus::Agendado.can_transition_to(VisitStatus::Realizada));
        assert!(VisitStatus::Agendado.can_transition_to(VisitStatus::Cancelada));
        assert!(!VisitStatus::Agendado.can_transition_to(VisitStatus::Agendado));
        assert!(!VisitStatus::Realizada.can_transition_to(VisitStatus::Cancelada));
        assert!(!VisitStatus::Cancelada.can_transition_to(VisitStatus::Realizada));
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!(ConfirmOutcome::parse("em-negociacao"), Some(ConfirmOutcome::EmNegociacao));
        assert_eq!(ConfirmOutcome::parse("Sem Interesse"), Some(ConfirmOutcome::SemInteresse));
        assert_eq!(ConfirmOutcome::parse("talvez"), None);
    }
}
