//! Transições de status de visitas
//!
//! `StatusTransitions` é o contrato canônico usado pelo quadro. Backends que
//! expõem uma operação dedicada podem implementá-lo diretamente;
//! `FallbackTransitions` adapta backends que só oferecem algum dos nomes
//! legados de atualização, tentando-os numa ordem fixa.

use super::api::VisitOperations;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use agenda_api::{ApiError, ConfirmOutcome, UpdateOperation, VisitId, VisitStatus};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Dados extras exigidos por cada status terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionPayload {
    Cancel {
        motivo_cancelamento: String,
    },
    Confirm {
        resultado: ConfirmOutcome,
        comentario: String,
    },
}

impl TransitionPayload {
    pub fn cancel(motivo: impl Into<String>) -> Self {
        TransitionPayload::Cancel {
            motivo_cancelamento: motivo.into().trim().to_string(),
        }
    }

    pub fn confirm(resultado: ConfirmOutcome, comentario: impl Into<String>) -> Self {
        TransitionPayload::Confirm {
            resultado,
            comentario: comentario.into().trim().to_string(),
        }
    }

    /// Status que este payload acompanha
    pub fn target_status(&self) -> VisitStatus {
        match self {
            TransitionPayload::Cancel { .. } => VisitStatus::Cancelada,
            TransitionPayload::Confirm { .. } => VisitStatus::Realizada,
        }
    }

    /// Campos extras como objeto JSON
    pub fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            TransitionPayload::Cancel { motivo_cancelamento } => {
                fields.insert("motivo_cancelamento".into(), json!(motivo_cancelamento));
            }
            TransitionPayload::Confirm {
                resultado,
                comentario,
            } => {
                fields.insert("resultado".into(), json!(resultado.as_str()));
                fields.insert("comentario".into(), json!(comentario));
            }
        }
        fields
    }

    /// Garante status coerente e textos obrigatórios preenchidos
    pub fn validate(&self, status: VisitStatus) -> AppResult<()> {
        if status == VisitStatus::Agendado {
            return Err(AppError::ValidationError(
                "Uma visita não pode voltar para agendado.".to_string(),
            ));
        }
        if self.target_status() != status {
            return Err(AppError::ValidationError(format!(
                "Dados informados não correspondem ao status '{}'.",
                status
            )));
        }
        match self {
            TransitionPayload::Cancel { motivo_cancelamento } if motivo_cancelamento.trim().is_empty() => {
                Err(AppError::ValidationError("Informe o motivo do cancelamento.".to_string()))
            }
            TransitionPayload::Confirm { comentario, .. } if comentario.trim().is_empty() => {
                Err(AppError::ValidationError("Informe um comentário sobre a visita.".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Contrato canônico de transição de status
#[async_trait]
pub trait StatusTransitions: Send + Sync {
    async fn transition_status(
        &self,
        id: &VisitId,
        status: VisitStatus,
        payload: &TransitionPayload,
    ) -> AppResult<()>;
}

/// Escolhe a operação a usar para `status`, na ordem fixa de tentativa
///
/// `update_status` → (`mark_done` | `cancel`) → `change_status` → `update` →
/// `patch` → `save` → `update_visit`.
pub fn resolve_operation<O: VisitOperations + ?Sized>(
    ops: &O,
    status: VisitStatus,
) -> Option<UpdateOperation> {
    let specific = match status {
        VisitStatus::Realizada => Some(UpdateOperation::MarkDone),
        VisitStatus::Cancelada => Some(UpdateOperation::Cancel),
        VisitStatus::Agendado => None,
    };

    [Some(UpdateOperation::UpdateStatus), specific]
        .into_iter()
        .flatten()
        .chain([
            UpdateOperation::ChangeStatus,
            UpdateOperation::Update,
            UpdateOperation::Patch,
            UpdateOperation::Save,
            UpdateOperation::UpdateVisit,
        ])
        .find(|op| ops.supports(*op))
}

/// Corpo enviado para cada operação
///
/// `mark_done` e `cancel` já implicam o status; as demais recebem
/// `{status, ...extras}`.
pub fn operation_body(op: UpdateOperation, status: VisitStatus, payload: &TransitionPayload) -> Value {
    match op {
        UpdateOperation::MarkDone | UpdateOperation::Cancel => Value::Object(payload.fields()),
        _ => {
            let mut body = Map::new();
            body.insert("status".into(), json!(status.as_str()));
            body.extend(payload.fields());
            Value::Object(body)
        }
    }
}

/// Adaptador sobre backends com operações legadas
pub struct FallbackTransitions<O: VisitOperations + ?Sized> {
    ops: Arc<O>,
}

impl<O: VisitOperations + ?Sized> FallbackTransitions<O> {
    pub fn new(ops: Arc<O>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl<O: VisitOperations + ?Sized> StatusTransitions for FallbackTransitions<O> {
    async fn transition_status(
        &self,
        id: &VisitId,
        status: VisitStatus,
        payload: &TransitionPayload,
    ) -> AppResult<()> {
        payload.validate(status)?;

        let op = resolve_operation(self.ops.as_ref(), status).ok_or_else(|| {
            log_api_error("transition status", "no update operation available");
            AppError::Api(ApiError::Unsupported(format!(
                "nenhuma operação de atualização disponível para '{}'",
                status
            )))
        })?;

        let body = operation_body(op, status, payload);
        self.ops.invoke(op, id, &body).await.map_err(|err| {
            log_api_error(&format!("transition status via {}", op), &err.to_string());
            AppError::Api(err)
        })?;

        log_transition_issued(id.as_str(), status.as_str(), op.as_str());
        Ok(())
    }
}
