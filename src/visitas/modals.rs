//! Diálogos do quadro de visitas
//!
//! Três máquinas de estado curtas e independentes (criar/editar, cancelar,
//! confirmar). `ModalHost` guarda no máximo um diálogo aberto por vez.

use super::transition::TransitionPayload;
use crate::utils::logging::log_validation_error;
use crate::utils::{AppError, AppResult};
use agenda_api::{ConfirmOutcome, NewVisit, Visit, VisitId, VisitStatus};
use chrono::{NaiveDate, NaiveTime};

/// Erro de um campo do formulário
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        log_validation_error(field, &message);
        Self { field, message }
    }
}

/// Campos do formulário de visita
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitForm {
    pub empresa: String,
    pub data: String,
    pub hora: String,
    pub obs: String,
}

impl VisitForm {
    fn from_visit(visit: &Visit) -> Self {
        Self {
            empresa: visit.empresa.clone(),
            data: visit.data.clone(),
            hora: visit.hora.clone(),
            obs: visit.obs.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(VisitId),
}

fn valid_hora(hora: &str) -> bool {
    NaiveTime::parse_from_str(hora, "%H:%M").is_ok()
        || NaiveTime::parse_from_str(hora, "%H:%M:%S").is_ok()
}

/// Diálogo de criação/edição
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEditModal {
    pub mode: FormMode,
    pub form: VisitForm,
    errors: Vec<FieldError>,
    submitting: bool,
}

impl CreateEditModal {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            form: VisitForm::default(),
            errors: Vec::new(),
            submitting: false,
        }
    }

    /// Edição só existe para visitas ainda agendadas
    pub fn edit(visit: &Visit) -> AppResult<Self> {
        if !visit.is_editable() {
            return Err(AppError::ValidationError(format!(
                "Visita {} já está {} e não pode ser editada.",
                visit.id, visit.status
            )));
        }
        Ok(Self {
            mode: FormMode::Edit(visit.id.clone()),
            form: VisitForm::from_visit(visit),
            errors: Vec::new(),
            submitting: false,
        })
    }

    /// Valida o formulário; com erros, nada deve ser enviado
    pub fn validate(&mut self) -> Option<NewVisit> {
        let empresa = self.form.empresa.trim();
        let data = self.form.data.trim();
        let hora = self.form.hora.trim();

        let mut errors = Vec::new();
        if empresa.is_empty() {
            errors.push(FieldError::new("empresa", "Informe a empresa."));
        }
        if data.is_empty() {
            errors.push(FieldError::new("data", "Informe a data."));
        } else if NaiveDate::parse_from_str(data, "%Y-%m-%d").is_err() {
            errors.push(FieldError::new("data", "Data inválida (use aaaa-mm-dd)."));
        }
        if hora.is_empty() {
            errors.push(FieldError::new("hora", "Informe a hora."));
        } else if !valid_hora(hora) {
            errors.push(FieldError::new("hora", "Hora inválida (use HH:MM)."));
        }

        self.errors = errors;
        if !self.errors.is_empty() {
            return None;
        }

        Some(NewVisit::new(empresa, data, hora, Some(self.form.obs.clone())))
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

/// Diálogo de cancelamento
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelModal {
    pub visit_id: VisitId,
    pub motivo: String,
    error: Option<String>,
    submitting: bool,
}

impl CancelModal {
    pub fn new(visit_id: VisitId) -> Self {
        Self {
            visit_id,
            motivo: String::new(),
            error: None,
            submitting: false,
        }
    }

    /// Motivo obrigatório (após trim)
    pub fn validate(&mut self) -> Option<TransitionPayload> {
        if self.motivo.trim().is_empty() {
            self.error = Some(FieldError::new("motivo_cancelamento", "Informe o motivo do cancelamento.").message);
            return None;
        }
        self.error = None;
        Some(TransitionPayload::cancel(self.motivo.as_str()))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

/// Campo com foco no diálogo de confirmação
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Resultado,
    Comentario,
}

/// Diálogo de confirmação (visita realizada)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmModal {
    pub visit_id: VisitId,
    pub resultado: ConfirmOutcome,
    pub comentario: String,
    error: Option<String>,
    focus: FocusTarget,
    submitting: bool,
}

impl ConfirmModal {
    pub fn new(visit_id: VisitId) -> Self {
        Self {
            visit_id,
            resultado: ConfirmOutcome::default(),
            comentario: String::new(),
            error: None,
            focus: FocusTarget::Resultado,
            submitting: false,
        }
    }

    /// Comentário obrigatório; em caso de erro o foco volta para ele
    pub fn validate(&mut self) -> Option<TransitionPayload> {
        if self.comentario.trim().is_empty() {
            self.error = Some(FieldError::new("comentario", "Informe um comentário sobre a visita.").message);
            self.focus = FocusTarget::Comentario;
            return None;
        }
        self.error = None;
        Some(TransitionPayload::confirm(self.resultado, self.comentario.as_str()))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn set_focus(&mut self, focus: FocusTarget) {
        self.focus = focus;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

/// O que o diálogo aberto pede para enviar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(NewVisit),
    Edit(VisitId, NewVisit),
    Transition(VisitId, VisitStatus, TransitionPayload),
}

/// Diálogo aberto (no máximo um)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalHost {
    #[default]
    Closed,
    CreateEdit(CreateEditModal),
    Cancel(CancelModal),
    Confirm(ConfirmModal),
}

impl ModalHost {
    pub fn is_open(&self) -> bool {
        !matches!(self, ModalHost::Closed)
    }

    /// Abrir um diálogo substitui o anterior
    pub fn open(&mut self, modal: ModalHost) {
        if self.is_submitting() {
            tracing::warn!("Ignoring modal switch while a submission is in flight");
            return;
        }
        *self = modal;
    }

    pub fn close(&mut self) {
        *self = ModalHost::Closed;
    }

    /// Clique fora do corpo do diálogo; o de confirmação só fecha pelo botão
    pub fn outside_click(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        match self {
            ModalHost::Closed | ModalHost::Confirm(_) => false,
            _ => {
                self.close();
                true
            }
        }
    }

    pub fn is_submitting(&self) -> bool {
        match self {
            ModalHost::Closed => false,
            ModalHost::CreateEdit(m) => m.submitting,
            ModalHost::Cancel(m) => m.submitting,
            ModalHost::Confirm(m) => m.submitting,
        }
    }

    /// Valida o diálogo aberto e marca como enviando
    ///
    /// `None` quando não há diálogo, já existe envio em andamento ou a
    /// validação falhou (o erro fica no próprio diálogo).
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.is_submitting() {
            return None;
        }

        let submission = match self {
            ModalHost::Closed => None,
            ModalHost::CreateEdit(m) => m.validate().map(|visit| match &m.mode {
                FormMode::Create => Submission::Create(visit),
                FormMode::Edit(id) => Submission::Edit(id.clone(), visit),
            }),
            ModalHost::Cancel(m) => m
                .validate()
                .map(|payload| Submission::Transition(m.visit_id.clone(), VisitStatus::Cancelada, payload)),
            ModalHost::Confirm(m) => m
                .validate()
                .map(|payload| Submission::Transition(m.visit_id.clone(), VisitStatus::Realizada, payload)),
        }?;

        self.set_submitting(true);
        Some(submission)
    }

    /// Envio concluído: sucesso fecha, falha reabilita o diálogo
    pub fn finish_submit(&mut self, success: bool) {
        if success {
            self.close();
        } else {
            self.set_submitting(false);
        }
    }

    fn set_submitting(&mut self, value: bool) {
        match self {
            ModalHost::Closed => {}
            ModalHost::CreateEdit(m) => m.submitting = value,
            ModalHost::Cancel(m) => m.submitting = value,
            ModalHost::Confirm(m) => m.submitting = value,
        }
    }
}
