//! Painel de visitas
//!
//! Ponto de montagem autocontido: junta store, quadro, diálogos e o serviço de
//! transição. Só é montado com uma sessão autenticada.

use super::api::{VisitApi, VisitOperations};
use super::board::{BoardPresenter, BoardView, DropOutcome, Layout, VisitMove};
use super::modals::{CancelModal, ConfirmModal, CreateEditModal, ModalHost, Submission};
use super::store::{MonthRef, VisitStore};
use super::transition::{FallbackTransitions, StatusTransitions};
use crate::config::BoardSettings;
use crate::session::Session;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use agenda_api::{Usuario, Visit, VisitId, VisitStatus};
use std::sync::Arc;

pub struct VisitBoard {
    usuario: Usuario,
    store: VisitStore<dyn VisitApi>,
    presenter: BoardPresenter,
    modal: ModalHost,
    transitions: Arc<dyn StatusTransitions>,
    banner: Option<String>,
}

impl VisitBoard {
    /// Monta o painel para o usuário da sessão (sem usuário → erro de sessão)
    pub async fn mount(
        session: &Session,
        api: Arc<dyn VisitApi>,
        transitions: Arc<dyn StatusTransitions>,
        settings: &BoardSettings,
    ) -> AppResult<Self> {
        let usuario = session.require_user().await?;
        tracing::info!(
            "Mounting visit board for {} ({})",
            usuario.nome_completo,
            usuario.nivel_acesso
        );

        Ok(Self {
            usuario,
            store: VisitStore::new(api, MonthRef::current()),
            presenter: BoardPresenter::new(settings.viewport_width, settings.breakpoint_px),
            modal: ModalHost::Closed,
            transitions,
            banner: None,
        })
    }

    /// Monta sobre um backend que só anuncia operações legadas de atualização
    pub async fn with_fallback<B>(
        session: &Session,
        backend: Arc<B>,
        settings: &BoardSettings,
    ) -> AppResult<Self>
    where
        B: VisitApi + VisitOperations + 'static,
    {
        let transitions = Arc::new(FallbackTransitions::new(backend.clone()));
        Self::mount(session, backend, transitions, settings).await
    }

    /// Carrega o mês e refaz a projeção
    pub async fn load(&mut self, year: i32, month: u32, filter: &str) {
        self.store.fetch(year, month, filter).await;
        self.sync_from_store();
    }

    pub async fn refetch(&mut self) {
        self.store.refetch().await;
        self.sync_from_store();
    }

    pub async fn set_filter(&mut self, filter: &str) {
        self.store.set_filter(filter).await;
        self.sync_from_store();
    }

    pub async fn previous_month(&mut self) {
        self.store.previous_month().await;
        self.sync_from_store();
    }

    pub async fn next_month(&mut self) {
        self.store.next_month().await;
        self.sync_from_store();
    }

    fn sync_from_store(&mut self) {
        self.presenter.project(self.store.visits());
        self.banner = self.store.error().map(str::to_string);
    }

    pub fn open_create(&mut self) {
        self.modal.open(ModalHost::CreateEdit(CreateEditModal::create()));
    }

    pub fn open_edit(&mut self, id: &VisitId) -> AppResult<()> {
        let modal = CreateEditModal::edit(self.visit_on_board(id)?)?;
        self.modal.open(ModalHost::CreateEdit(modal));
        Ok(())
    }

    pub fn open_cancel(&mut self, id: &VisitId) -> AppResult<()> {
        let id = self.open_visit(id, VisitStatus::Cancelada)?;
        self.modal.open(ModalHost::Cancel(CancelModal::new(id)));
        Ok(())
    }

    pub fn open_confirm(&mut self, id: &VisitId) -> AppResult<()> {
        let id = self.open_visit(id, VisitStatus::Realizada)?;
        self.modal.open(ModalHost::Confirm(ConfirmModal::new(id)));
        Ok(())
    }

    fn visit_on_board(&self, id: &VisitId) -> AppResult<&Visit> {
        self.store.find(id).ok_or_else(|| {
            AppError::ValidationError(format!("Visita {} não está no quadro deste mês.", id))
        })
    }

    fn open_visit(&self, id: &VisitId, target: VisitStatus) -> AppResult<VisitId> {
        let visit = self.visit_on_board(id)?;
        if !visit.status.can_transition_to(target) {
            return Err(AppError::ValidationError(format!(
                "Visita {} já está {}.",
                visit.id, visit.status
            )));
        }
        Ok(visit.id.clone())
    }

    /// Callback de drop do quadro; abre o diálogo correspondente
    pub fn drop_visit(&mut self, mv: &VisitMove) -> DropOutcome {
        let outcome = self.presenter.handle_drop(mv);
        self.open_for_drop(&outcome);
        outcome
    }

    /// Drop que chegou apenas com o fallback em texto
    pub fn drop_text(&mut self, text: &str, to_status: VisitStatus) -> DropOutcome {
        let outcome = self.presenter.handle_text_drop(text, to_status);
        self.open_for_drop(&outcome);
        outcome
    }

    /// Drop com todos os dados anexados ao arrasto (`DragSource::transfer_data`)
    pub fn drop_transfer(&mut self, entries: &[(&str, &str)], to_status: VisitStatus) -> DropOutcome {
        let outcome = self.presenter.handle_transfer_drop(entries, to_status);
        self.open_for_drop(&outcome);
        outcome
    }

    fn open_for_drop(&mut self, outcome: &DropOutcome) {
        match outcome {
            DropOutcome::OpenCancel(id) => {
                self.modal.open(ModalHost::Cancel(CancelModal::new(id.clone())))
            }
            DropOutcome::OpenConfirm(id) => {
                self.modal.open(ModalHost::Confirm(ConfirmModal::new(id.clone())))
            }
            DropOutcome::Ignored(_) => {}
        }
    }

    /// Envia o diálogo aberto
    ///
    /// `Ok(false)` quando nada foi enviado (sem diálogo, envio em andamento ou
    /// validação falhou). Em caso de sucesso o diálogo fecha e o mês é
    /// recarregado; em caso de falha o banner é preenchido e o diálogo
    /// continua aberto com o estado anterior.
    pub async fn submit_modal(&mut self) -> AppResult<bool> {
        let Some(submission) = self.modal.begin_submit() else {
            return Ok(false);
        };

        match self.execute(submission).await {
            Ok(()) => {
                self.modal.finish_submit(true);
                self.refetch().await;
                Ok(true)
            }
            Err(err) => {
                self.modal.finish_submit(false);
                self.banner = Some(err.banner());
                Err(err)
            }
        }
    }

    async fn execute(&self, submission: Submission) -> AppResult<()> {
        match submission {
            Submission::Create(visit) => {
                let saved = self.store.api().create_visit(&visit).await.map_err(|err| {
                    log_api_error("create visit", &err.to_string());
                    AppError::Api(err)
                })?;
                log_visit_saved(saved.id.as_str(), &saved.empresa);
            }
            Submission::Edit(id, visit) => {
                let saved = self.store.api().update_visit(&id, &visit).await.map_err(|err| {
                    log_api_error("update visit", &err.to_string());
                    AppError::Api(err)
                })?;
                log_visit_saved(saved.id.as_str(), &saved.empresa);
            }
            Submission::Transition(id, status, payload) => {
                self.transitions.transition_status(&id, status, &payload).await?;
            }
        }
        Ok(())
    }

    pub fn outside_click(&mut self) -> bool {
        self.modal.outside_click()
    }

    /// Botão de fechar do diálogo (não interrompe um envio em andamento)
    pub fn close_modal(&mut self) {
        if !self.modal.is_submitting() {
            self.modal.close();
        }
    }

    pub fn modal(&self) -> &ModalHost {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ModalHost {
        &mut self.modal
    }

    pub fn resize(&mut self, width: u32) -> Option<Layout> {
        self.presenter.resize(width)
    }

    pub fn toggle_section(&mut self, status: VisitStatus) -> bool {
        self.presenter.toggle_section(status)
    }

    pub fn view(&self) -> BoardView {
        self.presenter.view()
    }

    pub fn presenter(&self) -> &BoardPresenter {
        &self.presenter
    }

    pub fn visits(&self) -> &[Visit] {
        self.store.visits()
    }

    pub fn find(&self, id: &VisitId) -> Option<&Visit> {
        self.store.find(id)
    }

    pub fn period(&self) -> MonthRef {
        self.store.period()
    }

    pub fn filter(&self) -> &str {
        self.store.filter()
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn usuario(&self) -> &Usuario {
        &self.usuario
    }
}
