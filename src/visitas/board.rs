//! Quadro de visitas (kanban / acordeão)
//!
//! Uma única projeção (`Buckets`, visitas agrupadas por status) com duas
//! apresentações intercambiáveis escolhidas pela largura do viewport:
//! colunas com arrastar-e-soltar em telas largas, seções recolhíveis em telas
//! estreitas.

use crate::utils::logging::*;
use crate::utils::string_utils::{format_data_br, format_hora, preview};
use agenda_api::{Visit, VisitId, VisitStatus};
use serde::{Deserialize, Serialize};

/// Tipo MIME do payload tipado de arrasto
pub const VISIT_MOVE_MIME: &str = "application/x-visit-move";

/// Prefixo do fallback em texto puro (`visit-move:<id>`)
pub const VISIT_MOVE_TEXT_PREFIX: &str = "visit-move:";

/// Tipo do fallback em texto
pub const TEXT_PLAIN_MIME: &str = "text/plain";

const OBS_PREVIEW_CHARS: usize = 80;

/// Visitas agrupadas por status, preservando a ordem do store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buckets {
    agendado: Vec<Visit>,
    realizada: Vec<Visit>,
    cancelada: Vec<Visit>,
}

impl Buckets {
    pub fn partition(visits: &[Visit]) -> Self {
        let mut buckets = Self::default();
        for visit in visits {
            // status desconhecido já chega como Agendado (ver VisitStatus::deserialize)
            let bucket = match visit.status {
                VisitStatus::Agendado => &mut buckets.agendado,
                VisitStatus::Realizada => &mut buckets.realizada,
                VisitStatus::Cancelada => &mut buckets.cancelada,
            };
            bucket.push(visit.clone());
        }
        buckets
    }

    pub fn get(&self, status: VisitStatus) -> &[Visit] {
        match status {
            VisitStatus::Agendado => &self.agendado,
            VisitStatus::Realizada => &self.realizada,
            VisitStatus::Cancelada => &self.cancelada,
        }
    }

    pub fn count(&self, status: VisitStatus) -> usize {
        self.get(status).len()
    }

    pub fn find(&self, id: &VisitId) -> Option<&Visit> {
        VisitStatus::ALL
            .into_iter()
            .flat_map(|status| self.get(status))
            .find(|v| &v.id == id)
    }
}

/// Estratégia de apresentação
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Columns,
    Accordion,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Columns => "columns",
            Layout::Accordion => "accordion",
        }
    }
}

/// Largura atual e breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub breakpoint: u32,
}

impl Viewport {
    pub fn new(width: u32, breakpoint: u32) -> Self {
        Self { width, breakpoint }
    }

    /// Abaixo do breakpoint é acordeão
    pub fn layout(&self) -> Layout {
        if self.width < self.breakpoint {
            Layout::Accordion
        } else {
            Layout::Columns
        }
    }
}

/// Cartão de visita pronto para exibição
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitCard {
    pub id: VisitId,
    pub status: VisitStatus,
    pub empresa: String,
    pub data: String,
    pub hora: String,
    pub obs: Option<String>,
    pub responsavel: Option<String>,
    pub motivo_cancelamento: Option<String>,
    pub draggable: bool,
    pub can_edit: bool,
    pub can_cancel: bool,
    pub can_confirm: bool,
}

impl From<&Visit> for VisitCard {
    fn from(visit: &Visit) -> Self {
        let open = visit.is_editable();
        Self {
            id: visit.id.clone(),
            status: visit.status,
            empresa: visit.empresa.clone(),
            data: format_data_br(&visit.data),
            hora: format_hora(&visit.hora).to_string(),
            obs: visit
                .obs
                .as_deref()
                .filter(|o| !o.trim().is_empty())
                .map(|o| preview(o, OBS_PREVIEW_CHARS)),
            responsavel: visit.responsavel_nome().map(str::to_string),
            motivo_cancelamento: visit.motivo_cancelamento.clone(),
            draggable: open,
            can_edit: open,
            can_cancel: open,
            can_confirm: open,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub status: VisitStatus,
    pub title: &'static str,
    pub count: usize,
    /// Coluna aceita soltar cartões (somente colunas terminais)
    pub drop_target: bool,
    pub cards: Vec<VisitCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionView {
    pub status: VisitStatus,
    pub title: &'static str,
    pub count: usize,
    pub expanded: bool,
    pub cards: Vec<VisitCard>,
}

/// Quadro renderizado em uma das duas apresentações
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "layout", content = "groups", rename_all = "lowercase")]
pub enum BoardView {
    Columns(Vec<ColumnView>),
    Accordion(Vec<SectionView>),
}

/// Origem de um arrasto: só existe para cartões "agendado"
///
/// No payload tipado serializa como `{"kind": "visit-move", "visit_id": .., "from_status": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "visit-move")]
pub struct DragSource {
    pub visit_id: VisitId,
    pub from_status: VisitStatus,
}

impl DragSource {
    /// Mensagem tipada ao soltar numa coluna
    pub fn drop_on(&self, to_status: VisitStatus) -> VisitMove {
        VisitMove {
            visit_id: self.visit_id.clone(),
            from_status: self.from_status,
            to_status,
        }
    }

    /// Dados anexados ao arrasto, do mais específico ao fallback
    pub fn transfer_data(&self) -> Vec<(&'static str, String)> {
        let typed = serde_json::to_string(self).unwrap_or_default();
        vec![(VISIT_MOVE_MIME, typed), (TEXT_PLAIN_MIME, self.text_payload())]
    }

    /// Recupera o id dos dados de um drop: tipado primeiro, depois texto
    pub fn from_transfer(entries: &[(&str, &str)]) -> Option<VisitId> {
        let typed = entries
            .iter()
            .filter(|(mime, _)| *mime == VISIT_MOVE_MIME)
            .find_map(|(_, data)| serde_json::from_str::<DragSource>(data).ok())
            .map(|source| source.visit_id);

        typed.or_else(|| {
            entries
                .iter()
                .filter(|(mime, _)| *mime == TEXT_PLAIN_MIME)
                .find_map(|(_, data)| Self::parse_text_payload(data))
        })
    }

    /// Fallback em texto para handlers genéricos
    pub fn text_payload(&self) -> String {
        format!("{}{}", VISIT_MOVE_TEXT_PREFIX, self.visit_id)
    }

    /// Recupera o id a partir do fallback em texto (aceita id puro)
    pub fn parse_text_payload(text: &str) -> Option<VisitId> {
        let text = text.trim();
        let id = text.strip_prefix(VISIT_MOVE_TEXT_PREFIX).unwrap_or(text).trim();
        (!id.is_empty()).then(|| VisitId::new(id))
    }
}

/// Movimento de um cartão entre colunas
///
/// Serializa como `{"kind": "visit-move", "visit_id": .., "from_status": .., "to_status": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "visit-move")]
pub struct VisitMove {
    pub visit_id: VisitId,
    pub from_status: VisitStatus,
    pub to_status: VisitStatus,
}

/// Motivo de um drop ignorado
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    UnknownVisit,
    NotDraggable,
    SameColumn,
    BackToAgendado,
}

impl IgnoreReason {
    fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::UnknownVisit => "visit not on board",
            IgnoreReason::NotDraggable => "visit already in terminal status",
            IgnoreReason::SameColumn => "dropped on source column",
            IgnoreReason::BackToAgendado => "agendado is not a drop target",
        }
    }
}

/// Resultado de soltar um cartão
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Ignored(IgnoreReason),
    OpenCancel(VisitId),
    OpenConfirm(VisitId),
}

/// Estado de apresentação do quadro
#[derive(Debug, Clone)]
pub struct BoardPresenter {
    viewport: Viewport,
    buckets: Buckets,
    expanded: [bool; 3],
}

impl BoardPresenter {
    pub fn new(width: u32, breakpoint: u32) -> Self {
        Self {
            viewport: Viewport::new(width, breakpoint),
            buckets: Buckets::default(),
            // acordeão abre com "agendado" expandido
            expanded: [true, false, false],
        }
    }

    /// Recalcula a projeção a partir da lista do store
    pub fn project(&mut self, visits: &[Visit]) {
        self.buckets = Buckets::partition(visits);
    }

    /// Atualiza a largura; retorna o novo layout quando ele muda
    pub fn resize(&mut self, width: u32) -> Option<Layout> {
        let before = self.viewport.layout();
        self.viewport.width = width;
        let after = self.viewport.layout();
        if before != after {
            log_layout_changed(after.as_str(), width);
            Some(after)
        } else {
            None
        }
    }

    pub fn layout(&self) -> Layout {
        self.viewport.layout()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn toggle_section(&mut self, status: VisitStatus) -> bool {
        let slot = &mut self.expanded[section_index(status)];
        *slot = !*slot;
        *slot
    }

    pub fn is_expanded(&self, status: VisitStatus) -> bool {
        self.expanded[section_index(status)]
    }

    /// Início do arrasto; `None` para cartões que não podem ser arrastados
    pub fn drag_start(&self, id: &VisitId) -> Option<DragSource> {
        let visit = self.buckets.find(id)?;
        visit.is_editable().then(|| DragSource {
            visit_id: visit.id.clone(),
            from_status: visit.status,
        })
    }

    /// Trata um drop tipado
    ///
    /// O status de origem é conferido contra a projeção atual, não contra a mensagem.
    pub fn handle_drop(&self, mv: &VisitMove) -> DropOutcome {
        let outcome = self.resolve_drop(&mv.visit_id, mv.to_status);
        if let DropOutcome::Ignored(reason) = outcome {
            log_drop_ignored(mv.visit_id.as_str(), reason.as_str());
        }
        outcome
    }

    /// Trata um drop que só carrega o fallback em texto
    pub fn handle_text_drop(&self, text: &str, to_status: VisitStatus) -> DropOutcome {
        self.drop_by_id(DragSource::parse_text_payload(text), to_status)
    }

    /// Trata um drop com os dados de `DragSource::transfer_data`
    pub fn handle_transfer_drop(&self, entries: &[(&str, &str)], to_status: VisitStatus) -> DropOutcome {
        self.drop_by_id(DragSource::from_transfer(entries), to_status)
    }

    fn drop_by_id(&self, id: Option<VisitId>, to_status: VisitStatus) -> DropOutcome {
        match id {
            Some(id) => {
                let from_status = self
                    .buckets
                    .find(&id)
                    .map(|v| v.status)
                    .unwrap_or_default();
                self.handle_drop(&VisitMove {
                    visit_id: id,
                    from_status,
                    to_status,
                })
            }
            None => DropOutcome::Ignored(IgnoreReason::UnknownVisit),
        }
    }

    fn resolve_drop(&self, id: &VisitId, to_status: VisitStatus) -> DropOutcome {
        let Some(visit) = self.buckets.find(id) else {
            return DropOutcome::Ignored(IgnoreReason::UnknownVisit);
        };

        if !visit.is_editable() {
            return DropOutcome::Ignored(IgnoreReason::NotDraggable);
        }
        if visit.status == to_status {
            return DropOutcome::Ignored(IgnoreReason::SameColumn);
        }

        match to_status {
            VisitStatus::Agendado => DropOutcome::Ignored(IgnoreReason::BackToAgendado),
            VisitStatus::Cancelada => DropOutcome::OpenCancel(visit.id.clone()),
            VisitStatus::Realizada => DropOutcome::OpenConfirm(visit.id.clone()),
        }
    }

    /// Renderiza no layout atual
    pub fn view(&self) -> BoardView {
        self.view_as(self.layout())
    }

    /// Renderiza num layout específico
    pub fn view_as(&self, layout: Layout) -> BoardView {
        let cards = |status: VisitStatus| -> Vec<VisitCard> {
            self.buckets.get(status).iter().map(VisitCard::from).collect()
        };

        match layout {
            Layout::Columns => BoardView::Columns(
                VisitStatus::ALL
                    .into_iter()
                    .map(|status| ColumnView {
                        status,
                        title: status.label(),
                        count: self.buckets.count(status),
                        drop_target: status.is_terminal(),
                        cards: cards(status),
                    })
                    .collect(),
            ),
            Layout::Accordion => BoardView::Accordion(
                VisitStatus::ALL
                    .into_iter()
                    .map(|status| SectionView {
                        status,
                        title: status.label(),
                        count: self.buckets.count(status),
                        expanded: self.is_expanded(status),
                        cards: cards(status),
                    })
                    .collect(),
            ),
        }
    }
}

fn section_index(status: VisitStatus) -> usize {
    match status {
        VisitStatus::Agendado => 0,
        VisitStatus::Realizada => 1,
        VisitStatus::Cancelada => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn visits() -> Vec<Visit> {
        serde_json::from_value(json!([
            {"id": 1, "empresa": "Acme", "data": "2025-10-03", "hora": "14:00:00", "status": "agendado"},
            {"id": 2, "empresa": "Beta", "data": "2025-10-04", "hora": "09:00", "status": "realizada"},
            {"id": 3, "empresa": "Gama", "data": "2025-10-05", "hora": "10:00", "status": "cancelada",
             "motivo_cancelamento": "cliente indisponível"},
            {"id": 4, "empresa": "Delta", "data": "2025-10-06", "hora": "11:00", "status": "em_analise"},
        ]))
        .unwrap()
    }

    fn presenter() -> BoardPresenter {
        let mut presenter = BoardPresenter::new(1280, 768);
        presenter.project(&visits());
        presenter
    }

    #[test]
    fn test_partition_preserves_order_and_defaults_unknown() {
        let buckets = Buckets::partition(&visits());
        let agendado: Vec<_> = buckets.get(VisitStatus::Agendado).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(agendado, vec!["1", "4"]);
        assert_eq!(buckets.count(VisitStatus::Realizada), 1);
        assert_eq!(buckets.count(VisitStatus::Cancelada), 1);
    }

    #[test]
    fn test_layout_follows_breakpoint() {
        let mut presenter = presenter();
        assert_eq!(presenter.layout(), Layout::Columns);
        assert_eq!(presenter.resize(767), Some(Layout::Accordion));
        assert_eq!(presenter.resize(500), None);
        assert_eq!(presenter.resize(768), Some(Layout::Columns));
    }

    #[test]
    fn test_drop_on_terminal_columns_opens_modals() {
        let presenter = presenter();
        let source = presenter.drag_start(&VisitId::new("1")).unwrap();

        assert_eq!(
            presenter.handle_drop(&source.drop_on(VisitStatus::Cancelada)),
            DropOutcome::OpenCancel(VisitId::new("1"))
        );
        assert_eq!(
            presenter.handle_drop(&source.drop_on(VisitStatus::Realizada)),
            DropOutcome::OpenConfirm(VisitId::new("1"))
        );
        assert_eq!(
            presenter.handle_drop(&source.drop_on(VisitStatus::Agendado)),
            DropOutcome::Ignored(IgnoreReason::SameColumn)
        );
    }

    #[test]
    fn test_terminal_visits_cannot_move() {
        let presenter = presenter();
        assert!(presenter.drag_start(&VisitId::new("2")).is_none());
        assert!(presenter.drag_start(&VisitId::new("3")).is_none());

        // mensagem forjada com from_status "agendado" continua sendo ignorada
        for target in VisitStatus::ALL {
            let mv = VisitMove {
                visit_id: VisitId::new("3"),
                from_status: VisitStatus::Agendado,
                to_status: target,
            };
            assert_eq!(
                presenter.handle_drop(&mv),
                DropOutcome::Ignored(IgnoreReason::NotDraggable)
            );
        }
    }

    #[test]
    fn test_text_fallback_drop() {
        let presenter = presenter();
        let source = presenter.drag_start(&VisitId::new("4")).unwrap();
        assert_eq!(source.text_payload(), "visit-move:4");

        assert_eq!(
            presenter.handle_text_drop(&source.text_payload(), VisitStatus::Realizada),
            DropOutcome::OpenConfirm(VisitId::new("4"))
        );
        assert_eq!(
            presenter.handle_text_drop("4", VisitStatus::Cancelada),
            DropOutcome::OpenCancel(VisitId::new("4"))
        );
        assert_eq!(
            presenter.handle_text_drop("visit-move:", VisitStatus::Cancelada),
            DropOutcome::Ignored(IgnoreReason::UnknownVisit)
        );
        assert_eq!(
            presenter.handle_text_drop("99", VisitStatus::Cancelada),
            DropOutcome::Ignored(IgnoreReason::UnknownVisit)
        );
    }

    #[test]
    fn test_transfer_data_prefers_typed_payload() {
        let presenter = presenter();
        let source = presenter.drag_start(&VisitId::new("1")).unwrap();

        let data = source.transfer_data();
        assert_eq!(data[0].0, VISIT_MOVE_MIME);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&data[0].1).unwrap(),
            json!({"kind": "visit-move", "visit_id": "1", "from_status": "agendado"})
        );
        assert_eq!(data[1], (TEXT_PLAIN_MIME, "visit-move:1".to_string()));

        let entries: Vec<(&str, &str)> = data.iter().map(|(m, d)| (*m, d.as_str())).collect();
        assert_eq!(
            presenter.handle_transfer_drop(&entries, VisitStatus::Cancelada),
            DropOutcome::OpenCancel(VisitId::new("1"))
        );

        // tipado vence o texto quando os dois divergem
        let mixed = [(TEXT_PLAIN_MIME, "visit-move:4"), (VISIT_MOVE_MIME, data[0].1.as_str())];
        assert_eq!(DragSource::from_transfer(&mixed), Some(VisitId::new("1")));

        // payload tipado corrompido cai no texto
        let broken = [(VISIT_MOVE_MIME, "{"), (TEXT_PLAIN_MIME, "4")];
        assert_eq!(
            presenter.handle_transfer_drop(&broken, VisitStatus::Realizada),
            DropOutcome::OpenConfirm(VisitId::new("4"))
        );

        let foreign = [("text/uri-list", "https://example.com")];
        assert_eq!(
            presenter.handle_transfer_drop(&foreign, VisitStatus::Cancelada),
            DropOutcome::Ignored(IgnoreReason::UnknownVisit)
        );
    }

    #[test]
    fn test_visit_move_wire_format() {
        let mv = VisitMove {
            visit_id: VisitId::new("1"),
            from_status: VisitStatus::Agendado,
            to_status: VisitStatus::Cancelada,
        };
        assert_eq!(
            serde_json::to_value(&mv).unwrap(),
            json!({"kind": "visit-move", "visit_id": "1", "from_status": "agendado", "to_status": "cancelada"})
        );
    }

    #[test]
    fn test_cards_hide_actions_for_terminal_visits() {
        let BoardView::Columns(columns) = presenter().view() else {
            panic!("esperava colunas");
        };

        let agendado = &columns[0];
        assert_eq!(agendado.count, 2);
        assert!(!agendado.drop_target);
        let card = &agendado.cards[0];
        assert!(card.draggable && card.can_edit && card.can_cancel && card.can_confirm);
        assert_eq!(card.data, "03/10/2025");
        assert_eq!(card.hora, "14:00");

        for column in &columns[1..] {
            assert!(column.drop_target);
            for card in &column.cards {
                assert!(!card.draggable && !card.can_edit && !card.can_cancel && !card.can_confirm);
            }
        }
        assert_eq!(
            columns[2].cards[0].motivo_cancelamento.as_deref(),
            Some("cliente indisponível")
        );
    }

    #[test]
    fn test_accordion_sections_toggle() {
        let mut presenter = presenter();
        presenter.resize(400);

        let BoardView::Accordion(sections) = presenter.view() else {
            panic!("esperava acordeão");
        };
        assert!(sections[0].expanded);
        assert!(!sections[1].expanded);

        assert!(presenter.toggle_section(VisitStatus::Realizada));
        assert!(!presenter.toggle_section(VisitStatus::Agendado));
        assert!(presenter.is_expanded(VisitStatus::Realizada));
    }

    #[test]
    fn test_both_layouts_share_projection() {
        let presenter = presenter();
        let (BoardView::Columns(columns), BoardView::Accordion(sections)) =
            (presenter.view_as(Layout::Columns), presenter.view_as(Layout::Accordion))
        else {
            panic!("layouts inesperados");
        };
        for (column, section) in columns.iter().zip(&sections) {
            assert_eq!(column.status, section.status);
            assert_eq!(column.cards, section.cards);
        }
    }
}
