pub mod api;
pub mod board;
pub mod modals;
pub mod painel;
pub mod store;
pub mod transition;

pub use api::{VisitApi, VisitOperations};
pub use board::{
    BoardPresenter, BoardView, Buckets, ColumnView, DragSource, DropOutcome, IgnoreReason, Layout,
    SectionView, Viewport, VisitCard, VisitMove,
};
pub use modals::{
    CancelModal, ConfirmModal, CreateEditModal, FieldError, FocusTarget, FormMode, ModalHost,
    Submission, VisitForm,
};
pub use painel::VisitBoard;
pub use store::{MonthRef, VisitStore};
pub use transition::{FallbackTransitions, StatusTransitions, TransitionPayload};
