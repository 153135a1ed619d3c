//! Tipos da API do back-office
//!
//! - **Visit**: visita comercial (única entidade com ciclo de vida)
//! - **VisitStatus**: agendado → realizada | cancelada
//! - **ConfirmOutcome**: resultado informado ao confirmar
//! - **UpdateOperation**: operações de atualização que o backend pode expor
//! - **Usuario**: usuário da sessão
//!
//! ## ⚠️ Notas Importantes
//!
//! - **Status desconhecido**: tratado como "agendado"
//! - **Listagem**: pode vir como array ou como `{results: [...]}`

pub mod operation;
pub mod status;
pub mod usuario;
pub mod visit;

pub use operation::{OperationRoute, UpdateOperation};
pub use status::{ConfirmOutcome, VisitStatus};
pub use usuario::Usuario;
pub use visit::{NewVisit, Responsavel, Visit, VisitId, VisitListResponse};
