//! Contratos com a API de visitas
//!
//! O quadro depende destes traits, não do cliente HTTP, para poder ser montado
//! sobre qualquer backend (ou um fake em memória nos testes).

use agenda_api::{NewVisit, UpdateOperation, Visit, VisitId, VisitasApi};
use async_trait::async_trait;
use serde_json::Value;

/// Leitura e escrita de visitas
#[async_trait]
pub trait VisitApi: Send + Sync {
    /// Corpo bruto da listagem do mês (array ou `{results: [...]}`)
    async fn fetch_month(&self, year: i32, month: u32) -> agenda_api::Result<Value>;

    async fn create_visit(&self, visit: &NewVisit) -> agenda_api::Result<Visit>;

    async fn update_visit(&self, id: &VisitId, visit: &NewVisit) -> agenda_api::Result<Visit>;
}

/// Operações de atualização de status que o backend anuncia
#[async_trait]
pub trait VisitOperations: Send + Sync {
    fn supports(&self, op: UpdateOperation) -> bool;

    async fn invoke(
        &self,
        op: UpdateOperation,
        id: &VisitId,
        body: &Value,
    ) -> agenda_api::Result<Value>;
}

#[async_trait]
impl VisitApi for VisitasApi {
    async fn fetch_month(&self, year: i32, month: u32) -> agenda_api::Result<Value> {
        self.list_month(year, month).await
    }

    async fn create_visit(&self, visit: &NewVisit) -> agenda_api::Result<Visit> {
        self.create(visit).await
    }

    async fn update_visit(&self, id: &VisitId, visit: &NewVisit) -> agenda_api::Result<Visit> {
        self.update(id, visit).await
    }
}

#[async_trait]
impl VisitOperations for VisitasApi {
    fn supports(&self, op: UpdateOperation) -> bool {
        VisitasApi::supports(self, op)
    }

    async fn invoke(
        &self,
        op: UpdateOperation,
        id: &VisitId,
        body: &Value,
    ) -> agenda_api::Result<Value> {
        VisitasApi::invoke(self, op, id, body).await
    }
}
