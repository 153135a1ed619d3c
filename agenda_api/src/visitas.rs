// ============================================================================
// Visitas - endpoints de visitas comerciais
// ============================================================================
//
// 1. **Leitura:** listagem mensal (`GET /visitas/?ano=&mes=`), devolvida como
//    JSON bruto porque o formato varia entre array e `{results: [...]}`.
//
// 2. **Escrita:** criação (`POST /visitas/`) e edição (`PUT /visitas/{id}/`).
//
// 3. **Status:** cada backend expõe um subconjunto das `UpdateOperation`s.
//    O mapa de rotas vem da configuração; só operações presentes no mapa são
//    anunciadas como suportadas.

use crate::client::AgendaClient;
use crate::error::{ApiError, Result};
use crate::types::{NewVisit, OperationRoute, UpdateOperation, Visit, VisitId};
use serde_json::Value;
use std::collections::BTreeMap;

/// Gerenciador dos endpoints de visitas
#[derive(Clone, Debug)]
pub struct VisitasApi {
    client: AgendaClient,
    operations: BTreeMap<UpdateOperation, OperationRoute>,
}

impl VisitasApi {
    /// Cria a API com apenas `update_status` habilitada (rota padrão)
    pub fn new(client: AgendaClient) -> Self {
        let mut operations = BTreeMap::new();
        operations.insert(
            UpdateOperation::UpdateStatus,
            UpdateOperation::UpdateStatus.default_route(),
        );
        Self { client, operations }
    }

    /// Cria a API a partir de um mapa `nome da operação -> "MÉTODO /caminho/{id}/"`
    ///
    /// Valor vazio usa a rota padrão da operação.
    pub fn with_operations<'a, I>(client: AgendaClient, routes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut operations = BTreeMap::new();
        for (name, spec) in routes {
            let op = UpdateOperation::parse(name).ok_or_else(|| {
                ApiError::ConfigError(format!("Operação de status desconhecida: '{}'", name))
            })?;
            let route = if spec.trim().is_empty() {
                op.default_route()
            } else {
                OperationRoute::parse(spec)?
            };
            operations.insert(op, route);
        }

        if operations.is_empty() {
            tracing::warn!("Nenhuma operação de status configurada; transições vão falhar");
        }

        Ok(Self { client, operations })
    }

    pub fn client(&self) -> &AgendaClient {
        &self.client
    }

    /// Lista as visitas de um mês (corpo bruto)
    ///
    /// `GET /visitas/?ano=YYYY&mes=MM`
    pub async fn list_month(&self, year: i32, month: u32) -> Result<Value> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::ValidationError(format!("Mês inválido: {}", month)));
        }
        let endpoint = format!("/visitas/?ano={}&mes={:02}", year, month);
        self.client.get_json(&endpoint).await
    }

    /// Cria uma visita
    ///
    /// `POST /visitas/`
    pub async fn create(&self, visit: &NewVisit) -> Result<Visit> {
        let body = serde_json::to_value(visit)?;
        let created: Visit = self.client.post_json("/visitas/", &body).await?;
        tracing::info!("Visita criada: {} - Empresa: {}", created.id, created.empresa);
        Ok(created)
    }

    /// Edita os dados de uma visita agendada
    ///
    /// `PUT /visitas/{id}/`
    pub async fn update(&self, id: &VisitId, visit: &NewVisit) -> Result<Visit> {
        let body = serde_json::to_value(visit)?;
        let endpoint = format!("/visitas/{}/", urlencoding::encode(id.as_str()));
        let updated: Visit = self.client.put_json(&endpoint, &body).await?;
        tracing::info!("Visita atualizada: {} - Empresa: {}", updated.id, updated.empresa);
        Ok(updated)
    }

    /// Operação configurada?
    pub fn supports(&self, op: UpdateOperation) -> bool {
        self.operations.contains_key(&op)
    }

    /// Operações configuradas, na ordem do enum
    pub fn supported_operations(&self) -> Vec<UpdateOperation> {
        self.operations.keys().copied().collect()
    }

    /// Executa uma operação de atualização
    pub async fn invoke(&self, op: UpdateOperation, id: &VisitId, body: &Value) -> Result<Value> {
        let route = self
            .operations
            .get(&op)
            .ok_or_else(|| ApiError::Unsupported(op.to_string()))?;

        let endpoint = route.endpoint_for(id.as_str());
        tracing::info!("Visita {}: {} via {} {}", id, op, route.method, endpoint);

        self.client.send_value(route.method.clone(), &endpoint, body).await
    }
}
