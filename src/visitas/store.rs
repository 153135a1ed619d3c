//! Store de visitas do mês exibido
//!
//! Busca a listagem mensal, aplica o filtro por empresa e ordena por
//! `(data, hora)`. O cache é descartável: qualquer mudança de mês ou filtro
//! refaz a busca, e a última busca bem-sucedida é a verdade.

use super::api::VisitApi;
use crate::utils::logging::*;
use crate::utils::{contains_folded, AppError};
use agenda_api::{Visit, VisitListResponse};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// Mês de referência do quadro
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    pub fn new(year: i32, month: u32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) {
            return Err(AppError::ValidationError(format!("Mês inválido: {}", month)));
        }
        Ok(Self { year, month })
    }

    /// Mês corrente (horário local)
    pub fn current() -> Self {
        use chrono::Datelike;
        let today = chrono::Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }
}

impl std::fmt::Display for MonthRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Normaliza o corpo da listagem; formato inesperado vira `None`
pub fn normalize_response(body: Value) -> Option<Vec<Visit>> {
    serde_json::from_value::<VisitListResponse>(body)
        .ok()
        .map(VisitListResponse::into_visits)
}

/// Filtro case-insensitive por substring de `empresa`
pub fn filter_by_empresa(visits: Vec<Visit>, filter: &str) -> Vec<Visit> {
    visits
        .into_iter()
        .filter(|v| contains_folded(&v.empresa, filter))
        .collect()
}

/// Ordena por data e, dentro da mesma data, por hora (ordenação estável)
pub fn sort_visits(visits: &mut [Visit]) {
    visits.sort_by(|a, b| a.schedule_key().cmp(&b.schedule_key()));
}

/// Remove ids repetidos mantendo a primeira ocorrência
fn dedup_by_id(visits: Vec<Visit>) -> Vec<Visit> {
    let mut seen = HashSet::new();
    visits
        .into_iter()
        .filter(|v| {
            let fresh = seen.insert(v.id.clone());
            if !fresh {
                tracing::warn!("Duplicate visit id {} in listing, keeping first", v.id);
            }
            fresh
        })
        .collect()
}

/// Estado do store
pub struct VisitStore<A: VisitApi + ?Sized> {
    api: Arc<A>,
    period: MonthRef,
    filter: String,
    visits: Vec<Visit>,
    error: Option<String>,
    loading: bool,
}

impl<A: VisitApi + ?Sized> VisitStore<A> {
    pub fn new(api: Arc<A>, period: MonthRef) -> Self {
        Self {
            api,
            period,
            filter: String::new(),
            visits: Vec::new(),
            error: None,
            loading: false,
        }
    }

    /// Busca `(ano, mês, filtro)` e substitui o cache
    ///
    /// Nunca falha: erro de transporte deixa a lista vazia e preenche `error()`.
    pub async fn fetch(&mut self, year: i32, month: u32, filter: &str) -> &[Visit] {
        self.filter = filter.to_string();

        let period = match MonthRef::new(year, month) {
            Ok(period) => period,
            Err(err) => {
                log_validation_error("mes", &err.to_string());
                self.visits.clear();
                self.error = Some(err.banner());
                return &self.visits;
            }
        };
        self.period = period;
        self.loading = true;

        let result = self.api.fetch_month(period.year, period.month).await;
        self.loading = false;

        match result {
            Ok(body) => {
                let all = normalize_response(body).unwrap_or_else(|| {
                    log_unexpected_shape(period.year, period.month);
                    Vec::new()
                });
                let total = all.len();

                let mut visits = filter_by_empresa(dedup_by_id(all), &self.filter);
                sort_visits(&mut visits);

                log_visits_fetched(period.year, period.month, total, visits.len());
                self.visits = visits;
                self.error = None;
            }
            Err(err) => {
                log_api_error("list visits", &err.to_string());
                self.visits.clear();
                self.error = Some(AppError::from(err).banner());
            }
        }

        &self.visits
    }

    /// Refaz a busca com o mês e filtro atuais
    pub async fn refetch(&mut self) -> &[Visit] {
        let MonthRef { year, month } = self.period;
        let filter = self.filter.clone();
        self.fetch(year, month, &filter).await
    }

    pub async fn set_filter(&mut self, filter: &str) -> &[Visit] {
        let MonthRef { year, month } = self.period;
        self.fetch(year, month, filter).await
    }

    pub async fn previous_month(&mut self) -> &[Visit] {
        let MonthRef { year, month } = self.period.previous();
        let filter = self.filter.clone();
        self.fetch(year, month, &filter).await
    }

    pub async fn next_month(&mut self) -> &[Visit] {
        let MonthRef { year, month } = self.period.next();
        let filter = self.filter.clone();
        self.fetch(year, month, &filter).await
    }

    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn find(&self, id: &agenda_api::VisitId) -> Option<&Visit> {
        self.visits.iter().find(|v| &v.id == id)
    }

    pub fn period(&self) -> MonthRef {
        self.period
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_api::{ApiError, NewVisit, VisitId};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// `body = None` simula falha de transporte
    struct StubApi {
        body: Option<Value>,
        calls: Mutex<Vec<(i32, u32)>>,
    }

    impl StubApi {
        fn ok(body: Value) -> Arc<Self> {
            Arc::new(Self {
                body: Some(body),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                body: None,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VisitApi for StubApi {
        async fn fetch_month(&self, year: i32, month: u32) -> agenda_api::Result<Value> {
            self.calls.lock().unwrap().push((year, month));
            self.body.clone().ok_or_else(|| ApiError::ApiError {
                status: 502,
                message: "gateway".into(),
            })
        }

        async fn create_visit(&self, _visit: &NewVisit) -> agenda_api::Result<Visit> {
            unreachable!()
        }

        async fn update_visit(&self, _id: &VisitId, _visit: &NewVisit) -> agenda_api::Result<Visit> {
            unreachable!()
        }
    }

    fn visit(id: i64, empresa: &str, data: &str, hora: &str) -> Value {
        json!({"id": id, "empresa": empresa, "data": data, "hora": hora, "status": "agendado"})
    }

    fn ids(visits: &[Visit]) -> Vec<&str> {
        visits.iter().map(|v| v.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_display_order_by_data_then_hora() {
        let api = StubApi::ok(json!([
            visit(1, "Acme", "2025-10-05", "09:00"),
            visit(2, "Acme", "2025-10-03", "14:00"),
        ]));
        let mut store = VisitStore::new(api, MonthRef::new(2025, 10).unwrap());

        let visits = store.fetch(2025, 10, "").await;
        assert_eq!(ids(visits), vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_same_day_ordered_by_hora() {
        let api = StubApi::ok(json!({"results": [
            visit(1, "A", "2025-10-03", "16:30"),
            visit(2, "B", "2025-10-03", "08:15:00"),
            visit(3, "C", "2025-10-01", "18:00"),
            visit(4, "D", "2025-10-03", "08:15"),
        ]}));
        let mut store = VisitStore::new(api, MonthRef::new(2025, 10).unwrap());
        let visits = store.fetch(2025, 10, "").await;

        assert_eq!(ids(visits), vec!["3", "4", "2", "1"]);
        for pair in visits.windows(2) {
            assert!(pair[0].schedule_key() <= pair[1].schedule_key());
        }
    }

    #[tokio::test]
    async fn test_filter_is_case_insensitive_substring() {
        let api = StubApi::ok(json!([
            visit(1, "ACME Seguros", "2025-10-01", "09:00"),
            visit(2, "Beta Consórcios", "2025-10-02", "09:00"),
            visit(3, "acme", "2025-10-03", "09:00"),
        ]));
        let mut store = VisitStore::new(api, MonthRef::new(2025, 10).unwrap());

        assert_eq!(ids(store.fetch(2025, 10, "Acme").await), vec!["1", "3"]);
        assert_eq!(ids(store.set_filter("CONSÓR").await), vec!["2"]);
        assert_eq!(store.set_filter("").await.len(), 3);
        assert!(store.set_filter("zeta").await.is_empty());
    }

    #[tokio::test]
    async fn test_filter_keeps_spaces() {
        let api = StubApi::ok(json!([
            visit(1, "Acme", "2025-10-01", "09:00"),
            visit(2, "Acme Seguros", "2025-10-02", "09:00"),
        ]));
        let mut store = VisitStore::new(api, MonthRef::new(2025, 10).unwrap());

        assert_eq!(ids(store.fetch(2025, 10, "acme ").await), vec!["2"]);
        assert_eq!(store.filter(), "acme ");
    }

    #[tokio::test]
    async fn test_malformed_rows_do_not_empty_the_month() {
        let api = StubApi::ok(json!([
            {"id": 1, "empresa": "Acme", "data": "2025-10-05", "hora": "09:00",
             "obs": "a", "observacao": "a", "status": "agendado"},
            {"id": 2, "empresa": "Beta", "data": "2025-10-03", "hora": null, "status": "agendado"},
            {"id": 3, "empresa": null, "data": "2025-10-04", "hora": "10:00", "status": "realizada"},
            {"empresa": "sem id", "data": "2025-10-01"},
        ]));
        let mut store = VisitStore::new(api, MonthRef::new(2025, 10).unwrap());

        let visits = store.fetch(2025, 10, "").await;
        assert_eq!(ids(visits), vec!["2", "3", "1"]);
        assert_eq!(visits[2].obs.as_deref(), Some("a"));
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_empty_without_error() {
        let api = StubApi::ok(json!({"data": [visit(1, "A", "2025-10-01", "09:00")]}));
        let mut store = VisitStore::new(api, MonthRef::new(2025, 10).unwrap());

        assert!(store.fetch(2025, 10, "").await.is_empty());
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_transport_error_empties_list_and_sets_banner() {
        let api = StubApi::failing();
        let mut store = VisitStore::new(api.clone(), MonthRef::new(2025, 10).unwrap());

        assert!(store.fetch(2025, 10, "").await.is_empty());
        assert_eq!(store.error(), Some("O servidor recusou a operação: gateway"));
        assert!(!store.is_loading());
        // nenhuma repetição automática
        assert_eq!(api.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_month_makes_no_request() {
        let api = StubApi::ok(json!([]));
        let mut store = VisitStore::new(api.clone(), MonthRef::new(2025, 10).unwrap());

        store.fetch(2025, 0, "").await;
        assert!(store.error().unwrap().contains("Mês inválido"));
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_month_navigation_rolls_over_year() {
        let api = StubApi::ok(json!([]));
        let mut store = VisitStore::new(api.clone(), MonthRef::new(2025, 1).unwrap());

        store.fetch(2025, 1, "x").await;
        store.previous_month().await;
        assert_eq!(store.period(), MonthRef { year: 2024, month: 12 });
        store.next_month().await;
        store.next_month().await;
        assert_eq!(store.period(), MonthRef { year: 2025, month: 2 });
        assert_eq!(store.filter(), "x");

        assert_eq!(
            *api.calls.lock().unwrap(),
            vec![(2025, 1), (2024, 12), (2025, 1), (2025, 2)]
        );
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_dropped() {
        let api = StubApi::ok(json!([
            visit(1, "A", "2025-10-01", "09:00"),
            visit(1, "A (cópia)", "2025-10-02", "09:00"),
        ]));
        let mut store = VisitStore::new(api, MonthRef::new(2025, 10).unwrap());
        let visits = store.fetch(2025, 10, "").await;
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].empresa, "A");
    }

    #[test]
    fn test_month_ref_display() {
        assert_eq!(MonthRef::new(2025, 3).unwrap().to_string(), "03/2025");
        assert!(MonthRef::new(2025, 13).is_err());
    }
}
