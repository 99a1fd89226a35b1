use crate::database::{execute, fetch_one, queries};
use crate::error::{AppError, AppResult};
use crate::external::{PredictionApi, PredictionClient};
use crate::models::{Element, IdRow, PredictionTextRow, UserElementRecord};
use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;

/// Daily prediction cache.
///
/// Each user keeps a single prediction row which is overwritten (text and
/// date) whenever a new one is generated.
#[derive(Clone)]
pub struct PredictionService<P = PredictionClient> {
    pool: Arc<DatabaseConnection>,
    predictor: Arc<P>,
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl<P: PredictionApi> PredictionService<P> {
    pub fn new(pool: Arc<DatabaseConnection>, predictor: Arc<P>) -> Self {
        Self { pool, predictor }
    }

    /// Returns today's prediction, generating and storing it on a miss.
    pub async fn get_or_create(&self, user_id: i64) -> AppResult<String> {
        let user: UserElementRecord =
            fetch_one(self.pool.as_ref(), queries::CHECK_USER_BY_ID, vec![user_id.into()])
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let today = today();
        if let Some(cached) = self.cached(self.pool.as_ref(), user_id, today).await? {
            return Ok(cached);
        }

        let element = user
            .element()
            .ok_or_else(|| AppError::BadRequest("Invalid user element data".to_string()))?;

        let text = self.predictor.narrate(element).await?;
        self.store(self.pool.as_ref(), user_id, today, &text).await?;
        log::info!("Generated prediction for user_id={user_id} element={element}");
        Ok(text)
    }

    /// Same cache-or-generate sequence for an already validated element,
    /// running on `conn` so callers can keep it inside their transaction.
    pub async fn refresh<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
        element: Element,
    ) -> AppResult<String> {
        let today = today();
        if let Some(cached) = self.cached(conn, user_id, today).await? {
            return Ok(cached);
        }
        let text = self.predictor.narrate(element).await?;
        self.store(conn, user_id, today, &text).await?;
        Ok(text)
    }

    async fn cached<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
        date: NaiveDate,
    ) -> AppResult<Option<String>> {
        let row: Option<PredictionTextRow> = fetch_one(
            conn,
            queries::CHECK_PREDICTION,
            vec![user_id.into(), date.into()],
        )
        .await?;
        Ok(row.map(|r| r.prediction_text))
    }

    // Read-then-write: two concurrent misses for one user may both insert.
    async fn store<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
        date: NaiveDate,
        text: &str,
    ) -> AppResult<()> {
        let existing: Option<IdRow> =
            fetch_one(conn, queries::CHECK_ANY_PREDICTION, vec![user_id.into()]).await?;

        if existing.is_some() {
            execute(
                conn,
                queries::UPDATE_PREDICTION,
                vec![text.into(), date.into(), user_id.into()],
            )
            .await?;
        } else {
            execute(
                conn,
                queries::INSERT_PREDICTION,
                vec![user_id.into(), date.into(), text.into()],
            )
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_second_call_same_day_hits_cache() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // first call: user, no prediction today, no prior row
            .append_query_results(vec![vec![user_by_id_row(7, Some("ไฟ"))]])
            .append_query_results(vec![empty_rows()])
            .append_query_results(vec![empty_rows()])
            .append_exec_results(vec![exec(1)])
            // second call: user, today's row now present
            .append_query_results(vec![vec![user_by_id_row(7, Some("ไฟ"))]])
            .append_query_results(vec![vec![prediction_row("วันนี้โชคดี")]])
            .into_connection();

        let stub = Arc::new(StubPredictor::narrating("วันนี้โชคดี"));
        let service = PredictionService::new(Arc::new(db), stub.clone());

        let first = service.get_or_create(7).await.unwrap();
        let second = service.get_or_create(7).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(stub.narrate_calls(), 1);
    }

    #[tokio::test]
    async fn test_existing_row_is_overwritten() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_by_id_row(7, Some("น้ำ"))]])
            .append_query_results(vec![empty_rows()])
            .append_query_results(vec![vec![id_row(3)]])
            .append_exec_results(vec![exec(1)])
            .into_connection();

        let stub = Arc::new(StubPredictor::narrating("ใหม่"));
        let service = PredictionService::new(Arc::new(db), stub.clone());

        assert_eq!(service.get_or_create(7).await.unwrap(), "ใหม่");
        assert_eq!(stub.narrate_calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![empty_rows()])
            .into_connection();
        let stub = Arc::new(StubPredictor::narrating("x"));
        let service = PredictionService::new(Arc::new(db), stub.clone());

        assert!(matches!(
            service.get_or_create(99).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(stub.narrate_calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_element_is_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_by_id_row(7, Some("Fire"))]])
            .append_query_results(vec![empty_rows()])
            .into_connection();
        let stub = Arc::new(StubPredictor::narrating("x"));
        let service = PredictionService::new(Arc::new(db), stub.clone());

        assert!(matches!(
            service.get_or_create(7).await,
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(stub.narrate_calls(), 0);
    }

    #[tokio::test]
    async fn test_narrate_failure_stores_nothing() {
        // no exec results queued: any write would fail the test
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user_by_id_row(7, Some("ดิน"))]])
            .append_query_results(vec![empty_rows()])
            .into_connection();
        let stub = Arc::new(StubPredictor::failing_narrate());
        let service = PredictionService::new(Arc::new(db), stub);

        assert!(matches!(
            service.get_or_create(7).await,
            Err(AppError::ServiceUnavailable(_))
        ));
    }
}
