use crate::database::{execute, fetch_one, queries};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{hash_password, verify_password};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;

#[derive(Clone)]
pub struct RestaurantService {
    pool: Arc<DatabaseConnection>,
}

/// Loads a restaurant or fails with `NotFound`.
pub async fn ensure_restaurant<C: ConnectionTrait>(
    conn: &C,
    restaurant_id: i64,
) -> AppResult<RestaurantRow> {
    fetch_one(conn, queries::CHECK_RESTAURANT, vec![restaurant_id.into()])
        .await?
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))
}

impl RestaurantService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    pub async fn login(&self, request: RestaurantLoginRequest) -> AppResult<RestaurantSummary> {
        let invalid = || AppError::AuthError("Invalid email or password".to_string());

        let restaurant: RestaurantCredentialRow = fetch_one(
            self.pool.as_ref(),
            queries::RESTAURANT_LOGIN,
            vec![request.email.clone().into()],
        )
        .await?
        .ok_or_else(invalid)?;

        // An unreadable stored hash is a failed login like any other.
        let matches = verify_password(&request.password, &restaurant.password)
            .unwrap_or_else(|e| {
                log::warn!("Stored hash of restaurant {} is unusable: {e}", restaurant.id);
                false
            });
        if !matches {
            return Err(invalid());
        }

        log::info!("Restaurant {} logged in", restaurant.id);
        Ok(RestaurantSummary {
            restaurant_id: restaurant.id,
            name: restaurant.name,
            email: restaurant.email,
        })
    }

    pub async fn edit(&self, restaurant_id: i64, changes: RestaurantChanges) -> AppResult<()> {
        if changes.is_empty() {
            return Err(AppError::BadRequest("No data to update".to_string()));
        }

        let password = changes.password.as_deref().map(hash_password).transpose()?;

        let affected = execute(
            self.pool.as_ref(),
            queries::EDIT_RESTAURANT,
            vec![
                changes.name.into(),
                changes.email.into(),
                password.into(),
                restaurant_id.into(),
            ],
        )
        .await
        .map_err(|e| AppError::unique_violation_as_conflict(e, "Email already exists"))?;

        if affected == 0 {
            return Err(AppError::NotFound("Restaurant not found".to_string()));
        }

        log::info!("Restaurant {restaurant_id} updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn login(email: &str, password: &str) -> RestaurantLoginRequest {
        RestaurantLoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let hash = hash_password("secret123").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_credentials_row(
                2,
                "owner@example.com",
                &hash,
            )]])
            .into_connection();
        let service = RestaurantService::new(Arc::new(db));

        let summary = service
            .login(login("owner@example.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(summary.restaurant_id, 2);
        assert_eq!(summary.email, "owner@example.com");
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email() {
        let hash = hash_password("secret123").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_credentials_row(
                2,
                "owner@example.com",
                &hash,
            )]])
            .append_query_results(vec![empty_rows()])
            .into_connection();
        let service = RestaurantService::new(Arc::new(db));

        assert!(matches!(
            service.login(login("owner@example.com", "wrong-pass")).await,
            Err(AppError::AuthError(_))
        ));
        assert!(matches!(
            service.login(login("nobody@example.com", "secret123")).await,
            Err(AppError::AuthError(_))
        ));
    }

    #[tokio::test]
    async fn test_login_with_malformed_stored_hash() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_credentials_row(
                2,
                "owner@example.com",
                "plaintext-leftover",
            )]])
            .into_connection();
        let service = RestaurantService::new(Arc::new(db));

        match service.login(login("owner@example.com", "secret123")).await {
            Err(AppError::AuthError(msg)) => assert_eq!(msg, "Invalid email or password"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_edit_taken_email_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors(vec![unique_violation()])
            .into_connection();
        let service = RestaurantService::new(Arc::new(db));
        let changes = RestaurantChanges {
            email: Some("taken@example.com".into()),
            ..Default::default()
        };

        match service.edit(2, changes).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Email already exists"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_edit_missing_restaurant() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![exec(0)])
            .into_connection();
        let service = RestaurantService::new(Arc::new(db));
        let changes = RestaurantChanges {
            name: Some("New Name".into()),
            ..Default::default()
        };

        assert!(matches!(
            service.edit(42, changes).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_without_changes_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = RestaurantService::new(Arc::new(db));

        assert!(matches!(
            service.edit(2, RestaurantChanges::default()).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_restaurant() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_row(1)]])
            .append_query_results(vec![empty_rows()])
            .into_connection();

        assert_eq!(ensure_restaurant(&db, 1).await.unwrap().id, 1);
        assert!(matches!(
            ensure_restaurant(&db, 9).await,
            Err(AppError::NotFound(_))
        ));
    }
}
