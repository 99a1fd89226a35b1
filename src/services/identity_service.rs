use super::prediction_service::PredictionService;
use super::restaurant_service::ensure_restaurant;
use crate::database::{execute, fetch_all, fetch_one, queries};
use crate::error::{AppError, AppResult};
use crate::external::{PredictionApi, PredictionClient};
use crate::models::*;
use sea_orm::{
    ActiveEnum, ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait,
};
use std::sync::Arc;

/// LINE identity registration and profile maintenance.
#[derive(Clone)]
pub struct IdentityService<P = PredictionClient> {
    pool: Arc<DatabaseConnection>,
    predictor: Arc<P>,
    predictions: PredictionService<P>,
}

impl<P: PredictionApi> IdentityService<P> {
    pub fn new(pool: Arc<DatabaseConnection>, predictor: Arc<P>) -> Self {
        let predictions = PredictionService::new(pool.clone(), predictor.clone());
        Self {
            pool,
            predictor,
            predictions,
        }
    }

    pub async fn lookup(&self, request: LineUidCheckRequest) -> AppResult<LookupOutcome> {
        ensure_restaurant(self.pool.as_ref(), request.restaurant_id).await?;

        let user: Option<UserRecord> = fetch_one(
            self.pool.as_ref(),
            queries::CHECK_USER,
            vec![request.line_uid.into(), request.restaurant_id.into()],
        )
        .await?;

        Ok(match user {
            None => LookupOutcome::NeedsRegistration,
            Some(user) => LookupOutcome::Found(LoginProfile {
                bazi: user.element_profile(),
                user: UserSummary {
                    id: user.id,
                    line_uid: user.line_uid,
                    name: user.name,
                },
            }),
        })
    }

    /// Creates the user and their element profile in one transaction. Any
    /// failure, including the chart call, leaves nothing behind.
    pub async fn register(&self, new_user: NewUser) -> AppResult<RegisterResponse> {
        let (line_uid, restaurant_id) = (new_user.line_uid.clone(), new_user.restaurant_id);
        self.create_user(new_user).await.inspect_err(|e| {
            if e.is_internal() {
                log::error!(
                    "register failed for line_uid={line_uid} restaurant_id={restaurant_id}: {e}"
                );
            }
        })
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<RegisterResponse> {
        let txn = self.pool.begin().await?;

        ensure_restaurant(&txn, new_user.restaurant_id).await?;

        let existing: Option<IdRow> = fetch_one(
            &txn,
            queries::CHECK_USER,
            vec![
                new_user.line_uid.clone().into(),
                new_user.restaurant_id.into(),
            ],
        )
        .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("User already registered".to_string()));
        }

        let birth = &new_user.birth;
        let inserted: IdRow = fetch_one(
            &txn,
            queries::CREATE_USER,
            vec![
                new_user.line_uid.clone().into(),
                new_user.restaurant_id.into(),
                new_user.name.clone().into(),
                new_user.gender.to_value().into(),
                new_user.phone.clone().into(),
                birth.date.into(),
                birth.time.into(),
                birth.place.clone().into(),
            ],
        )
        .await
        .map_err(|e| AppError::unique_violation_as_conflict(e, "User already registered"))?
        .ok_or_else(|| AppError::InternalError("User insert returned no id".to_string()))?;

        let bazi = self
            .predictor
            .chart(&birth.chart_request(&new_user.name))
            .await?;

        insert_element(&txn, inserted.id, &bazi).await?;
        txn.commit().await?;

        log::info!(
            "Registered user_id={} restaurant_id={} element={}",
            inserted.id,
            new_user.restaurant_id,
            bazi.main_element
        );

        Ok(RegisterResponse {
            user: UserSummary {
                id: inserted.id,
                line_uid: new_user.line_uid,
                name: new_user.name,
            },
            bazi,
        })
    }

    /// Applies a partial profile update. The element profile is recomputed
    /// only when a birth field actually changes.
    pub async fn edit_profile(&self, edit: ProfileEdit) -> AppResult<EditProfileResponse> {
        let (line_uid, restaurant_id) = (edit.line_uid.clone(), edit.restaurant_id);
        self.update_profile(edit).await.inspect_err(|e| {
            if e.is_internal() {
                log::error!(
                    "editProfile failed for line_uid={line_uid} restaurant_id={restaurant_id}: {e}"
                );
            }
        })
    }

    async fn update_profile(&self, edit: ProfileEdit) -> AppResult<EditProfileResponse> {
        let unchanged = EditProfileResponse {
            bazi_recalculated: false,
            bazi: None,
        };

        let txn = self.pool.begin().await?;

        ensure_restaurant(&txn, edit.restaurant_id).await?;

        let user: UserRecord = fetch_one(
            &txn,
            queries::CHECK_USER,
            vec![edit.line_uid.clone().into(), edit.restaurant_id.into()],
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let changes = &edit.changes;
        if changes.is_empty() {
            txn.commit().await?;
            return Ok(unchanged);
        }

        execute(
            &txn,
            queries::EDIT_PROFILE,
            vec![
                changes.name.clone().into(),
                changes.gender.map(|g| g.to_value()).into(),
                changes.phone.clone().into(),
                changes.birth_date.into(),
                changes.birth_time.into(),
                changes.birth_place.clone().into(),
                user.id.into(),
                edit.restaurant_id.into(),
            ],
        )
        .await?;

        let stored = user.birth();
        if !changes.birth_changed(&stored) {
            txn.commit().await?;
            log::info!("Updated profile of user_id={}", user.id);
            return Ok(unchanged);
        }

        let name = changes.name.as_deref().unwrap_or(&user.name);
        let bazi = self
            .predictor
            .chart(&changes.merged_birth(&stored).chart_request(name))
            .await?;

        let updated = execute(
            &txn,
            queries::UPDATE_ELEMENT,
            vec![
                bazi.main_element.label().into(),
                string_list_json(&bazi.favorable_elements).into(),
                string_list_json(&bazi.unfavorable_elements).into(),
                user.id.into(),
            ],
        )
        .await?;
        if updated == 0 {
            insert_element(&txn, user.id, &bazi).await?;
        }

        self.refresh_prediction(&txn, user.id, bazi.main_element)
            .await;

        txn.commit().await?;
        log::info!(
            "Updated profile of user_id={} with new element={}",
            user.id,
            bazi.main_element
        );

        Ok(EditProfileResponse {
            bazi_recalculated: true,
            bazi: Some(bazi),
        })
    }

    /// Best effort: runs inside a savepoint so a failed refresh never poisons
    /// the enclosing transaction.
    async fn refresh_prediction(&self, txn: &DatabaseTransaction, user_id: i64, element: Element) {
        let savepoint = match txn.begin().await {
            Ok(savepoint) => savepoint,
            Err(e) => {
                log::warn!("Prediction refresh skipped for user_id={user_id}: {e}");
                return;
            }
        };

        match self.predictions.refresh(&savepoint, user_id, element).await {
            Ok(_) => {
                if let Err(e) = savepoint.commit().await {
                    log::warn!("Prediction refresh not saved for user_id={user_id}: {e}");
                }
            }
            Err(e) => {
                log::warn!("Prediction refresh failed for user_id={user_id}: {e}");
                if let Err(e) = savepoint.rollback().await {
                    log::warn!("Savepoint rollback failed for user_id={user_id}: {e}");
                }
            }
        }
    }

    pub async fn list_restaurant_users(
        &self,
        restaurant_id: i64,
    ) -> AppResult<RestaurantUsersResponse> {
        let users: Vec<RestaurantUserRow> = fetch_all(
            self.pool.as_ref(),
            queries::LIST_RESTAURANT_USERS,
            vec![restaurant_id.into()],
        )
        .await?;
        if users.is_empty() {
            return Err(AppError::NotFound(
                "No users found in restaurant".to_string(),
            ));
        }

        let element: Vec<ElementCount> = fetch_all(
            self.pool.as_ref(),
            queries::ELEMENT_DISTRIBUTION,
            vec![restaurant_id.into()],
        )
        .await?;

        Ok(RestaurantUsersResponse {
            element,
            user: users.into_iter().map(RestaurantUserResponse::from).collect(),
        })
    }
}

async fn insert_element<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    bazi: &ElementProfile,
) -> AppResult<()> {
    execute(
        conn,
        queries::INSERT_ELEMENT,
        vec![
            user_id.into(),
            bazi.main_element.label().into(),
            string_list_json(&bazi.favorable_elements).into(),
            string_list_json(&bazi.unfavorable_elements).into(),
        ],
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use chrono::{NaiveDate, NaiveTime};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn new_user() -> NewUser {
        NewUser {
            line_uid: "U1".into(),
            restaurant_id: 1,
            name: "Somchai".into(),
            gender: Gender::Male,
            phone: "0812345678".into(),
            birth: BirthData {
                date: NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
                time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
                place: "Bangkok".into(),
            },
        }
    }

    fn edit(changes: ProfileChanges) -> ProfileEdit {
        ProfileEdit {
            line_uid: "U1".into(),
            restaurant_id: 1,
            changes,
        }
    }

    #[tokio::test]
    async fn test_lookup_found_and_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_row(1)]])
            .append_query_results(vec![vec![user_row(5, "U1", Some("ไฟ"))]])
            .append_query_results(vec![vec![restaurant_row(1)]])
            .append_query_results(vec![empty_rows()])
            .into_connection();
        let stub = Arc::new(StubPredictor::charting(Element::Fire));
        let service = IdentityService::new(Arc::new(db), stub);
        let request = || LineUidCheckRequest {
            line_uid: "U1".into(),
            restaurant_id: 1,
        };

        match service.lookup(request()).await.unwrap() {
            LookupOutcome::Found(profile) => {
                assert_eq!(profile.user.id, 5);
                assert_eq!(profile.bazi.unwrap().main_element, Element::Fire);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            service.lookup(request()).await.unwrap(),
            LookupOutcome::NeedsRegistration
        ));
    }

    #[tokio::test]
    async fn test_lookup_unknown_restaurant() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![empty_rows()])
            .into_connection();
        let stub = Arc::new(StubPredictor::charting(Element::Fire));
        let service = IdentityService::new(Arc::new(db), stub);

        let result = service
            .lookup(LineUidCheckRequest {
                line_uid: "U1".into(),
                restaurant_id: 3,
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_register_stores_user_and_element() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![restaurant_row(1)]])
                .append_query_results(vec![empty_rows()])
                .append_query_results(vec![vec![id_row(11)]])
                .append_exec_results(vec![exec(1)])
                .into_connection(),
        );
        let stub = Arc::new(StubPredictor::charting(Element::Fire));
        let service = IdentityService::new(db.clone(), stub.clone());

        let response = service.register(new_user()).await.unwrap();
        assert_eq!(response.user.id, 11);
        assert_eq!(response.bazi.main_element, Element::Fire);

        drop(service);
        let log = transaction_log(db);
        assert_eq!(log.matches("\"COMMIT\"").count(), 1);
        assert!(!log.contains("\"ROLLBACK\""));

        let chart = stub.last_chart().unwrap();
        assert_eq!((chart.year, chart.month, chart.day), (1990, 5, 20));
        assert_eq!((chart.hour, chart.minute), (14, 30));
        assert_eq!(chart.name, "Somchai");
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_row(1)]])
            .append_query_results(vec![vec![user_row(5, "U1", Some("ไฟ"))]])
            .into_connection();
        let stub = Arc::new(StubPredictor::charting(Element::Fire));
        let service = IdentityService::new(Arc::new(db), stub.clone());

        assert!(matches!(
            service.register(new_user()).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(stub.chart_calls(), 0);
    }

    #[tokio::test]
    async fn test_register_chart_failures_abort() {
        for (outcome, unavailable) in [
            (ChartOutcome::Unavailable, true),
            (ChartOutcome::InvalidResponse, false),
        ] {
            // no exec result queued: an element insert would error differently
            let db = Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres)
                    .append_query_results(vec![vec![restaurant_row(1)]])
                    .append_query_results(vec![empty_rows()])
                    .append_query_results(vec![vec![id_row(11)]])
                    .into_connection(),
            );
            let stub = Arc::new(StubPredictor::chart_failing(outcome));
            let service = IdentityService::new(db.clone(), stub);

            match service.register(new_user()).await {
                Err(AppError::ServiceUnavailable(_)) => assert!(unavailable),
                Err(AppError::BadGateway(_)) => assert!(!unavailable),
                other => panic!("unexpected: {other:?}"),
            }

            // the inserted user row is rolled back with the transaction
            drop(service);
            let log = transaction_log(db);
            assert!(log.contains("\"ROLLBACK\""));
            assert!(!log.contains("\"COMMIT\""));
        }
    }

    #[tokio::test]
    async fn test_register_insert_race_is_conflict() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![restaurant_row(1)]])
                .append_query_results(vec![empty_rows()])
                .append_query_errors(vec![unique_violation()])
                .into_connection(),
        );
        let stub = Arc::new(StubPredictor::charting(Element::Fire));
        let service = IdentityService::new(db.clone(), stub.clone());

        match service.register(new_user()).await {
            Err(AppError::Conflict(message)) => assert_eq!(message, "User already registered"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(stub.chart_calls(), 0);

        drop(service);
        assert!(!transaction_log(db).contains("\"COMMIT\""));
    }

    #[tokio::test]
    async fn test_edit_without_birth_change_skips_chart() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_row(1)]])
            .append_query_results(vec![vec![user_row(5, "U1", Some("ไฟ"))]])
            .append_exec_results(vec![exec(1)])
            .into_connection();
        let stub = Arc::new(StubPredictor::charting(Element::Water));
        let service = IdentityService::new(Arc::new(db), stub.clone());

        let changes = ProfileChanges {
            name: Some("Somsak".into()),
            birth_place: Some("Bangkok".into()),
            ..Default::default()
        };
        let response = service.edit_profile(edit(changes)).await.unwrap();

        assert!(!response.bazi_recalculated);
        assert!(response.bazi.is_none());
        assert_eq!(stub.chart_calls(), 0);
    }

    #[tokio::test]
    async fn test_edit_with_no_fields_writes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_row(1)]])
            .append_query_results(vec![vec![user_row(5, "U1", Some("ไฟ"))]])
            .into_connection();
        let stub = Arc::new(StubPredictor::charting(Element::Water));
        let service = IdentityService::new(Arc::new(db), stub.clone());

        let response = service
            .edit_profile(edit(ProfileChanges::default()))
            .await
            .unwrap();
        assert!(!response.bazi_recalculated);
        assert_eq!(stub.chart_calls(), 0);
    }

    #[tokio::test]
    async fn test_edit_birth_place_only_recomputes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_row(1)]])
            .append_query_results(vec![vec![user_row(5, "U1", Some("ไฟ"))]])
            // profile update, element update
            .append_exec_results(vec![exec(1), exec(1)])
            // refresh: no prediction today, no prior row
            .append_query_results(vec![empty_rows()])
            .append_query_results(vec![empty_rows()])
            .append_exec_results(vec![exec(1)])
            .into_connection();
        let stub = Arc::new(StubPredictor::charting(Element::Water));
        let service = IdentityService::new(Arc::new(db), stub.clone());

        let changes = ProfileChanges {
            birth_place: Some("Chiang Mai".into()),
            ..Default::default()
        };
        let response = service.edit_profile(edit(changes)).await.unwrap();

        assert!(response.bazi_recalculated);
        assert_eq!(response.bazi.unwrap().main_element, Element::Water);
        assert_eq!(stub.chart_calls(), 1);
        assert_eq!(stub.narrate_calls(), 1);

        let chart = stub.last_chart().unwrap();
        assert_eq!(chart.place, "Chiang Mai");
        assert_eq!((chart.year, chart.month, chart.day), (1990, 5, 20));
        assert_eq!(chart.name, "Somchai");
    }

    #[tokio::test]
    async fn test_edit_survives_prediction_failure() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![restaurant_row(1)]])
                .append_query_results(vec![vec![user_row(5, "U1", Some("ไฟ"))]])
                // element row missing, so it is inserted
                .append_exec_results(vec![exec(1), exec(0), exec(1)])
                .append_query_results(vec![empty_rows()])
                .into_connection(),
        );
        let stub = Arc::new(StubPredictor::charting_then_failing_narrate(Element::Metal));
        let service = IdentityService::new(db.clone(), stub.clone());

        let changes = ProfileChanges {
            birth_time: NaiveTime::from_hms_opt(6, 15, 0),
            ..Default::default()
        };
        let response = service.edit_profile(edit(changes)).await.unwrap();

        assert!(response.bazi_recalculated);
        assert_eq!(response.bazi.unwrap().main_element, Element::Metal);
        assert_eq!(stub.narrate_calls(), 1);

        drop(service);
        let log = transaction_log(db);
        assert!(log.contains("ROLLBACK TO SAVEPOINT savepoint_1"));
        assert_eq!(log.matches("\"COMMIT\"").count(), 1);
    }

    #[tokio::test]
    async fn test_edit_chart_failure_is_returned() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![restaurant_row(1)]])
                .append_query_results(vec![vec![user_row(5, "U1", Some("ไฟ"))]])
                .append_exec_results(vec![exec(1)])
                .into_connection(),
        );
        let stub = Arc::new(StubPredictor::chart_failing(ChartOutcome::Unavailable));
        let service = IdentityService::new(db.clone(), stub);

        let changes = ProfileChanges {
            birth_date: NaiveDate::from_ymd_opt(1991, 1, 1),
            ..Default::default()
        };
        assert!(matches!(
            service.edit_profile(edit(changes)).await,
            Err(AppError::ServiceUnavailable(_))
        ));

        // the profile update is rolled back with the transaction
        drop(service);
        let log = transaction_log(db);
        assert!(log.contains("\"ROLLBACK\""));
        assert!(!log.contains("\"COMMIT\""));
    }

    #[tokio::test]
    async fn test_edit_unknown_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![restaurant_row(1)]])
            .append_query_results(vec![empty_rows()])
            .into_connection();
        let stub = Arc::new(StubPredictor::charting(Element::Fire));
        let service = IdentityService::new(Arc::new(db), stub);

        assert!(matches!(
            service.edit_profile(edit(ProfileChanges::default())).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_restaurant_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![
                restaurant_user_row(2, "Malee", Some("ดิน")),
                restaurant_user_row(1, "Somchai", None),
            ]])
            .append_query_results(vec![vec![element_count_row("ดิน", 1)]])
            .append_query_results(vec![empty_rows()])
            .into_connection();
        let stub = Arc::new(StubPredictor::charting(Element::Fire));
        let service = IdentityService::new(Arc::new(db), stub);

        let listing = service.list_restaurant_users(1).await.unwrap();
        assert_eq!(listing.user.len(), 2);
        assert_eq!(listing.user[0].main_element, Some(Element::Earth));
        assert_eq!(listing.user[1].main_element, None);
        assert_eq!(listing.element[0].count, 1);

        assert!(matches!(
            service.list_restaurant_users(1).await,
            Err(AppError::NotFound(_))
        ));
    }
}
