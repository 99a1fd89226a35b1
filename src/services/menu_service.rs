use super::restaurant_service::ensure_restaurant;
use crate::database::{execute, fetch_all, fetch_one, queries};
use crate::error::{AppError, AppResult};
use crate::models::*;
use sea_orm::{ActiveEnum, DatabaseConnection, TransactionTrait};
use std::sync::Arc;

/// Menu catalogue and element-based promotion groups.
#[derive(Clone)]
pub struct MenuService {
    pool: Arc<DatabaseConnection>,
}

impl MenuService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    /// Available dishes of the user's restaurant tagged with the user's main
    /// element, newest first.
    pub async fn list_available_menu_for_user(
        &self,
        user_id: i64,
    ) -> AppResult<Vec<MenuItemResponse>> {
        let user: UserElementRecord =
            fetch_one(self.pool.as_ref(), queries::CHECK_USER_BY_ID, vec![user_id.into()])
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let rows: Vec<MenuRow> = fetch_all(
            self.pool.as_ref(),
            queries::FIND_MENU_FOR_USER,
            vec![user.id.into(), user.restaurant_id.into()],
        )
        .await?;

        rows.into_iter().map(MenuItemResponse::try_from).collect()
    }

    /// Creates one promotion row per available menu tagged with every given
    /// element, all sharing a freshly allocated group id.
    pub async fn create_promotion_group(
        &self,
        group: NewPromotionGroup,
    ) -> AppResult<CreatePromotionResponse> {
        let txn = self.pool.begin().await?;

        let menus: Vec<IdRow> = fetch_all(
            &txn,
            queries::FIND_MENU_BY_ELEMENTS,
            vec![elements_json(&group.elements).into()],
        )
        .await?;
        if menus.is_empty() {
            return Err(AppError::NotFound(
                "No menus match the specified elements".to_string(),
            ));
        }

        // MAX + 1 is not reserved; concurrent creators may pick the same id.
        let next: Option<NextGroupRow> =
            fetch_one(&txn, queries::NEXT_PROMOTION_GROUP, vec![]).await?;
        let promotion_group_id = next.map_or(1, |row| row.next_group);

        for menu in &menus {
            execute(
                &txn,
                queries::INSERT_PROMOTION,
                vec![
                    promotion_group_id.into(),
                    menu.id.into(),
                    group.description.clone().into(),
                    group.discount_value.into(),
                    group.start_date.into(),
                    group.end_date.into(),
                    PromotionStatus::Available.to_value().into(),
                ],
            )
            .await?;
        }

        txn.commit().await?;
        log::info!(
            "Created promotion group {promotion_group_id} covering {} menus",
            menus.len()
        );

        Ok(CreatePromotionResponse {
            promotion_group_id,
            menu_count: menus.len(),
        })
    }

    pub async fn get_promotion_group(&self, group_id: i64) -> AppResult<PromotionGroupResponse> {
        fetch_one(
            self.pool.as_ref(),
            queries::GET_PROMOTION_GROUP,
            vec![group_id.into()],
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Promotion group not found".to_string()))
    }

    pub async fn update_promotion_group(
        &self,
        group_id: i64,
        changes: PromotionGroupChanges,
    ) -> AppResult<()> {
        let affected = execute(
            self.pool.as_ref(),
            queries::UPDATE_PROMOTION_GROUP,
            vec![
                changes.start_date.into(),
                changes.end_date.into(),
                changes.status.map(|s| s.to_value()).into(),
                group_id.into(),
            ],
        )
        .await
        .map_err(|e| {
            AppError::check_violation_as_invalid(e, "end_date: must not be before start_date")
        })?;

        if affected == 0 {
            return Err(AppError::NotFound("Promotion group not found".to_string()));
        }
        log::info!("Updated promotion group {group_id} ({affected} rows)");
        Ok(())
    }

    pub async fn delete_promotion_group(&self, group_id: i64) -> AppResult<u64> {
        let affected = execute(
            self.pool.as_ref(),
            queries::DELETE_PROMOTION_GROUP,
            vec![group_id.into()],
        )
        .await?;

        if affected == 0 {
            return Err(AppError::NotFound("Promotion group not found".to_string()));
        }
        log::info!("Deleted promotion group {group_id} ({affected} rows)");
        Ok(affected)
    }

    pub async fn list_menu(&self, request: MenuListRequest) -> AppResult<Vec<MenuItemResponse>> {
        let rows: Vec<MenuRow> = fetch_all(
            self.pool.as_ref(),
            queries::LIST_MENU,
            vec![
                request.restaurant_id.into(),
                MENU_PAGE_SIZE.into(),
                request.offset().into(),
            ],
        )
        .await?;

        rows.into_iter().map(MenuItemResponse::try_from).collect()
    }

    pub async fn add_menu(&self, menu: NewMenu) -> AppResult<i64> {
        ensure_restaurant(self.pool.as_ref(), menu.restaurant_id).await?;

        let inserted: IdRow = fetch_one(
            self.pool.as_ref(),
            queries::ADD_MENU,
            vec![
                menu.restaurant_id.into(),
                menu.name.into(),
                menu.price.into(),
                menu.element.as_deref().map(elements_json).into(),
                menu.image_url.into(),
                menu.status.to_value().into(),
            ],
        )
        .await
        .map_err(|e| AppError::foreign_key_violation_as_not_found(e, "Restaurant not found"))?
        .ok_or_else(|| AppError::InternalError("Menu insert returned no id".to_string()))?;

        log::info!(
            "Added menu {} to restaurant {}",
            inserted.id,
            menu.restaurant_id
        );
        Ok(inserted.id)
    }

    pub async fn edit_menu(&self, menu_id: i64, changes: MenuChanges) -> AppResult<()> {
        if changes.is_empty() {
            return Err(AppError::BadRequest("No data to update".to_string()));
        }

        let affected = execute(
            self.pool.as_ref(),
            queries::EDIT_MENU,
            vec![
                changes.name.into(),
                changes.price.into(),
                changes.element.as_deref().map(elements_json).into(),
                changes.image_url.into(),
                changes.status.map(|s| s.to_value()).into(),
                menu_id.into(),
            ],
        )
        .await?;

        if affected == 0 {
            return Err(AppError::NotFound("Menu not found".to_string()));
        }
        Ok(())
    }
}
