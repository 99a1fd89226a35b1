//! Parameterized SQL used by the services, one constant per operation.
//!
//! Placeholders are positional (`$1`, `$2`, ...) and bound through
//! [`crate::database::statement`]. Element lists are stored as JSONB arrays of
//! Thai labels, so containment checks use `@>`.

// Restaurants
pub const CHECK_RESTAURANT: &str = "SELECT id, name, email FROM restaurants WHERE id = $1";

pub const RESTAURANT_LOGIN: &str =
    "SELECT id, name, email, password FROM restaurants WHERE email = $1";

pub const EDIT_RESTAURANT: &str = r#"
    UPDATE restaurants
    SET name = COALESCE($1, name),
        email = COALESCE($2, email),
        password = COALESCE($3, password)
    WHERE id = $4
"#;

// Users
pub const CHECK_USER: &str = r#"
    SELECT u.id, u.line_uid, u.name, u.gender, u.phone, u.birth_date, u.birth_time,
           u.birth_place, u.restaurant_id,
           e.main_element, e.favorable_elements, e.unfavorable_elements
    FROM users u
    LEFT JOIN user_elements e ON u.id = e.user_id
    WHERE u.line_uid = $1 AND u.restaurant_id = $2
"#;

pub const CHECK_USER_BY_ID: &str = r#"
    SELECT u.id, u.restaurant_id, e.main_element
    FROM users u
    LEFT JOIN user_elements e ON u.id = e.user_id
    WHERE u.id = $1
"#;

pub const CREATE_USER: &str = r#"
    INSERT INTO users (line_uid, restaurant_id, name, gender, phone, birth_date, birth_time, birth_place, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
    RETURNING id
"#;

pub const EDIT_PROFILE: &str = r#"
    UPDATE users
    SET name = COALESCE($1, name),
        gender = COALESCE($2, gender),
        phone = COALESCE($3, phone),
        birth_date = COALESCE($4, birth_date),
        birth_time = COALESCE($5, birth_time),
        birth_place = COALESCE($6, birth_place),
        updated_at = NOW()
    WHERE id = $7 AND restaurant_id = $8
"#;

pub const LIST_RESTAURANT_USERS: &str = r#"
    SELECT u.id, u.name, u.line_uid, u.phone, u.gender, u.created_at,
           e.main_element, e.favorable_elements
    FROM users u
    LEFT JOIN user_elements e ON u.id = e.user_id
    WHERE u.restaurant_id = $1
    ORDER BY u.created_at DESC
"#;

// User elements
pub const INSERT_ELEMENT: &str = r#"
    INSERT INTO user_elements (user_id, main_element, favorable_elements, unfavorable_elements, created_at)
    VALUES ($1, $2, $3, $4, NOW())
"#;

pub const UPDATE_ELEMENT: &str = r#"
    UPDATE user_elements
    SET main_element = $1, favorable_elements = $2, unfavorable_elements = $3, updated_at = NOW()
    WHERE user_id = $4
"#;

pub const ELEMENT_DISTRIBUTION: &str = r#"
    SELECT e.main_element, COUNT(*) AS count
    FROM user_elements e
    INNER JOIN users u ON u.id = e.user_id
    WHERE u.restaurant_id = $1
    GROUP BY e.main_element
    ORDER BY count DESC
"#;

// Predictions
pub const CHECK_PREDICTION: &str = r#"
    SELECT prediction_text
    FROM predictions
    WHERE user_id = $1 AND prediction_date = $2
    LIMIT 1
"#;

pub const CHECK_ANY_PREDICTION: &str = r#"
    SELECT id
    FROM predictions
    WHERE user_id = $1
    LIMIT 1
"#;

pub const INSERT_PREDICTION: &str = r#"
    INSERT INTO predictions (user_id, prediction_date, prediction_text, created_at)
    VALUES ($1, $2, $3, NOW())
"#;

pub const UPDATE_PREDICTION: &str = r#"
    UPDATE predictions
    SET prediction_text = $1, prediction_date = $2, updated_at = NOW()
    WHERE user_id = $3
"#;

// Menu
pub const LIST_MENU: &str = r#"
    SELECT id, name, price, element, image_url, status, created_at
    FROM menu
    WHERE restaurant_id = $1
    ORDER BY created_at DESC
    LIMIT $2 OFFSET $3
"#;

pub const ADD_MENU: &str = r#"
    INSERT INTO menu (restaurant_id, name, price, element, image_url, status, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, NOW())
    RETURNING id
"#;

pub const EDIT_MENU: &str = r#"
    UPDATE menu
    SET name = COALESCE($1, name),
        price = COALESCE($2, price),
        element = COALESCE($3, element),
        image_url = COALESCE($4, image_url),
        status = COALESCE($5, status)
    WHERE id = $6
"#;

pub const FIND_MENU_FOR_USER: &str = r#"
    SELECT m.id, m.name, m.price, m.element, m.image_url, m.status, m.created_at
    FROM menu m
    INNER JOIN users u ON m.restaurant_id = u.restaurant_id
    INNER JOIN user_elements ue ON u.id = ue.user_id
    WHERE u.id = $1
      AND m.restaurant_id = $2
      AND m.status = 'AVAILABLE'
      AND m.element @> jsonb_build_array(ue.main_element)
    ORDER BY m.created_at DESC
"#;

pub const FIND_MENU_BY_ELEMENTS: &str = r#"
    SELECT id
    FROM menu
    WHERE element @> $1
      AND status = 'AVAILABLE'
    ORDER BY id
"#;

// Promotions
pub const CHECK_ACTIVE_PROMOTION: &str = r#"
    SELECT id, discount_value
    FROM promotions
    WHERE id = $1
      AND status = 'AVAILABLE'
      AND start_date <= $2
      AND end_date >= $2
    LIMIT 1
"#;

pub const NEXT_PROMOTION_GROUP: &str = r#"
    SELECT COALESCE(MAX(promotion_group_id), 0) + 1 AS next_group
    FROM promotions
"#;

pub const INSERT_PROMOTION: &str = r#"
    INSERT INTO promotions (promotion_group_id, menu_id, description, discount_value, start_date, end_date, status, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
"#;

pub const GET_PROMOTION_GROUP: &str = r#"
    SELECT
        promotion_group_id,
        string_agg(menu_id::text, ',' ORDER BY menu_id) AS menu_ids,
        description,
        discount_value,
        start_date,
        end_date,
        status,
        COUNT(*) AS menu_count
    FROM promotions
    WHERE promotion_group_id = $1
    GROUP BY promotion_group_id, description, discount_value, start_date, end_date, status
"#;

pub const UPDATE_PROMOTION_GROUP: &str = r#"
    UPDATE promotions
    SET start_date = COALESCE($1, start_date),
        end_date = COALESCE($2, end_date),
        status = COALESCE($3, status),
        updated_at = NOW()
    WHERE promotion_group_id = $4
"#;

pub const DELETE_PROMOTION_GROUP: &str = "DELETE FROM promotions WHERE promotion_group_id = $1";

// Coupons
pub const ADD_COUPON: &str = r#"
    INSERT INTO coupons (user_id, promotion_id, code, status, created_at)
    VALUES ($1, $2, $3, 'UNUSED', NOW())
"#;

pub const CHECK_COUPON: &str = r#"
    SELECT c.id AS coupon_id, c.status, c.code, p.discount_value
    FROM coupons c
    INNER JOIN promotions p ON c.promotion_id = p.id
    WHERE c.code = $1
    LIMIT 1
"#;

pub const USE_COUPON: &str = r#"
    UPDATE coupons
    SET status = 'USED', used_at = NOW()
    WHERE id = $1 AND status = 'UNUSED'
"#;

// Health
pub const PING: &str = "SELECT 1";
