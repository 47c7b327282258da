/**
 * Dish Catalog Queries
 *
 * The dish table is a read-only reference catalog imported at deploy
 * time. Queries support substring search, category/area filters and
 * page-based pagination.
 */

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: i64 = 12;
const MAX_PAGE_SIZE: i64 = 60;

/// A catalog dish as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id_meal: String,
    pub name: String,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub ingredients: Option<String>,
    pub tags: Option<String>,
    pub thumb_file: Option<String>,
    pub youtube: Option<String>,
}

/// Catalog listing filter, decoded from query parameters
#[derive(Debug, Default, Deserialize)]
pub struct DishFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl DishFilter {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    fn search_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s))
    }
}

const DISH_COLUMNS: &str =
    "id_meal, name, category, area, instructions, ingredients, tags, thumb_file, youtube";

const DISH_FILTER: &str = "($1::text IS NULL OR name ILIKE $1 OR category ILIKE $1 \
     OR area ILIKE $1 OR tags ILIKE $1) \
     AND ($2::text IS NULL OR category = $2) \
     AND ($3::text IS NULL OR area = $3)";

/// List dishes matching the filter, newest pages first by name
pub async fn list_dishes(pool: &PgPool, filter: &DishFilter) -> Result<(Vec<Dish>, i64), ApiError> {
    let pattern = filter.search_pattern();
    let limit = filter.limit();
    let offset = (filter.page() - 1) * limit;

    let total: i64 =
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM dishes WHERE {}", DISH_FILTER))
            .bind(pattern.as_deref())
            .bind(filter.category.as_deref())
            .bind(filter.area.as_deref())
            .fetch_one(pool)
            .await?;

    let dishes = sqlx::query_as::<_, Dish>(&format!(
        "SELECT {} FROM dishes WHERE {} ORDER BY name LIMIT $4 OFFSET $5",
        DISH_COLUMNS, DISH_FILTER
    ))
    .bind(pattern.as_deref())
    .bind(filter.category.as_deref())
    .bind(filter.area.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((dishes, total))
}

/// Fetch a single dish by its catalog id
pub async fn get_dish(pool: &PgPool, id_meal: &str) -> Result<Option<Dish>, ApiError> {
    let dish = sqlx::query_as::<_, Dish>(&format!(
        "SELECT {} FROM dishes WHERE id_meal = $1",
        DISH_COLUMNS
    ))
    .bind(id_meal)
    .fetch_optional(pool)
    .await?;

    Ok(dish)
}

/// Distinct non-null categories, alphabetical
pub async fn list_categories(pool: &PgPool) -> Result<Vec<String>, ApiError> {
    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT category FROM dishes WHERE category IS NOT NULL ORDER BY category",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Distinct non-null areas, alphabetical
pub async fn list_areas(pool: &PgPool) -> Result<Vec<String>, ApiError> {
    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT area FROM dishes WHERE area IS NOT NULL ORDER BY area",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
