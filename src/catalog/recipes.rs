/**
 * Recipe, Comment and Vote Queries
 *
 * User recipes hang off catalog dishes. Listing queries return an
 * enriched view with author name and vote/comment tallies so the client
 * never needs follow-up requests. Dishes without any user recipe get a
 * synthesized read-only "(Default)" entry built from the dish itself.
 */

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog::dishes::Dish;
use crate::error::ApiError;

/// Vote direction, stored as the `vote_kind` Postgres enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vote_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteKind {
    Up,
    Down,
}

/// A recipe row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dish_id: String,
    pub title: String,
    pub instructions: Option<String>,
    /// JSON-encoded ingredient list, stored verbatim
    pub ingredients: String,
    pub created_at: DateTime<Utc>,
}

/// Recipe author, public fields only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: String,
    pub username: String,
}

/// Enriched recipe as served to clients
///
/// `id` and `author` are absent on the synthesized default recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub id: Option<String>,
    pub dish_id: String,
    pub title: String,
    pub instructions: Option<String>,
    pub ingredients: String,
    pub author: Option<AuthorView>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub comment_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

/// A comment as served to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub text: String,
    pub author: AuthorView,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: Uuid,
    user_id: Uuid,
    dish_id: String,
    title: String,
    instructions: Option<String>,
    ingredients: String,
    created_at: DateTime<Utc>,
    author_username: String,
    upvotes: i64,
    downvotes: i64,
    comment_count: i64,
}

impl From<RecipeRow> for RecipeView {
    fn from(row: RecipeRow) -> Self {
        Self {
            id: Some(row.id.to_string()),
            dish_id: row.dish_id,
            title: row.title,
            instructions: row.instructions,
            ingredients: row.ingredients,
            author: Some(AuthorView {
                id: row.user_id.to_string(),
                username: row.author_username,
            }),
            upvotes: row.upvotes,
            downvotes: row.downvotes,
            comment_count: row.comment_count,
            created_at: Some(row.created_at),
        }
    }
}

impl RecipeView {
    /// Read-only placeholder built from the dish itself, used when a
    /// dish has no user recipes yet
    pub fn default_for(dish: &Dish) -> Self {
        Self {
            id: None,
            dish_id: dish.id_meal.clone(),
            title: format!("{} (Default)", dish.name),
            instructions: dish.instructions.clone(),
            ingredients: dish.ingredients.clone().unwrap_or_else(|| "[]".to_string()),
            author: None,
            upvotes: 0,
            downvotes: 0,
            comment_count: 0,
            created_at: None,
        }
    }
}

const RECIPE_VIEW_QUERY: &str = "SELECT r.id, r.user_id, r.dish_id, r.title, r.instructions, \
     r.ingredients, r.created_at, u.username AS author_username, \
     (SELECT COUNT(*) FROM votes v WHERE v.recipe_id = r.id AND v.kind = 'UP') AS upvotes, \
     (SELECT COUNT(*) FROM votes v WHERE v.recipe_id = r.id AND v.kind = 'DOWN') AS downvotes, \
     (SELECT COUNT(*) FROM comments c WHERE c.recipe_id = r.id) AS comment_count \
     FROM recipes r JOIN users u ON u.id = r.user_id";

/// Insert a new recipe and return its enriched view
pub async fn create_recipe(
    pool: &PgPool,
    user_id: Uuid,
    dish_id: &str,
    title: &str,
    instructions: Option<&str>,
    ingredients: &str,
) -> Result<RecipeView, ApiError> {
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO recipes (id, user_id, dish_id, title, instructions, ingredients) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(id)
    .bind(user_id)
    .bind(dish_id)
    .bind(title)
    .bind(instructions)
    .bind(ingredients)
    .execute(pool)
    .await?;

    get_recipe_view(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))
}

/// Fetch a raw recipe row (for ownership checks)
pub async fn get_recipe(pool: &PgPool, id: Uuid) -> Result<Option<Recipe>, ApiError> {
    let recipe = sqlx::query_as::<_, Recipe>(
        "SELECT id, user_id, dish_id, title, instructions, ingredients, created_at \
         FROM recipes WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(recipe)
}

/// Fetch one enriched recipe view
pub async fn get_recipe_view(pool: &PgPool, id: Uuid) -> Result<Option<RecipeView>, ApiError> {
    let row = sqlx::query_as::<_, RecipeRow>(&format!("{} WHERE r.id = $1", RECIPE_VIEW_QUERY))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(RecipeView::from))
}

/// All recipes, newest first
pub async fn list_recipes(pool: &PgPool) -> Result<Vec<RecipeView>, ApiError> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "{} ORDER BY r.created_at DESC",
        RECIPE_VIEW_QUERY
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RecipeView::from).collect())
}

/// Recipes owned by one user, newest first
pub async fn list_recipes_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<RecipeView>, ApiError> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "{} WHERE r.user_id = $1 ORDER BY r.created_at DESC",
        RECIPE_VIEW_QUERY
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RecipeView::from).collect())
}

/// Recipes for a set of dishes in one round trip, grouped by dish
pub async fn list_recipes_for_dishes(
    pool: &PgPool,
    dish_ids: &[String],
) -> Result<HashMap<String, Vec<RecipeView>>, ApiError> {
    if dish_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "{} WHERE r.dish_id = ANY($1) ORDER BY r.created_at DESC",
        RECIPE_VIEW_QUERY
    ))
    .bind(dish_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<String, Vec<RecipeView>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.dish_id.clone())
            .or_default()
            .push(RecipeView::from(row));
    }

    Ok(grouped)
}

/// Update a recipe's editable fields (unset fields keep their value)
pub async fn update_recipe(
    pool: &PgPool,
    id: Uuid,
    title: Option<&str>,
    instructions: Option<&str>,
    ingredients: Option<&str>,
) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE recipes SET \
         title = COALESCE($2, title), \
         instructions = COALESCE($3, instructions), \
         ingredients = COALESCE($4, ingredients) \
         WHERE id = $1",
    )
    .bind(id)
    .bind(title)
    .bind(instructions)
    .bind(ingredients)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a recipe; comments and votes cascade
pub async fn delete_recipe(pool: &PgPool, id: Uuid) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Insert a comment and return it with the author attached
pub async fn add_comment(
    pool: &PgPool,
    recipe_id: Uuid,
    user_id: Uuid,
    text: &str,
) -> Result<CommentView, ApiError> {
    let id = Uuid::new_v4();

    #[derive(sqlx::FromRow)]
    struct Inserted {
        created_at: DateTime<Utc>,
        username: String,
    }

    let inserted = sqlx::query_as::<_, Inserted>(
        "WITH inserted AS ( \
             INSERT INTO comments (id, recipe_id, user_id, text) \
             VALUES ($1, $2, $3, $4) RETURNING user_id, created_at \
         ) \
         SELECT i.created_at, u.username FROM inserted i JOIN users u ON u.id = i.user_id",
    )
    .bind(id)
    .bind(recipe_id)
    .bind(user_id)
    .bind(text)
    .fetch_one(pool)
    .await?;

    Ok(CommentView {
        id: id.to_string(),
        text: text.to_string(),
        author: AuthorView {
            id: user_id.to_string(),
            username: inserted.username,
        },
        created_at: inserted.created_at,
    })
}

/// Comments on a recipe, oldest first
pub async fn list_comments(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<CommentView>, ApiError> {
    #[derive(sqlx::FromRow)]
    struct CommentRow {
        id: Uuid,
        text: String,
        user_id: Uuid,
        username: String,
        created_at: DateTime<Utc>,
    }

    let rows = sqlx::query_as::<_, CommentRow>(
        "SELECT c.id, c.text, c.user_id, u.username, c.created_at \
         FROM comments c JOIN users u ON u.id = c.user_id \
         WHERE c.recipe_id = $1 ORDER BY c.created_at",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| CommentView {
            id: row.id.to_string(),
            text: row.text,
            author: AuthorView {
                id: row.user_id.to_string(),
                username: row.username,
            },
            created_at: row.created_at,
        })
        .collect())
}

/// Record a vote, replacing any prior vote by the same user
pub async fn cast_vote(
    pool: &PgPool,
    recipe_id: Uuid,
    user_id: Uuid,
    kind: VoteKind,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO votes (recipe_id, user_id, kind) VALUES ($1, $2, $3) \
         ON CONFLICT (recipe_id, user_id) DO UPDATE SET kind = EXCLUDED.kind, created_at = now()",
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(kind)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove the caller's vote if present
pub async fn remove_vote(pool: &PgPool, recipe_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM votes WHERE recipe_id = $1 AND user_id = $2")
        .bind(recipe_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dish() -> Dish {
        Dish {
            id_meal: "52772".to_string(),
            name: "Teriyaki Chicken".to_string(),
            category: Some("Chicken".to_string()),
            area: Some("Japanese".to_string()),
            instructions: Some("Grill the chicken.".to_string()),
            ingredients: Some(r#"["chicken","soy sauce"]"#.to_string()),
            tags: None,
            thumb_file: None,
            youtube: None,
        }
    }

    #[test]
    fn test_default_recipe_has_no_id_or_author() {
        let view = RecipeView::default_for(&sample_dish());
        assert!(view.id.is_none());
        assert!(view.author.is_none());
        assert_eq!(view.title, "Teriyaki Chicken (Default)");
        assert_eq!(view.instructions.as_deref(), Some("Grill the chicken."));
        assert_eq!(view.upvotes, 0);
        assert_eq!(view.comment_count, 0);
    }

    #[test]
    fn test_default_recipe_empty_ingredients_fallback() {
        let mut dish = sample_dish();
        dish.ingredients = None;
        let view = RecipeView::default_for(&dish);
        assert_eq!(view.ingredients, "[]");
    }

    #[test]
    fn test_vote_kind_wire_format() {
        assert_eq!(serde_json::to_value(VoteKind::Up).unwrap(), "UP");
        assert_eq!(
            serde_json::from_value::<VoteKind>(serde_json::json!("DOWN")).unwrap(),
            VoteKind::Down
        );
        assert!(serde_json::from_value::<VoteKind>(serde_json::json!("sideways")).is_err());
    }

    #[test]
    fn test_recipe_view_serializes_camel_case() {
        let view = RecipeView::default_for(&sample_dish());
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("dishId").is_some());
        assert!(json.get("commentCount").is_some());
        assert!(json.get("dish_id").is_none());
    }
}
