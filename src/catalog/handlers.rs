/**
 * Catalog HTTP Handlers
 *
 * Public browsing endpoints for dishes and recipes, plus authenticated
 * recipe authoring, comments and votes. Recipe ids arrive as path
 * strings and are parsed explicitly so malformed ids produce the same
 * JSON error shape as every other validation failure.
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::handlers::types::MessageResponse;
use crate::auth::users::Capability;
use crate::catalog::dishes::{self, Dish, DishFilter};
use crate::catalog::recipes::{self, CommentView, RecipeView, VoteKind};
use crate::error::ApiError;
use crate::middleware::{AuthUser, Principal};
use crate::server::state::AppState;

/// A dish with its recipes attached
#[derive(Debug, Serialize, Deserialize)]
pub struct DishView {
    #[serde(flatten)]
    pub dish: Dish,
    pub recipes: Vec<RecipeView>,
}

/// Paginated dish listing
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishListResponse {
    pub dishes: Vec<DishView>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// Recipe with its comment thread
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: RecipeView,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub dish_id: String,
    pub title: String,
    pub instructions: Option<String>,
    pub ingredients: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub ingredients: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VoteRequest {
    #[serde(rename = "type")]
    pub kind: VoteKind,
}

fn parse_recipe_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("Invalid recipe id"))
}

fn attach_default(dish: Dish, mut recipes: Vec<RecipeView>) -> DishView {
    if recipes.is_empty() {
        recipes.push(RecipeView::default_for(&dish));
    }
    DishView { dish, recipes }
}

/// GET /api/dishes
pub async fn list_dishes(
    State(state): State<AppState>,
    Query(filter): Query<DishFilter>,
) -> Result<Json<DishListResponse>, ApiError> {
    let (dishes, total) = dishes::list_dishes(&state.pool, &filter).await?;

    let ids: Vec<String> = dishes.iter().map(|d| d.id_meal.clone()).collect();
    let mut by_dish = recipes::list_recipes_for_dishes(&state.pool, &ids).await?;

    let views = dishes
        .into_iter()
        .map(|dish| {
            let recipes = by_dish.remove(&dish.id_meal).unwrap_or_default();
            attach_default(dish, recipes)
        })
        .collect();

    let limit = filter.limit();
    Ok(Json(DishListResponse {
        dishes: views,
        total,
        page: filter.page(),
        total_pages: (total + limit - 1) / limit,
    }))
}

/// GET /api/dishes/{id_meal}
pub async fn get_dish(
    State(state): State<AppState>,
    Path(id_meal): Path<String>,
) -> Result<Json<DishView>, ApiError> {
    let dish = dishes::get_dish(&state.pool, &id_meal)
        .await?
        .ok_or_else(|| ApiError::not_found("Dish not found"))?;

    let mut by_dish =
        recipes::list_recipes_for_dishes(&state.pool, std::slice::from_ref(&dish.id_meal)).await?;
    let dish_recipes = by_dish.remove(&dish.id_meal).unwrap_or_default();

    Ok(Json(attach_default(dish, dish_recipes)))
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(dishes::list_categories(&state.pool).await?))
}

/// GET /api/areas
pub async fn list_areas(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(dishes::list_areas(&state.pool).await?))
}

/// GET /api/recipes
pub async fn list_recipes(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeView>>, ApiError> {
    Ok(Json(recipes::list_recipes(&state.pool).await?))
}

/// GET /api/recipes/{id}
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecipeDetail>, ApiError> {
    let id = parse_recipe_id(&id)?;

    let recipe = recipes::get_recipe_view(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;
    let comments = recipes::list_comments(&state.pool, id).await?;

    Ok(Json(RecipeDetail { recipe, comments }))
}

/// POST /api/recipes
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<Json<RecipeView>, ApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::validation("Title required"));
    }

    if dishes::get_dish(&state.pool, &request.dish_id).await?.is_none() {
        return Err(ApiError::not_found("Dish not found"));
    }

    let ingredients = request.ingredients.as_deref().unwrap_or("[]");
    let recipe = recipes::create_recipe(
        &state.pool,
        principal.user_id,
        &request.dish_id,
        title,
        request.instructions.as_deref(),
        ingredients,
    )
    .await?;

    tracing::info!(
        "recipe created by user {} for dish {}",
        principal.user_id,
        request.dish_id
    );

    Ok(Json(recipe))
}

/// The caller must own the recipe or hold moderation rights
fn ensure_can_edit(principal: &Principal, owner: Uuid) -> Result<(), ApiError> {
    if principal.user_id == owner || principal.role.can(Capability::EditAnyRecipe) {
        Ok(())
    } else {
        Err(ApiError::forbidden("You can only modify your own recipes"))
    }
}

/// PUT /api/recipes/{id}
pub async fn update_recipe(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeView>, ApiError> {
    let id = parse_recipe_id(&id)?;

    let existing = recipes::get_recipe(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;
    ensure_can_edit(&principal, existing.user_id)?;

    if let Some(title) = request.title.as_deref() {
        if title.trim().is_empty() {
            return Err(ApiError::validation("Title cannot be empty"));
        }
    }

    recipes::update_recipe(
        &state.pool,
        id,
        request.title.as_deref().map(str::trim),
        request.instructions.as_deref(),
        request.ingredients.as_deref(),
    )
    .await?;

    let updated = recipes::get_recipe_view(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    Ok(Json(updated))
}

/// DELETE /api/recipes/{id}
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_recipe_id(&id)?;

    let existing = recipes::get_recipe(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;
    ensure_can_edit(&principal, existing.user_id)?;

    recipes::delete_recipe(&state.pool, id).await?;

    tracing::info!("recipe {} deleted by user {}", id, principal.user_id);

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Result<Json<CommentView>, ApiError> {
    let id = parse_recipe_id(&id)?;

    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::validation("Comment text required"));
    }

    if recipes::get_recipe(&state.pool, id).await?.is_none() {
        return Err(ApiError::not_found("Recipe not found"));
    }

    let comment = recipes::add_comment(&state.pool, id, principal.user_id, text).await?;

    Ok(Json(comment))
}

/// POST /api/recipes/{id}/vote
pub async fn vote(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<VoteRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_recipe_id(&id)?;

    if recipes::get_recipe(&state.pool, id).await?.is_none() {
        return Err(ApiError::not_found("Recipe not found"));
    }

    recipes::cast_vote(&state.pool, id, principal.user_id, request.kind).await?;

    Ok(Json(MessageResponse::new("Vote recorded")))
}

/// DELETE /api/recipes/{id}/vote
pub async fn unvote(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_recipe_id(&id)?;

    recipes::remove_vote(&state.pool, id, principal.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
