/**
 * Dish and Recipe Catalog
 *
 * Read-only dish reference data plus user-authored recipes, comments
 * and votes. Queries live in `dishes` and `recipes`; the HTTP surface
 * is in `handlers`.
 */

pub mod dishes;
pub mod handlers;
pub mod recipes;

pub use dishes::{Dish, DishFilter};
pub use recipes::{RecipeView, VoteKind};
