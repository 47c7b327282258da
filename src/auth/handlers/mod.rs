/**
 * Authentication and Account HTTP Handlers
 *
 * Axum handlers for the registration, login, recovery and profile
 * endpoints. Validation happens before any database access; responses
 * use the camelCase wire types from `types`.
 */

pub mod codes;
pub mod email_change;
pub mod login;
pub mod me;
pub mod password_reset;
pub mod register;
pub mod types;

pub use codes::{send_code, verify_code};
pub use email_change::{confirm_change_code, send_change_code};
pub use login::login;
pub use me::{change_password, delete_account, get_profile, my_recipes, update_profile};
pub use password_reset::{forgot_password, reset_password};
pub use register::register;
