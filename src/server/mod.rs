//! Server Module
//!
//! Server initialization, application state and configuration.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports
//! ├── init.rs   - Server initialization (pool, migrations, seeding)
//! ├── state.rs  - Application state and FromRef impls
//! └── config.rs - Environment configuration
//! ```

/// Server initialization
pub mod init;

/// Application state
pub mod state;

/// Environment configuration
pub mod config;

pub use init::create_app;
pub use state::AppState;
