pub mod auth;
pub mod books;
pub mod error;
pub mod openapi;
pub mod users;

use shelf_kernel::ModuleRegistry;

use crate::state::AppState;

/// Register every application module, all sharing one [`AppState`].
pub fn register_all(registry: &mut ModuleRegistry, state: &AppState) -> anyhow::Result<()> {
    registry.register(auth::create_module(state.clone()))?;
    registry.register(users::create_module(state.clone()))?;
    registry.register(books::create_module(state.clone()))?;
    Ok(())
}
