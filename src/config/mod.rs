mod loader;
pub mod schema;

pub use schema::{Config, GuardrailsConfig, GuardrailsMode, RouterConfig};
