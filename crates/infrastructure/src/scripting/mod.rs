mod api;
mod engine;
mod handler;
mod loader;

pub use handler::RhaiScriptHandler;
pub use loader::RhaiScriptLoader;
