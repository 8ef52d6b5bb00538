mod script_handler;

pub use script_handler::{ScriptHandler, ScriptLoader};
