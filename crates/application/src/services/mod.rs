pub mod script_host;
pub mod zone_router;

pub use script_host::ScriptHost;
pub use zone_router::ZoneRouter;
