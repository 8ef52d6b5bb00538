use super::engine::{build_engine, Deadline};
use super::handler::{RhaiScriptHandler, ON_REQUEST_FN};
use scriptdns_application::ports::{ScriptHandler, ScriptLoader};
use scriptdns_domain::config::ScriptingConfig;
use scriptdns_domain::{DomainError, ZoneConfig};
use tracing::debug;

/// Compiles Rhai scripts from disk into isolated handlers.
pub struct RhaiScriptLoader {
    limits: ScriptingConfig,
}

impl RhaiScriptLoader {
    pub fn new(limits: ScriptingConfig) -> Self {
        Self { limits }
    }

    /// Compiles `source` under the given script name, without touching disk.
    pub fn load_source(&self, script: &str, source: &str) -> Result<RhaiScriptHandler, DomainError> {
        let deadline = Deadline::new();
        let engine = build_engine(&self.limits, deadline.clone(), script);

        let ast = engine.compile(source).map_err(|e| DomainError::ScriptLoad {
            script: script.to_string(),
            reason: e.to_string(),
        })?;

        let has_on_request = ast
            .iter_functions()
            .any(|f| f.name == ON_REQUEST_FN && f.params.len() == 2);
        if !has_on_request {
            return Err(DomainError::ScriptLoad {
                script: script.to_string(),
                reason: format!("missing required function {}(request, response)", ON_REQUEST_FN),
            });
        }

        debug!(script, functions = ast.iter_functions().count(), "Script compiled");
        Ok(RhaiScriptHandler::new(script.to_string(), engine, ast, deadline))
    }
}

impl ScriptLoader for RhaiScriptLoader {
    fn load(&self, zone: &ZoneConfig) -> Result<Box<dyn ScriptHandler>, DomainError> {
        let script = zone.script_name();
        let source = std::fs::read_to_string(&zone.script).map_err(|e| DomainError::ScriptLoad {
            script: script.clone(),
            reason: format!("cannot read {}: {}", zone.script.display(), e),
        })?;

        let handler = self.load_source(&script, &source)?;
        Ok(Box::new(handler))
    }
}
