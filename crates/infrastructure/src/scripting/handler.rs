use super::api::{ScriptRequest, ScriptResponse};
use super::engine::Deadline;
use rhai::{CallFnOptions, Dynamic, Engine, EvalAltResult, Map, Scope, AST};
use scriptdns_application::ports::ScriptHandler;
use scriptdns_domain::{DnsRequest, DomainError, ResponseDraft, ScriptConfig};
use std::time::Duration;

pub const INIT_FN: &str = "init";
pub const ON_REQUEST_FN: &str = "onRequest";

/// One compiled script with its own engine and Handler State.
///
/// The Handler State is a Rhai object map bound as `this` for every call, so
/// scripts keep data between queries with `this.field = value`.
pub struct RhaiScriptHandler {
    script: String,
    engine: Engine,
    ast: AST,
    scope: Scope<'static>,
    state: Dynamic,
    deadline: Deadline,
}

impl RhaiScriptHandler {
    pub(super) fn new(script: String, engine: Engine, ast: AST, deadline: Deadline) -> Self {
        Self {
            script,
            engine,
            ast,
            scope: Scope::new(),
            state: Dynamic::from_map(Map::new()),
            deadline,
        }
    }

    fn has_function(&self, name: &str, arity: usize) -> bool {
        self.ast
            .iter_functions()
            .any(|f| f.name == name && f.params.len() == arity)
    }

    fn call(&mut self, name: &str, args: impl rhai::FuncArgs) -> Result<(), Box<EvalAltResult>> {
        let options = CallFnOptions::new()
            .eval_ast(false)
            .rewind_scope(true)
            .bind_this_ptr(&mut self.state);
        self.engine
            .call_fn_with_options::<Dynamic>(options, &mut self.scope, &self.ast, name, args)
            .map(|_| ())
    }

    fn map_error(&self, error: Box<EvalAltResult>) -> DomainError {
        match innermost(&error) {
            EvalAltResult::ErrorTerminated(..) | EvalAltResult::ErrorTooManyOperations(..) => {
                DomainError::ScriptTimeout {
                    script: self.script.clone(),
                }
            }
            _ => DomainError::ScriptExecution {
                script: self.script.clone(),
                reason: error.to_string(),
            },
        }
    }
}

fn innermost(error: &EvalAltResult) -> &EvalAltResult {
    match error {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => innermost(inner),
        other => other,
    }
}

impl ScriptHandler for RhaiScriptHandler {
    fn init(&mut self, config: &ScriptConfig, budget: Duration) -> Result<(), DomainError> {
        let config = rhai::serde::to_dynamic(config).map_err(|e| DomainError::ScriptLoad {
            script: self.script.clone(),
            reason: format!("config is not representable in the script: {}", e),
        })?;

        self.state = Dynamic::from_map(Map::new());
        self.scope.clear();

        let deadline = self.deadline.clone();
        let _armed = deadline.arm(budget);

        self.engine
            .run_ast_with_scope(&mut self.scope, &self.ast)
            .map_err(|e| self.map_error(e))?;

        if self.has_function(INIT_FN, 1) {
            self.call(INIT_FN, (config,)).map_err(|e| self.map_error(e))?;
        }
        Ok(())
    }

    fn on_request(
        &mut self,
        request: &DnsRequest,
        response: &mut ResponseDraft,
        budget: Duration,
    ) -> Result<(), DomainError> {
        let script_request = ScriptRequest::from(request);
        let script_response = ScriptResponse::new(response.clone());

        let deadline = self.deadline.clone();
        let _armed = deadline.arm(budget);

        self.call(ON_REQUEST_FN, (script_request, script_response.clone()))
            .map_err(|e| self.map_error(e))?;

        *response = script_response.into_draft();
        Ok(())
    }
}
