use super::api;
use rhai::module_resolvers::DummyModuleResolver;
use rhai::{Dynamic, Engine};
use scriptdns_domain::config::ScriptingConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// How often, in operations, the progress callback looks at the clock.
const CLOCK_CHECK_INTERVAL: u64 = 64;
const MAX_EXPR_DEPTH: usize = 64;
const MAX_FN_EXPR_DEPTH: usize = 32;

/// Wall-clock budget shared between a handler and its engine's progress
/// callback. Stored as nanoseconds since `epoch`; zero means unarmed.
#[derive(Clone)]
pub struct Deadline {
    epoch: Instant,
    at: Arc<AtomicU64>,
}

impl Deadline {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            at: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Arms the deadline for one call; it is disarmed when the guard drops.
    pub fn arm(&self, budget: Duration) -> ArmedDeadline<'_> {
        let at = (self.epoch.elapsed() + budget).as_nanos() as u64;
        self.at.store(at.max(1), Ordering::Release);
        ArmedDeadline(self)
    }

    fn expired(&self) -> bool {
        let at = self.at.load(Ordering::Acquire);
        at != 0 && self.epoch.elapsed().as_nanos() as u64 > at
    }
}

pub struct ArmedDeadline<'a>(&'a Deadline);

impl Drop for ArmedDeadline<'_> {
    fn drop(&mut self) {
        self.0.at.store(0, Ordering::Release);
    }
}

/// Builds a sandboxed engine for one script instance.
///
/// No module imports, no `eval`, bounded resources, and a progress callback
/// that terminates the script once `deadline` has passed.
pub fn build_engine(limits: &ScriptingConfig, deadline: Deadline, script: &str) -> Engine {
    let mut engine = Engine::new();

    engine.set_module_resolver(DummyModuleResolver::new());
    engine.disable_symbol("eval");

    engine.set_max_operations(limits.max_operations);
    engine.set_max_call_levels(limits.max_call_levels);
    engine.set_max_expr_depths(MAX_EXPR_DEPTH, MAX_FN_EXPR_DEPTH);
    engine.set_max_string_size(limits.max_string_size);
    engine.set_max_array_size(limits.max_array_size);
    engine.set_max_map_size(limits.max_map_size);

    engine.on_progress(move |ops| {
        if ops % CLOCK_CHECK_INTERVAL == 0 && deadline.expired() {
            return Some(Dynamic::from("execution budget exceeded".to_string()));
        }
        None
    });

    let print_script = script.to_string();
    engine.on_print(move |text| {
        info!(script = %print_script, "{}", text);
    });
    let debug_script = script.to_string();
    engine.on_debug(move |text, _source, pos| {
        debug!(script = %debug_script, position = %pos, "{}", text);
    });

    api::register(&mut engine);
    engine
}
