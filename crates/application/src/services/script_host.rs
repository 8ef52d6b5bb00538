use crate::ports::{ScriptHandler, ScriptLoader};
use arc_swap::{ArcSwap, ArcSwapOption};
use scriptdns_domain::{DnsRequest, DomainError, ResponseDraft, ZoneConfig, ZoneName};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Slack granted on top of the budget before the async side gives up waiting
/// for a blocking call; the call's own measurement decides the outcome.
const BUDGET_GRACE: Duration = Duration::from_millis(50);

type HandlerSlot = Arc<Mutex<Option<Box<dyn ScriptHandler>>>>;

/// Owns the execution context of one zone's script.
///
/// Every `init` and `onRequest` call runs while holding the slot lock, so the
/// Handler State inside is never touched by two calls at once. The guard is
/// moved into the blocking task and only released when the script returns,
/// even if the caller stopped waiting because the budget ran out.
pub struct ScriptHost {
    zone: ZoneName,
    script_name: ArcSwap<String>,
    slot: HandlerSlot,
    available: Arc<AtomicBool>,
    fallback: ArcSwapOption<ResponseDraft>,
    execution_budget: Duration,
    default_ttl: u32,
}

impl ScriptHost {
    /// Creates an empty host; the zone answers SERVFAIL until `load` succeeds.
    pub fn new(zone: ZoneName, execution_budget: Duration, default_ttl: u32) -> Self {
        Self {
            zone,
            script_name: ArcSwap::from_pointee(String::new()),
            slot: Arc::new(Mutex::new(None)),
            available: Arc::new(AtomicBool::new(false)),
            fallback: ArcSwapOption::empty(),
            execution_budget,
            default_ttl,
        }
    }

    pub fn zone(&self) -> &ZoneName {
        &self.zone
    }

    pub fn script_name(&self) -> Arc<String> {
        self.script_name.load_full()
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    /// Answer used in place of SERVFAIL when the script cannot answer.
    pub fn fallback(&self) -> Option<ResponseDraft> {
        self.fallback.load().as_deref().cloned()
    }

    /// Compiles the zone's script and swaps it in.
    ///
    /// Drain-then-swap: compilation happens first, then the slot lock is
    /// taken, which waits for the in-flight invocation and every invocation
    /// queued before it. The previous Handler State is dropped before the new
    /// script's `init` runs. On any failure the zone becomes unavailable.
    pub async fn load(&self, loader: &dyn ScriptLoader, zone: &ZoneConfig) -> Result<(), DomainError> {
        let script = zone.script_name();
        let compiled = loader.load(zone);

        let mut slot = Arc::clone(&self.slot).lock_owned().await;
        *slot = None;
        self.script_name.store(Arc::new(script.clone()));
        self.fallback.store(self.fallback_draft(zone).map(Arc::new));

        let mut handler = match compiled {
            Ok(handler) => handler,
            Err(e) => {
                self.available.store(false, Ordering::Release);
                error!(zone = %self.zone, script = %script, error = %e, "Script failed to compile, zone unavailable");
                return Err(e);
            }
        };

        let budget = self.execution_budget;
        let config = zone.config.clone();
        let available = Arc::clone(&self.available);
        let task_script = script.clone();

        let task = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let mut result = handler.init(&config, budget);
            if result.is_ok() && started.elapsed() > budget {
                result = Err(DomainError::ScriptTimeout {
                    script: task_script,
                });
            }
            if result.is_ok() {
                *slot = Some(handler);
            }
            available.store(result.is_ok(), Ordering::Release);
            result
        });

        let result = match tokio::time::timeout(budget + BUDGET_GRACE, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                self.available.store(false, Ordering::Release);
                Err(DomainError::ScriptLoad {
                    script: script.clone(),
                    reason: format!("init panicked: {}", join_error),
                })
            }
            Err(_) => {
                self.available.store(false, Ordering::Release);
                Err(DomainError::ScriptTimeout {
                    script: script.clone(),
                })
            }
        };

        match &result {
            Ok(()) => info!(zone = %self.zone, script = %script, "Script loaded"),
            Err(e) => {
                error!(zone = %self.zone, script = %script, error = %e, "Script init failed, zone unavailable")
            }
        }

        result.map_err(|e| match e {
            DomainError::ScriptExecution { script, reason } => {
                DomainError::ScriptLoad { script, reason }
            }
            other => other,
        })
    }

    fn fallback_draft(&self, zone: &ZoneConfig) -> Option<ResponseDraft> {
        let cname = zone.fallback_cname.as_deref()?;
        let mut draft = ResponseDraft::new(zone.fallback_ttl);
        match draft.add_cname(cname) {
            Ok(()) => Some(draft),
            Err(e) => {
                warn!(zone = %self.zone, fallback_cname = %cname, error = %e, "Ignoring unusable fallback CNAME");
                None
            }
        }
    }

    /// Runs the script's `onRequest` for one query on a fresh draft.
    pub async fn invoke(&self, request: &DnsRequest) -> Result<ResponseDraft, DomainError> {
        let mut slot = Arc::clone(&self.slot).lock_owned().await;
        if slot.is_none() {
            return Err(DomainError::ZoneUnavailable(self.zone.to_string()));
        }

        let script = self.script_name();
        let budget = self.execution_budget;
        let default_ttl = self.default_ttl;
        let request = request.clone();
        let zone = self.zone.to_string();
        let task_script = script.to_string();

        let task = tokio::task::spawn_blocking(move || {
            let handler = slot
                .as_mut()
                .ok_or(DomainError::ZoneUnavailable(zone))?;

            let mut draft = ResponseDraft::new(default_ttl);
            let started = Instant::now();
            handler.on_request(&request, &mut draft, budget)?;

            if started.elapsed() > budget {
                return Err(DomainError::ScriptTimeout {
                    script: task_script,
                });
            }
            Ok(draft)
        });

        match tokio::time::timeout(budget + BUDGET_GRACE, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(DomainError::ScriptExecution {
                script: script.to_string(),
                reason: format!("handler panicked: {}", join_error),
            }),
            Err(_) => {
                debug!(zone = %self.zone, script = %script, "Gave up waiting for script, it keeps the lock until it stops");
                Err(DomainError::ScriptTimeout {
                    script: script.to_string(),
                })
            }
        }
    }

    /// Drops the Handler State once the in-flight invocation has finished.
    pub async fn unload(&self) {
        let mut slot = self.slot.lock().await;
        if slot.take().is_some() {
            debug!(zone = %self.zone, "Script unloaded");
        }
        self.available.store(false, Ordering::Release);
    }
}
