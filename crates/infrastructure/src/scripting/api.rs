use rhai::{Engine, EvalAltResult, INT};
use scriptdns_domain::{DnsRequest, DomainError, ResponseDraft};
use std::sync::{Arc, Mutex, MutexGuard};

type ScriptResult = Result<(), Box<EvalAltResult>>;

/// Read-only view of the query handed to `onRequest`.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    name: String,
    record_type: String,
    client_address: String,
    transport: String,
    id: INT,
}

impl From<&DnsRequest> for ScriptRequest {
    fn from(request: &DnsRequest) -> Self {
        Self {
            name: request.domain.to_string(),
            record_type: request.record_type.to_string(),
            client_address: request.client_addr.ip().to_string(),
            transport: request.transport.to_string(),
            id: request.id as INT,
        }
    }
}

/// The `response` object: a shared handle on the draft being built.
#[derive(Debug, Clone)]
pub struct ScriptResponse(Arc<Mutex<ResponseDraft>>);

impl ScriptResponse {
    pub fn new(draft: ResponseDraft) -> Self {
        Self(Arc::new(Mutex::new(draft)))
    }

    /// Takes the draft back. Falls back to a copy when the script kept a
    /// reference to the response object.
    pub fn into_draft(self) -> ResponseDraft {
        match Arc::try_unwrap(self.0) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(|p| p.into_inner()),
            Err(shared) => shared.lock().unwrap_or_else(|p| p.into_inner()).clone(),
        }
    }

    fn draft(&self) -> MutexGuard<'_, ResponseDraft> {
        self.0.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn apply(&mut self, op: impl FnOnce(&mut ResponseDraft) -> Result<(), DomainError>) -> ScriptResult {
        op(&mut self.draft()).map_err(|e| e.to_string().into())
    }
}

/// Registers `Request` and `Response` with their fixed property and method
/// sets. Record-builder failures surface as catchable runtime errors.
pub fn register(engine: &mut Engine) {
    engine
        .register_type_with_name::<ScriptRequest>("Request")
        .register_get("name", |r: &mut ScriptRequest| r.name.clone())
        .register_get("type", |r: &mut ScriptRequest| r.record_type.clone())
        .register_get("recordType", |r: &mut ScriptRequest| r.record_type.clone())
        .register_get("clientAddress", |r: &mut ScriptRequest| r.client_address.clone())
        .register_get("transport", |r: &mut ScriptRequest| r.transport.clone())
        .register_get("id", |r: &mut ScriptRequest| r.id);

    engine
        .register_type_with_name::<ScriptResponse>("Response")
        .register_fn("addCName", |r: &mut ScriptResponse, target: &str| {
            r.apply(|d| d.add_cname(target))
        })
        .register_fn("addA", |r: &mut ScriptResponse, ip: &str| r.apply(|d| d.add_a(ip)))
        .register_fn("addAAAA", |r: &mut ScriptResponse, ip: &str| {
            r.apply(|d| d.add_aaaa(ip))
        })
        .register_fn("addTXT", |r: &mut ScriptResponse, text: &str| {
            r.apply(|d| d.add_txt(text))
        })
        .register_fn(
            "addMX",
            |r: &mut ScriptResponse, preference: INT, exchange: &str| {
                r.apply(|d| d.add_mx(preference, exchange))
            },
        )
        .register_fn("addPTR", |r: &mut ScriptResponse, target: &str| {
            r.apply(|d| d.add_ptr(target))
        })
        .register_fn("addNS", |r: &mut ScriptResponse, target: &str| {
            r.apply(|d| d.add_ns(target))
        })
        .register_fn("setTTL", |r: &mut ScriptResponse, seconds: INT| {
            r.apply(|d| d.set_ttl(seconds))
        });
}
