pub mod listener;
pub mod query_parser;
pub mod response_encoder;
pub mod server;
pub mod worker_pool;

pub use listener::{DnsServer, ServerOptions};
pub use server::DnsServerHandler;
