mod packets;
mod scripts;
mod test_server;

pub use packets::*;
pub use scripts::*;
pub use test_server::*;
