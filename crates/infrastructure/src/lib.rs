pub mod dns;
pub mod scripting;
