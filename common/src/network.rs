pub mod host;
pub mod mac;
pub mod range;
pub mod target;
pub mod vendor;
