pub mod dclient;
pub mod dclient_cfg;
pub mod dclient_code;

pub use dclient::*;
pub use dclient_cfg::{DriverConfig, IntrVecIds, Platform};
pub use dclient_code::*;
