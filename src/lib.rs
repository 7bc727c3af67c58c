pub mod browser;
pub mod error;
pub mod memory;
pub mod server;
pub mod tools;
