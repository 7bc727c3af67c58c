pub mod fetch;
pub mod memory;
pub mod screenshot;
pub mod search;
