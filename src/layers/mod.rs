pub mod attribution;
pub mod base;
pub mod manager;
