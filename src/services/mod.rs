pub mod backend;
pub mod catalog;
pub mod identity;
pub mod session;
