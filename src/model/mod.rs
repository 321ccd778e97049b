pub mod context;
pub mod property;
