pub mod drag;
pub mod layout;
