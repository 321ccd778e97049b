pub mod description;
pub mod easing;
