pub mod cache;
pub mod composite;
pub mod gradient;
pub mod layer;
pub mod sampler;
