//! Volume propagation: extending sparse slice annotations to a volume

pub mod config;
pub mod engine;
pub mod plan;

pub use config::{ProjectionMode, PropagationOptions};
pub use engine::VolumePropagationEngine;
