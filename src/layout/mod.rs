//! Spring-electrical force-directed layout.
//!
//! - `point`/`spring`: per-node particles and per-edge springs
//! - `force_directed`: the simulation engine over a [`GraphView`](crate::graph::GraphView)
//! - `bounds`: padded bounding boxes around the current layout
//! - `renderer`/`scheduler`: notification seam and the loops that drive steps

mod bounds;
mod config;
mod force_directed;
mod point;
mod renderer;
pub mod scheduler;
mod spring;

pub use bounds::{BoundingBox, DEFAULT_EXTENT, DEFAULT_PADDING};
pub use config::LayoutConfig;
pub use force_directed::{ForceDirected, ForceDirected2D, ForceDirected3D, Nearest, StepOutcome};
pub use point::{Point, PointHandle};
pub use renderer::Renderer;
pub use scheduler::RunSummary;
pub use spring::Spring;
