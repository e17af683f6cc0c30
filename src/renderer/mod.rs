//! Debug-draw module
//!
//! Produces `Pod` line-list vertices an external renderer can upload as-is.
//! Nothing here touches a GPU.

pub mod shapes;
pub mod vertex;

pub use shapes::{body_color, body_outline, contact_markers, world_outlines};
pub use vertex::Vertex;
