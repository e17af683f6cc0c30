//! Deterministic simulation module
//!
//! This module must stay pure and deterministic:
//! - Bodies and contacts are processed in ascending id order
//! - Grid cells live in ordered maps
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod events;
pub mod grid;
pub mod joint;
pub mod resolver;
pub mod world;

pub use body::{Body, BodyId, CollisionGroup, Mass};
pub use collision::{Contact, detect};
pub use events::{CollisionEvent, CollisionListener};
pub use grid::Grid;
pub use joint::{Joint, JointId};
pub use resolver::ResolverParams;
pub use world::{ContactManifold, World};
