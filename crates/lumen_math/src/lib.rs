//! Math types shared by the Lumen crates: a glam re-export plus the
//! interval, bounding box and ray types used by intersection code.

pub use glam::*;

// Lumen math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::{Ray, AIR_IOR};
