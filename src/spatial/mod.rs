//! Geometry primitives shared by the simulator and the heuristics

pub mod geom;

pub use geom::{Point, Vect};
