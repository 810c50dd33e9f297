//! Static geometry shipped with the engine.
//!
//! Vertex data is plain constant data, kept apart from the code that uploads
//! and draws it.

mod mesh;
mod shapes;

pub use mesh::Mesh;
pub use shapes::{CUBE, CUBE_COLORS, CUBE_POSITIONS, TRIANGLE, TRIANGLE_POSITIONS};
