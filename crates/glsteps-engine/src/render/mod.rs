//! Static rendering.
//!
//! Geometry is uploaded once; every frame re-issues the same bind + draw sequence.
//! Renderers own their device objects and release them explicitly.

mod mesh;
mod scene;

pub use mesh::{GpuMesh, COLOR_ATTRIB, POSITION_ATTRIB};
pub use scene::{SceneDesc, StaticScene, TransformDesc};
