//! The lessons, in teaching order.
//!
//! Shader paths are relative to the working directory; run the binaries
//! from this crate's directory.

use glsteps_engine::geometry::{CUBE, TRIANGLE};
use glsteps_engine::render::{SceneDesc, TransformDesc};

use crate::Lesson;

/// A red triangle drawn straight in clip space.
pub fn triangle() -> Lesson {
    Lesson {
        title: "Tutorial 01 - Triangle",
        scene: SceneDesc::new(TRIANGLE).shaders(
            "shaders/SimpleVertexShader.vertexshader",
            "shaders/SimpleFragmentShader.fragmentshader",
        ),
    }
}

/// The same triangle seen through a perspective camera.
pub fn transformed_triangle() -> Lesson {
    Lesson {
        title: "Tutorial 02 - Matrices",
        scene: SceneDesc::new(TRIANGLE)
            .shaders(
                "shaders/SimpleTransform.vertexshader",
                "shaders/SimpleFragmentShader.fragmentshader",
            )
            .transform(TransformDesc::default()),
    }
}

/// A cube with one color per vertex, depth tested.
pub fn colored_cube() -> Lesson {
    Lesson {
        title: "Tutorial 03 - Colored Cube",
        scene: SceneDesc::new(CUBE)
            .shaders(
                "shaders/TransformVertexShader.vertexshader",
                "shaders/ColorFragmentShader.fragmentshader",
            )
            .transform(TransformDesc::default())
            .depth_test(true),
    }
}

pub fn all() -> Vec<Lesson> {
    vec![triangle(), transformed_triangle(), colored_cube()]
}
