/// Non-indexed triangle list with optional per-vertex colors.
///
/// Invariant: when `colors` is present it holds exactly one RGB entry per position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mesh {
    pub name: &'static str,
    pub positions: &'static [[f32; 3]],
    pub colors: Option<&'static [[f32; 3]]>,
}

impl Mesh {
    /// Number of vertices submitted by one draw of the whole mesh.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Checks the color invariant and that positions form whole triangles.
    pub fn is_well_formed(&self) -> bool {
        let whole_triangles = self.positions.len() % 3 == 0;
        let colors_match = self
            .colors
            .is_none_or(|colors| colors.len() == self.positions.len());
        whole_triangles && colors_match
    }

    /// Position data as raw bytes, ready for upload.
    #[inline]
    pub fn position_bytes(&self) -> &'static [u8] {
        bytemuck::cast_slice(self.positions)
    }

    /// Color data as raw bytes, ready for upload.
    #[inline]
    pub fn color_bytes(&self) -> Option<&'static [u8]> {
        self.colors.map(bytemuck::cast_slice)
    }
}
