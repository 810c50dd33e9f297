use anyhow::{Context, Result};

use crate::device::{DeviceError, GraphicsDevice};
use crate::geometry::Mesh;

/// Vertex attribute slot for positions; must match `layout(location = 0)` in the shaders.
pub const POSITION_ATTRIB: u32 = 0;

/// Vertex attribute slot for colors; must match `layout(location = 1)` in the shaders.
pub const COLOR_ATTRIB: u32 = 1;

/// A [`Mesh`] uploaded to device memory.
///
/// Holds one array buffer per attribute. Only obtainable through
/// [`GpuMesh::upload`], so a draw never references data that was not uploaded.
pub struct GpuMesh<D: GraphicsDevice> {
    positions: D::Buffer,
    colors: Option<D::Buffer>,
    vertex_count: i32,
}

impl<D: GraphicsDevice> GpuMesh<D> {
    /// Uploads `mesh` with a static usage hint. Expects a bound vertex array.
    pub fn upload(device: &D, mesh: &Mesh) -> Result<Self> {
        anyhow::ensure!(
            mesh.is_well_formed(),
            "mesh '{}' has {} positions and {:?} colors",
            mesh.name,
            mesh.positions.len(),
            mesh.colors.map(<[_]>::len)
        );
        let vertex_count = i32::try_from(mesh.vertex_count())
            .with_context(|| format!("mesh '{}' is too large to draw", mesh.name))?;

        let positions = upload_buffer(device, mesh.position_bytes())
            .with_context(|| format!("failed to upload positions of '{}'", mesh.name))?;

        let colors = match mesh.color_bytes() {
            None => None,
            Some(bytes) => match upload_buffer(device, bytes) {
                Ok(buffer) => Some(buffer),
                Err(e) => {
                    device.delete_buffer(positions);
                    return Err(e)
                        .with_context(|| format!("failed to upload colors of '{}'", mesh.name));
                }
            },
        };

        log::debug!(
            "uploaded mesh '{}': {} vertices, colors: {}",
            mesh.name,
            vertex_count,
            colors.is_some()
        );

        Ok(Self {
            positions,
            colors,
            vertex_count,
        })
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    /// Binds the attribute buffers and submits one draw of every vertex.
    pub fn draw(&self, device: &D) {
        bind_attrib(device, POSITION_ATTRIB, self.positions);
        if let Some(colors) = self.colors {
            bind_attrib(device, COLOR_ATTRIB, colors);
        }

        device.draw_triangles(0, self.vertex_count);

        device.disable_vertex_attrib(POSITION_ATTRIB);
        if self.colors.is_some() {
            device.disable_vertex_attrib(COLOR_ATTRIB);
        }
    }

    /// Deletes the device buffers.
    pub fn release(self, device: &D) {
        device.delete_buffer(self.positions);
        if let Some(colors) = self.colors {
            device.delete_buffer(colors);
        }
    }
}

fn upload_buffer<D: GraphicsDevice>(device: &D, bytes: &[u8]) -> Result<D::Buffer, DeviceError> {
    let buffer = device.create_buffer()?;
    device.bind_array_buffer(Some(buffer));
    device.array_buffer_data_static(bytes);
    Ok(buffer)
}

fn bind_attrib<D: GraphicsDevice>(device: &D, index: u32, buffer: D::Buffer) {
    device.enable_vertex_attrib(index);
    device.bind_array_buffer(Some(buffer));
    device.vertex_attrib_f32(index, 3);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CUBE, TRIANGLE};
    use crate::testing::{Call, RecordingDevice};

    #[test]
    fn triangle_uploads_one_buffer() {
        let dev = RecordingDevice::new();
        let mesh = GpuMesh::upload(&dev, &TRIANGLE).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(dev.live_buffers(), 1);
        assert!(dev.calls().contains(&Call::ArrayBufferData { bytes: 36 }));
    }

    #[test]
    fn cube_uploads_positions_and_colors() {
        let dev = RecordingDevice::new();
        let mesh = GpuMesh::upload(&dev, &CUBE).unwrap();

        assert_eq!(mesh.vertex_count(), 36);
        assert_eq!(dev.live_buffers(), 2);
    }

    #[test]
    fn draw_enables_attributes_around_a_single_draw() {
        let dev = RecordingDevice::new();
        let mesh = GpuMesh::upload(&dev, &CUBE).unwrap();
        dev.clear_calls();

        mesh.draw(&dev);

        let calls = dev.calls();
        let draw = calls
            .iter()
            .position(|c| matches!(c, Call::DrawTriangles { .. }))
            .unwrap();
        for index in [POSITION_ATTRIB, COLOR_ATTRIB] {
            let enable = calls
                .iter()
                .position(|c| *c == Call::EnableVertexAttrib { index })
                .unwrap();
            let disable = calls
                .iter()
                .position(|c| *c == Call::DisableVertexAttrib { index })
                .unwrap();
            assert!(enable < draw && draw < disable);
        }
        assert_eq!(dev.draw_calls(), vec![(0, 36)]);
    }

    #[test]
    fn release_deletes_every_buffer() {
        let dev = RecordingDevice::new();
        GpuMesh::upload(&dev, &CUBE).unwrap().release(&dev);
        assert_eq!(dev.live_buffers(), 0);
    }

    #[test]
    fn buffer_creation_failure_is_reported() {
        let dev = RecordingDevice::new();
        dev.fail_buffer_creation();
        let err = GpuMesh::upload(&dev, &TRIANGLE).err().unwrap();
        assert!(format!("{err:#}").contains("failed to create buffer"));
    }
}
