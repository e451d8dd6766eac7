use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// One vertex: a position in normalized device coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
}

impl Vertex {
    /// Slot 0, three floats, no normalization, tightly packed.
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex { pos: [-1.0, -1.0, 0.0] },
    Vertex { pos: [1.0, -1.0, 0.0] },
    Vertex { pos: [0.0, 1.0, 0.0] },
];

/// The demo triangle, uploaded once and never modified.
///
/// The buffer also carries `COPY_SRC` so its contents can be read back.
pub struct TriangleGeometry {
    vbo: wgpu::Buffer,
}

impl TriangleGeometry {
    pub fn upload(device: &wgpu::Device) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trishade triangle vbo"),
            contents: bytemuck::cast_slice(&TRIANGLE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_SRC,
        });

        log::debug!(
            "uploaded triangle: {} vertices, {} bytes",
            TRIANGLE_VERTICES.len(),
            vbo.size()
        );

        Self { vbo }
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        TRIANGLE_VERTICES.len() as u32
    }

    #[inline]
    pub fn layout(&self) -> wgpu::VertexBufferLayout<'static> {
        Vertex::layout()
    }

    #[inline]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.vbo
    }

    /// Binds the vertex buffer at slot 0 and draws the triangle.
    ///
    /// The pipeline must already be set on `rpass`.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.draw(0..self.vertex_count(), 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{GpuInit, HeadlessGpu};

    #[test]
    fn layout_is_three_packed_floats_at_slot_zero() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(layout.attributes.len(), 1);

        let attr = layout.attributes[0];
        assert_eq!(attr.shader_location, 0);
        assert_eq!(attr.offset, 0);
        assert_eq!(attr.format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    fn vertex_bytes_are_the_raw_floats() {
        let floats: &[f32] = bytemuck::cast_slice(&TRIANGLE_VERTICES);
        assert_eq!(
            floats,
            &[-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn upload_reads_back_unchanged() {
        let gpu = match HeadlessGpu::block_on(GpuInit::headless()) {
            Ok(gpu) => gpu,
            Err(err) => {
                eprintln!("skipping: {err:#}");
                return;
            }
        };

        let geometry = TriangleGeometry::upload(gpu.device());
        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.buffer().size(), 36);

        let bytes = gpu
            .read_buffer(geometry.buffer(), geometry.buffer().size())
            .expect("read back vertex buffer");
        let floats: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let expected: &[f32] = bytemuck::cast_slice(&TRIANGLE_VERTICES);
        assert_eq!(floats, expected);
    }
}
