use anyhow::ensure;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

pub mod primitives;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    /// xyz is the tangent, w the bitangent sign.
    pub tangent: Vec4,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            tangent: Vec4::new(1.0, 0.0, 0.0, 1.0),
        }
    }
}

/// CPU-side triangle mesh.
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Fills in per-vertex tangents with mikktspace. Needed by normal-mapped
    /// materials; the primitive generators only produce a placeholder.
    pub fn generate_tangents(&mut self) -> anyhow::Result<()> {
        ensure!(
            self.indices.len() % 3 == 0,
            "Mesh {} has a dangling index",
            self.name
        );

        let generated = bevy_mikktspace::generate_tangents(&mut MikktspaceMesh(self));
        ensure!(generated, "Failed to generate tangents for {}", self.name);

        Ok(())
    }

    fn corner(&self, face: usize, vert: usize) -> usize {
        self.indices[face * 3 + vert] as usize
    }
}

struct MikktspaceMesh<'a>(&'a mut MeshData);

impl MikktspaceMesh<'_> {
    fn vertex(&self, face: usize, vert: usize) -> &Vertex {
        &self.0.vertices[self.0.corner(face, vert)]
    }
}

impl bevy_mikktspace::Geometry for MikktspaceMesh<'_> {
    fn num_faces(&self) -> usize {
        self.0.triangle_count()
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.vertex(face, vert).position.into()
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.vertex(face, vert).normal.into()
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.vertex(face, vert).tex_coords.into()
    }

    fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
        let index = self.0.corner(face, vert);
        self.0.vertices[index].tangent = Vec4::from(tangent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tangents_follow_the_u_direction_of_a_flat_quad() {
        let mut mesh = MeshData::new("Quad");
        // u grows along +X, v along -Y (wgpu convention), normal +Z.
        mesh.vertices = vec![
            Vertex::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::Z, Vec2::new(0.0, 0.0)),
            Vertex::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::Z, Vec2::new(0.0, 1.0)),
            Vertex::new(Vec3::new(1.0, -1.0, 0.0), Vec3::Z, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(1.0, 1.0, 0.0), Vec3::Z, Vec2::new(1.0, 0.0)),
        ];
        mesh.indices = vec![0, 1, 2, 0, 2, 3];

        mesh.generate_tangents().unwrap();

        for vertex in &mesh.vertices {
            assert!(vertex.tangent.truncate().abs_diff_eq(Vec3::X, 1e-4));
            assert_eq!(vertex.tangent.w.abs(), 1.0);
        }
    }

    #[test]
    fn dangling_indices_are_rejected() {
        let mut mesh = MeshData::new("Broken");
        mesh.vertices = vec![Vertex::new(Vec3::ZERO, Vec3::Z, Vec2::ZERO); 2];
        mesh.indices = vec![0, 1];

        assert!(mesh.generate_tangents().is_err());
    }
}
