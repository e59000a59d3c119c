use id_arena::Id;

use crate::{
    geometry::MeshData, rendering::render_model::RenderModelId, scene_graph::material::Material,
};

pub type SceneModelId = Id<SceneModel>;

/// A mesh paired with the material it is drawn with. Objects sharing a model
/// are drawn as instances of it.
pub struct SceneModel {
    pub name: String,
    pub mesh: MeshData,
    pub material: Material,
    pub render_model: Option<RenderModelId>,
}

impl SceneModel {
    pub fn new(name: impl Into<String>, mesh: MeshData, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            render_model: None,
        }
    }
}
