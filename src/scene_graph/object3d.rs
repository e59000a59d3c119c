use id_arena::Id;

use crate::scene_graph::scene_model::SceneModelId;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub model_id: SceneModelId,
}

impl Object3D {
    pub fn new(name: impl Into<String>, model_id: SceneModelId, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            model_id,
        }
    }
}
