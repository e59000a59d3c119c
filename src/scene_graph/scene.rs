use id_arena::Arena;

use crate::scene_graph::light::Lights;
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_model::{SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

/// Flat scene graph. Objects are only ever added, never removed.
pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<SceneModel>,
    /// Texture asset stretched over the whole viewport behind everything else.
    pub background: Option<String>,
    pub lights: Lights,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            models: Arena::new(),
            background: None,
            lights: Lights::default(),
        }
    }

    pub fn add_model(&mut self, model: SceneModel) -> SceneModelId {
        self.models.alloc(model)
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        model_id: SceneModelId,
        transform: Transform,
    ) -> ObjectId {
        self.add_object(Object3D::new(name, model_id, transform))
    }

    pub fn get_object_transform_mut(&mut self, id: ObjectId) -> Option<&mut Transform> {
        self.objects.get_mut(id).map(|object| &mut object.transform)
    }

    pub fn objects_using_model(&self, model_id: SceneModelId) -> impl Iterator<Item = &Object3D> {
        self.objects
            .iter()
            .map(|(_, object)| object)
            .filter(move |object| object.model_id == model_id)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::geometry::primitives;
    use crate::scene_graph::material::Material;

    #[test]
    fn spawned_objects_share_models() {
        let mut scene = Scene::new();
        let star = scene.add_model(SceneModel::new(
            "Star",
            primitives::sphere(0.25, 8, 8),
            Material::standard("Star", 0xffffff),
        ));
        let cube = scene.add_model(SceneModel::new(
            "Cube",
            primitives::cuboid(1.0, 1.0, 1.0),
            Material::basic("Cube"),
        ));

        for i in 0..3 {
            scene.spawn("Star", star, Transform::from_translation(Vec3::X * i as f32));
        }
        scene.spawn("Cube", cube, Transform::default());

        assert_eq!(scene.objects_using_model(star).count(), 3);
        assert_eq!(scene.objects_using_model(cube).count(), 1);
    }

    #[test]
    fn transforms_are_mutable_through_handles() {
        let mut scene = Scene::new();
        let model = scene.add_model(SceneModel::new(
            "Cube",
            primitives::cuboid(1.0, 1.0, 1.0),
            Material::basic("Cube"),
        ));
        let id = scene.spawn("Cube", model, Transform::default());

        scene.get_object_transform_mut(id).unwrap().rotation.y += 0.5;

        assert_eq!(scene.objects[id].transform.rotation.y, 0.5);
        assert_eq!(scene.objects[id].name, "Cube");
    }
}
