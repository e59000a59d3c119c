//! The scene and the two update sources that animate it.
//!
//! Field ownership: the camera pose belongs to the scroll responder
//! ([`DemoState::move_camera`]), which overwrites it from the scroll offset.
//! The torus rotation belongs to the frame ticker ([`DemoState::tick`]). The
//! moon rotation is accumulated by both, the avatar rotation by the scroll
//! responder only.

use anyhow::{ensure, Context};
use glam::{DVec3, Vec3};
use log::{debug, info};
use rand::Rng;
use winit::event::MouseScrollDelta;

use crate::{
    camera::Camera,
    config::DemoConfig,
    geometry::{primitives, MeshData},
    scroll::PageScroll,
    scene_graph::{
        AmbientLight, Lights, Material, ObjectId, PointLight, Scene, SceneModel, Transform,
    },
};

/// Camera pose per pixel of scroll offset. Assigned, never accumulated.
pub const CAMERA_Z_PER_SCROLL: f32 = -0.01;
pub const CAMERA_X_PER_SCROLL: f32 = -0.0002;
pub const CAMERA_YAW_PER_SCROLL: f64 = -0.0002;

/// Added on every scroll event, however far the page moved.
pub const MOON_SPIN_PER_SCROLL: DVec3 = DVec3::new(0.05, 0.075, 0.05);
pub const AVATAR_SPIN_PER_SCROLL: DVec3 = DVec3::new(0.0, 0.01, 0.01);

/// Added on every frame.
pub const TORUS_SPIN_PER_FRAME: DVec3 = DVec3::new(0.01, 0.005, 0.01);
pub const MOON_SPIN_PER_FRAME: DVec3 = DVec3::new(0.005, 0.0, 0.0);

pub const BACKGROUND_TEXTURE: &str = "space.jpg";
pub const AVATAR_TEXTURE: &str = "nimrod.jpg";
pub const MOON_TEXTURE: &str = "moon.jpg";
pub const MOON_NORMAL_MAP: &str = "normal.jpg";

pub struct DemoState {
    pub camera: Camera,
    pub scene: Scene,
    torus: ObjectId,
    moon: ObjectId,
    avatar: ObjectId,
    stars: Vec<ObjectId>,
    scroll_events: u64,
    frames: u64,
}

impl DemoState {
    pub fn new(config: &DemoConfig) -> anyhow::Result<Self> {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Builds the scene, drawing star positions from `rng`.
    pub fn with_rng(config: &DemoConfig, rng: &mut impl Rng) -> anyhow::Result<Self> {
        ensure!(
            config.star_spread.is_finite(),
            "Star spread must be finite, got {}",
            config.star_spread
        );

        let mut camera = Camera::perspective(75.0, config.aspect_ratio(), 0.1, 1000.0);
        camera.transform.position = Vec3::new(-3.0, 0.0, 30.0);

        let mut scene = Scene::new();

        scene.lights = Lights {
            point: PointLight {
                position: Vec3::new(5.0, 5.0, 5.0),
                color: 0xffffff,
                intensity: 1.0,
            },
            ambient: AmbientLight {
                color: 0xffffff,
                intensity: 1.0,
            },
        };

        let torus_model = scene.add_model(SceneModel::new(
            "Torus",
            with_tangents(primitives::torus(10.0, 3.0, 16, 100))?,
            Material::standard("Torus", 0x004680),
        ));
        let torus = scene.spawn("Torus", torus_model, Transform::default());

        let star_model = scene.add_model(SceneModel::new(
            "Star",
            with_tangents(primitives::sphere(0.25, 24, 24))?,
            Material::standard("Star", 0xffffff),
        ));
        let stars = (0..config.star_count)
            .map(|i| {
                let position = random_star_position(rng, config.star_spread.abs());
                scene.spawn(
                    format!("Star {i}"),
                    star_model,
                    Transform::from_translation(position),
                )
            })
            .collect::<Vec<_>>();

        scene.background = Some(BACKGROUND_TEXTURE.to_string());

        let avatar_model = scene.add_model(SceneModel::new(
            "Avatar",
            with_tangents(primitives::cuboid(3.0, 3.0, 3.0))?,
            Material::basic("Avatar").with_map(AVATAR_TEXTURE),
        ));
        let avatar = scene.spawn(
            "Avatar",
            avatar_model,
            Transform::from_translation(Vec3::new(2.0, 0.0, -5.0)),
        );

        let moon_model = scene.add_model(SceneModel::new(
            "Moon",
            with_tangents(primitives::sphere(3.0, 32, 32))?,
            Material::standard("Moon", 0xffffff)
                .with_map(MOON_TEXTURE)
                .with_normal_map(MOON_NORMAL_MAP),
        ));
        let moon = scene.spawn(
            "Moon",
            moon_model,
            Transform::from_translation(Vec3::new(-10.0, 0.0, 30.0)),
        );

        info!(
            "Scene ready: {} objects, {} models, {} stars",
            scene.objects.len(),
            scene.models.len(),
            stars.len()
        );

        Ok(Self {
            camera,
            scene,
            torus,
            moon,
            avatar,
            stars,
            scroll_events: 0,
            frames: 0,
        })
    }

    /// Scroll responder. `t` is the page top relative to the viewport top.
    ///
    /// The camera pose is a pure function of `t`; the moon and avatar only count
    /// how many times this ran.
    pub fn move_camera(&mut self, t: f32) {
        self.scroll_events += 1;
        debug!("Scroll event {} at offset {t}", self.scroll_events);

        if let Some(moon) = self.scene.get_object_transform_mut(self.moon) {
            moon.rotate(MOON_SPIN_PER_SCROLL);
        }

        if let Some(avatar) = self.scene.get_object_transform_mut(self.avatar) {
            avatar.rotate(AVATAR_SPIN_PER_SCROLL);
        }

        let camera = &mut self.camera.transform;
        camera.position.z = t * CAMERA_Z_PER_SCROLL;
        camera.position.x = t * CAMERA_X_PER_SCROLL;
        camera.rotation.y = f64::from(t) * CAMERA_YAW_PER_SCROLL;
    }

    /// Initial responder call, made once before the first frame so the camera
    /// starts at the pose of the current page offset.
    pub fn start(&mut self, page: &PageScroll) {
        self.move_camera(page.offset());
    }

    /// Feeds a wheel event through the page. The responder only runs when the
    /// page actually moved; returns whether it did.
    pub fn on_wheel(&mut self, page: &mut PageScroll, delta: MouseScrollDelta) -> bool {
        match page.apply_wheel(delta) {
            Some(offset) => {
                self.move_camera(offset);
                true
            }
            None => false,
        }
    }

    /// Per-frame rotation update.
    pub fn tick(&mut self) {
        self.frames += 1;

        if let Some(torus) = self.scene.get_object_transform_mut(self.torus) {
            torus.rotate(TORUS_SPIN_PER_FRAME);
        }

        if let Some(moon) = self.scene.get_object_transform_mut(self.moon) {
            moon.rotate(MOON_SPIN_PER_FRAME);
        }
    }

    /// Called once the real surface size is known.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.aspect = width as f32 / height as f32;
        }
    }

    pub fn torus(&self) -> &Transform {
        self.transform(self.torus)
    }

    pub fn moon(&self) -> &Transform {
        self.transform(self.moon)
    }

    pub fn avatar(&self) -> &Transform {
        self.transform(self.avatar)
    }

    pub fn stars(&self) -> impl Iterator<Item = &Transform> {
        self.stars.iter().map(|&id| self.transform(id))
    }

    pub fn scroll_events(&self) -> u64 {
        self.scroll_events
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn transform(&self, id: ObjectId) -> &Transform {
        // Handles are only ever created by `with_rng` and objects are never removed.
        &self.scene.objects[id].transform
    }
}

fn random_star_position(rng: &mut impl Rng, spread: f32) -> Vec3 {
    let mut coordinate = || rng.gen_range(-spread..=spread);
    Vec3::new(coordinate(), coordinate(), coordinate())
}

fn with_tangents(mut mesh: MeshData) -> anyhow::Result<MeshData> {
    mesh.generate_tangents()
        .with_context(|| format!("Failed to prepare mesh {}", mesh.name))?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    const EPSILON: f32 = 1e-4;
    const ANGLE_EPSILON: f64 = 1e-9;

    fn demo() -> DemoState {
        let mut rng = StdRng::seed_from_u64(7);
        DemoState::with_rng(&DemoConfig::default(), &mut rng).unwrap()
    }

    fn page() -> PageScroll {
        PageScroll::from_config(&DemoConfig::default())
    }

    #[test]
    fn start_runs_the_responder_once() {
        let mut demo = demo();

        demo.start(&page());

        assert_eq!(demo.scroll_events(), 1);
        assert_eq!(demo.camera.transform.position.z, 0.0);
        assert_eq!(demo.camera.transform.position.x, 0.0);
        assert!((demo.moon().rotation.x - 0.05).abs() < ANGLE_EPSILON);
        assert!((demo.avatar().rotation.y - 0.01).abs() < ANGLE_EPSILON);
    }

    #[test]
    fn wheel_up_at_the_top_adds_no_spin() {
        let mut demo = demo();
        let mut page = page();
        demo.start(&page);
        let moon = *demo.moon();

        let moved = demo.on_wheel(&mut page, MouseScrollDelta::LineDelta(0.0, 2.0));

        assert!(!moved);
        assert_eq!(demo.scroll_events(), 1);
        assert_eq!(*demo.moon(), moon);
        assert_eq!(demo.camera.transform.position.z, 0.0);
    }

    #[test]
    fn wheel_down_moves_camera_from_the_new_offset() {
        let mut demo = demo();
        let mut page = page();
        demo.start(&page);

        // Three lines of 40 px each.
        let moved = demo.on_wheel(&mut page, MouseScrollDelta::LineDelta(0.0, -3.0));

        assert!(moved);
        assert_eq!(page.offset(), -120.0);
        assert_eq!(demo.scroll_events(), 2);
        assert!((demo.camera.transform.position.z - 1.2).abs() < EPSILON);
        assert!((demo.moon().rotation.x - 0.1).abs() < ANGLE_EPSILON);
    }

    #[test]
    fn scrolling_down_pulls_camera_back() {
        let mut demo = demo();

        demo.move_camera(-1000.0);

        let camera = &demo.camera.transform;
        assert!((camera.position.z - 10.0).abs() < EPSILON);
        assert!((camera.position.x - 0.2).abs() < EPSILON);
        assert!((camera.rotation.y - 0.2).abs() < ANGLE_EPSILON);
    }

    #[test]
    fn camera_pose_is_last_write_wins() {
        let mut demo = demo();
        let offsets = [-10.0, -850.0, -3.0, -420.0];

        for t in offsets {
            demo.move_camera(t);
        }

        let camera = &demo.camera.transform;
        assert!((camera.position.z - (-420.0 * -0.01)).abs() < EPSILON);
        assert!((camera.position.x - (-420.0 * -0.0002)).abs() < EPSILON);
    }

    #[test]
    fn scroll_spin_counts_events_not_distance() {
        let mut near = demo();
        let mut far = demo();

        for _ in 0..5 {
            near.move_camera(-1.0);
            far.move_camera(-4000.0);
        }

        assert!((near.moon().rotation.x - 0.25).abs() < ANGLE_EPSILON);
        assert!(near.moon().rotation.abs_diff_eq(far.moon().rotation, 1e-6));
        assert!(near.avatar().rotation.abs_diff_eq(far.avatar().rotation, 1e-6));
        assert!((near.moon().rotation.y - 5.0 * 0.075).abs() < ANGLE_EPSILON);
        assert!((near.avatar().rotation.z - 0.05).abs() < ANGLE_EPSILON);
        assert_eq!(near.avatar().rotation.x, 0.0);
        assert_eq!(near.scroll_events(), 5);
    }

    #[test]
    fn ticks_accumulate_linearly() {
        let mut demo = demo();

        for _ in 0..100 {
            demo.tick();
        }

        let torus = demo.torus();
        assert!((torus.rotation.x - 1.0).abs() < ANGLE_EPSILON);
        assert!((torus.rotation.y - 0.5).abs() < ANGLE_EPSILON);
        assert!((torus.rotation.z - 1.0).abs() < ANGLE_EPSILON);
        assert!((demo.moon().rotation.x - 0.5).abs() < ANGLE_EPSILON);
        assert_eq!(demo.frames(), 100);
    }

    #[test]
    fn ticks_leave_camera_and_avatar_alone() {
        let mut demo = demo();
        demo.move_camera(-200.0);
        let camera = demo.camera.transform;
        let avatar = *demo.avatar();

        for _ in 0..10 {
            demo.tick();
        }

        assert_eq!(demo.camera.transform, camera);
        assert_eq!(*demo.avatar(), avatar);
    }

    #[test]
    fn starfield_fills_the_spread_cube() {
        let demo = demo();

        let stars = demo.stars().collect::<Vec<_>>();
        assert_eq!(stars.len(), 400);

        for star in stars {
            assert!(star.position.abs().max_element() <= 100.0);
        }
    }

    #[test]
    fn starfield_is_reproducible_with_a_seed() {
        let a = demo();
        let b = demo();

        assert!(a
            .stars()
            .zip(b.stars())
            .all(|(a, b)| a.position == b.position));
    }

    #[test]
    fn initial_placement() {
        let demo = demo();

        assert_eq!(demo.moon().position, Vec3::new(-10.0, 0.0, 30.0));
        assert_eq!(demo.avatar().position, Vec3::new(2.0, 0.0, -5.0));
        assert_eq!(demo.camera.transform.position, Vec3::new(-3.0, 0.0, 30.0));
        assert_eq!(demo.scene.background.as_deref(), Some(BACKGROUND_TEXTURE));
        // Torus, star, avatar, moon
        assert_eq!(demo.scene.models.len(), 4);
        assert_eq!(demo.scene.objects.len(), 403);
    }

    #[test]
    fn torus_keeps_spinning_at_large_angles() {
        let mut demo = demo();
        let torus = demo.torus;
        if let Some(transform) = demo.scene.get_object_transform_mut(torus) {
            transform.rotation = DVec3::splat(131_072.0);
        }

        demo.tick();

        assert!(demo.torus().rotation.y > 131_072.0);
        assert!((demo.torus().rotation.y - 131_072.005).abs() < ANGLE_EPSILON);
    }

    #[test]
    fn negative_spread_is_treated_as_its_magnitude() {
        let config = DemoConfig {
            star_spread: -20.0,
            ..DemoConfig::default()
        };

        let demo = DemoState::with_rng(&config, &mut StdRng::seed_from_u64(3)).unwrap();

        assert!(demo
            .stars()
            .all(|star| star.position.abs().max_element() <= 20.0));
    }

    #[test]
    fn non_finite_spread_is_rejected() {
        let config = DemoConfig {
            star_spread: f32::NAN,
            ..DemoConfig::default()
        };

        assert!(DemoState::with_rng(&config, &mut StdRng::seed_from_u64(3)).is_err());
    }
}
