//! Parametric mesh generators for the primitives the scene is built from.
//!
//! All generators emit counter-clockwise front faces. Texture coordinates use
//! wgpu's convention (v = 0 is the top row of the image), so no flip is needed
//! at upload time.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use itertools::iproduct;

use crate::geometry::{MeshData, Vertex};

pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut mesh = MeshData::new(format!(
        "Sphere ({radius}, {width_segments}x{height_segments})"
    ));

    for (iy, ix) in iproduct!(0..=height_segments, 0..=width_segments) {
        let v = iy as f32 / height_segments as f32;

        // Shift the pole vertices half a segment so every pole triangle gets its
        // own texture coordinate.
        let u_offset = if iy == 0 {
            0.5 / width_segments as f32
        } else if iy == height_segments {
            -0.5 / width_segments as f32
        } else {
            0.0
        };

        let u = ix as f32 / width_segments as f32;
        let (phi, theta) = (u * TAU, v * PI);

        let position = Vec3::new(
            -radius * phi.cos() * theta.sin(),
            radius * theta.cos(),
            radius * phi.sin() * theta.sin(),
        );

        mesh.vertices.push(Vertex::new(
            position,
            position.normalize_or(Vec3::Y),
            Vec2::new(u + u_offset, v),
        ));
    }

    let row = width_segments + 1;
    for (iy, ix) in iproduct!(0..height_segments, 0..width_segments) {
        let a = iy * row + ix + 1;
        let b = iy * row + ix;
        let c = (iy + 1) * row + ix;
        let d = (iy + 1) * row + ix + 1;

        if iy != 0 {
            mesh.indices.extend([a, b, d]);
        }
        if iy != height_segments - 1 {
            mesh.indices.extend([b, c, d]);
        }
    }

    mesh
}

/// Axis-aligned box centered on the origin, one quad per side.
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vec3::new(width, height, depth) * 0.5;
    let mut mesh = MeshData::new(format!("Box ({width}x{height}x{depth})"));

    // (normal, u axis, v axis) with u x v == normal
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    for (normal, u_axis, v_axis) in faces {
        let first = mesh.vertices.len() as u32;
        let center = normal * half;
        let (u, v) = (u_axis * half, v_axis * half);

        let corners = [
            (center - u - v, Vec2::new(0.0, 1.0)),
            (center + u - v, Vec2::new(1.0, 1.0)),
            (center + u + v, Vec2::new(1.0, 0.0)),
            (center - u + v, Vec2::new(0.0, 0.0)),
        ];

        for (position, tex_coords) in corners {
            mesh.vertices.push(Vertex::new(position, normal, tex_coords));
        }

        mesh.indices
            .extend([first, first + 1, first + 2, first, first + 2, first + 3]);
    }

    mesh
}

/// Torus in the XY plane around the Z axis.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial_segments = radial_segments.max(3);
    let tubular_segments = tubular_segments.max(3);

    let mut mesh = MeshData::new(format!(
        "Torus ({radius}, {tube}, {radial_segments}x{tubular_segments})"
    ));

    for (j, i) in iproduct!(0..=radial_segments, 0..=tubular_segments) {
        let u = i as f32 / tubular_segments as f32 * TAU;
        let v = j as f32 / radial_segments as f32 * TAU;

        let position = Vec3::new(
            (radius + tube * v.cos()) * u.cos(),
            (radius + tube * v.cos()) * u.sin(),
            tube * v.sin(),
        );
        let ring_center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);

        mesh.vertices.push(Vertex::new(
            position,
            (position - ring_center).normalize_or(Vec3::Z),
            Vec2::new(
                i as f32 / tubular_segments as f32,
                1.0 - j as f32 / radial_segments as f32,
            ),
        ));
    }

    let row = tubular_segments + 1;
    for (j, i) in iproduct!(1..=radial_segments, 1..=tubular_segments) {
        let a = row * j + i - 1;
        let b = row * (j - 1) + i - 1;
        let c = row * (j - 1) + i;
        let d = row * j + i;

        mesh.indices.extend([a, b, d, b, c, d]);
    }

    mesh
}

/// Flat annulus in the XY plane facing +Z. Not part of the current scene.
#[allow(dead_code)]
pub fn ring(inner_radius: f32, outer_radius: f32, theta_segments: u32, phi_segments: u32) -> MeshData {
    let theta_segments = theta_segments.max(3);
    let phi_segments = phi_segments.max(1);

    let mut mesh = MeshData::new(format!(
        "Ring ({inner_radius}..{outer_radius}, {theta_segments}x{phi_segments})"
    ));

    let radius_step = (outer_radius - inner_radius) / phi_segments as f32;

    for (j, i) in iproduct!(0..=phi_segments, 0..=theta_segments) {
        let radius = inner_radius + j as f32 * radius_step;
        let angle = i as f32 / theta_segments as f32 * TAU;
        let position = Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0);

        mesh.vertices.push(Vertex::new(
            position,
            Vec3::Z,
            Vec2::new(
                (position.x / outer_radius + 1.0) * 0.5,
                1.0 - (position.y / outer_radius + 1.0) * 0.5,
            ),
        ));
    }

    let row = theta_segments + 1;
    for (j, i) in iproduct!(0..phi_segments, 0..theta_segments) {
        let a = j * row + i;
        let b = a + row;
        let c = a + row + 1;
        let d = a + 1;

        mesh.indices.extend([a, b, d, b, c, d]);
    }

    mesh
}
