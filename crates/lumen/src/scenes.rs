//! Built-in demo scenes.
//!
//! Scene files are parsed by an external frontend; these constructors cover
//! the same object graph in code for the standalone binary.

use std::f32::consts::PI;
use std::sync::Arc;

use lumen_core::{CheckerboardTexture, Color, ConstantTexture, Texture};
use lumen_math::{Mat4, Transform, UVec2, Vec2, Vec3, Vec4};
use lumen_renderer::bsdf::{Bsdf, Dielectric, Diffuse, HenyeyGreenstein, Principled};
use lumen_renderer::emission::AreaEmission;
use lumen_renderer::light::{EnvironmentMap, Light, PointLight};
use lumen_renderer::shape::{Shape, Sphere, TriangleMesh, Vertex, Volume};
use lumen_renderer::{FovAxis, Instance, PerspectiveCamera, Scene};

/// World-from-camera transform for a camera at `eye` looking at `target`.
fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Transform {
    let forward = (target - eye).normalize();
    let right = up.cross(forward).normalize();
    let true_up = forward.cross(right);

    Transform::new(Mat4::from_cols(
        Vec4::new(right.x, right.y, right.z, 0.0),
        Vec4::new(true_up.x, true_up.y, true_up.z, 0.0),
        Vec4::new(forward.x, forward.y, forward.z, 0.0),
        Vec4::new(eye.x, eye.y, eye.z, 1.0),
    ))
}

fn constant(color: Color) -> Arc<dyn Texture> {
    Arc::new(ConstantTexture::new(color))
}

fn scalar(value: f32) -> Arc<dyn Texture> {
    Arc::new(ConstantTexture::scalar_value(value))
}

fn diffuse(albedo: Color) -> Arc<dyn Bsdf> {
    Arc::new(Diffuse::new(constant(albedo)))
}

fn translate_scale(position: Vec3, scale: f32) -> Transform {
    Transform::new(Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(scale)))
}

/// A rectangle given by its corner and two edge vectors, facing
/// `edge_u x edge_v`.
fn quad(corner: Vec3, edge_u: Vec3, edge_v: Vec3) -> Arc<dyn Shape> {
    let normal = edge_u.cross(edge_v).normalize();
    let vertex = |position: Vec3, uv: Vec2| Vertex {
        position,
        normal,
        uv,
    };
    Arc::new(TriangleMesh::new(
        vec![[0, 1, 2], [0, 2, 3]],
        vec![
            vertex(corner, Vec2::new(0.0, 0.0)),
            vertex(corner + edge_u, Vec2::new(1.0, 0.0)),
            vertex(corner + edge_u + edge_v, Vec2::new(1.0, 1.0)),
            vertex(corner + edge_v, Vec2::new(0.0, 1.0)),
        ],
        false,
    ))
}

/// Material test scene: diffuse, gold and glass spheres on a checkerboard
/// floor, lit by a point light under a dim sky.
pub fn spheres(resolution: UVec2) -> (Scene, PerspectiveCamera) {
    let floor_texture: Arc<dyn Texture> = Arc::new(CheckerboardTexture::new(
        Color::splat(0.2),
        Color::splat(0.7),
        Vec2::new(20.0, 20.0),
    ));
    let floor = Instance::new(
        quad(
            Vec3::new(-20.0, 0.0, -20.0),
            Vec3::new(0.0, 0.0, 40.0),
            Vec3::new(40.0, 0.0, 0.0),
        ),
        None,
        Arc::new(Diffuse::new(floor_texture)),
        None,
        None,
    );

    let matte = Instance::new(
        Arc::new(Sphere::new()),
        Some(translate_scale(Vec3::new(-2.2, 1.0, 0.0), 1.0)),
        diffuse(Color::new(0.6, 0.2, 0.2)),
        None,
        None,
    );

    let gold = Instance::new(
        Arc::new(Sphere::new()),
        Some(translate_scale(Vec3::new(0.0, 1.0, 0.0), 1.0)),
        Arc::new(Principled::new(
            constant(Color::new(1.0, 0.86, 0.57)),
            scalar(0.1),
            scalar(1.0),
            scalar(0.5),
        )),
        None,
        None,
    );

    let glass = Instance::new(
        Arc::new(Sphere::new()),
        Some(translate_scale(Vec3::new(2.2, 1.0, 0.0), 1.0)),
        Arc::new(Dielectric::new(
            scalar(1.5),
            constant(Color::ONE),
            constant(Color::ONE),
        )),
        None,
        None,
    );

    let key_light: Arc<dyn Light> = Arc::new(PointLight::new(
        Vec3::new(4.0, 8.0, -4.0),
        Color::splat(400.0),
    ));
    let sky = Arc::new(EnvironmentMap::new(
        constant(Color::new(0.05, 0.07, 0.1)),
        None,
    ));

    let scene = Scene::new(
        vec![floor, matte, gold, glass],
        vec![key_light, sky.clone()],
        Some(sky),
    );

    let camera = PerspectiveCamera::new(
        40.0,
        FovAxis::Y,
        resolution,
        look_at(Vec3::new(0.0, 2.5, -8.0), Vec3::new(0.0, 1.0, 0.0), Vec3::Y),
    );

    (scene, camera)
}

/// Classic box interior with an emissive ceiling patch.
pub fn cornell(resolution: UVec2) -> (Scene, PerspectiveCamera) {
    let white = Color::splat(0.73);
    let red = Color::new(0.65, 0.05, 0.05);
    let green = Color::new(0.12, 0.45, 0.15);

    let wall = |shape: Arc<dyn Shape>, albedo: Color| {
        Instance::new(shape, None, diffuse(albedo), None, None)
    };

    let s = 2.0;
    let instances = vec![
        // Floor (normal up), ceiling (normal down), back wall (normal -z).
        wall(
            quad(
                Vec3::new(-s, 0.0, -s),
                Vec3::new(0.0, 0.0, 2.0 * s),
                Vec3::new(2.0 * s, 0.0, 0.0),
            ),
            white,
        ),
        wall(
            quad(
                Vec3::new(-s, 2.0 * s, -s),
                Vec3::new(2.0 * s, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 2.0 * s),
            ),
            white,
        ),
        wall(
            quad(
                Vec3::new(-s, 0.0, s),
                Vec3::new(0.0, 2.0 * s, 0.0),
                Vec3::new(2.0 * s, 0.0, 0.0),
            ),
            white,
        ),
        // Left red wall (normal +x), right green wall (normal -x).
        wall(
            quad(
                Vec3::new(-s, 0.0, -s),
                Vec3::new(0.0, 2.0 * s, 0.0),
                Vec3::new(0.0, 0.0, 2.0 * s),
            ),
            red,
        ),
        wall(
            quad(
                Vec3::new(s, 0.0, -s),
                Vec3::new(0.0, 0.0, 2.0 * s),
                Vec3::new(0.0, 2.0 * s, 0.0),
            ),
            green,
        ),
        // Emissive patch just below the ceiling, facing down.
        Instance::new(
            quad(
                Vec3::new(-0.8, 2.0 * s - 0.01, -0.8),
                Vec3::new(1.6, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.6),
            ),
            None,
            diffuse(Color::ZERO),
            Some(Arc::new(AreaEmission::new(constant(Color::splat(12.0))))),
            None,
        ),
        // Two spheres standing in for the boxes.
        Instance::new(
            Arc::new(Sphere::new()),
            Some(translate_scale(Vec3::new(-1.0, 0.7, 0.8), 0.7)),
            diffuse(white),
            None,
            None,
        ),
        Instance::new(
            Arc::new(Sphere::new()),
            Some(translate_scale(Vec3::new(1.0, 0.5, -0.4), 0.5)),
            Arc::new(Dielectric::new(
                scalar(1.5),
                constant(Color::ONE),
                constant(Color::ONE),
            )),
            None,
            None,
        ),
    ];

    let scene = Scene::new(instances, vec![], None);

    let camera = PerspectiveCamera::new(
        55.0,
        FovAxis::Y,
        resolution,
        look_at(
            Vec3::new(0.0, s, -3.0 * s),
            Vec3::new(0.0, s, 0.0),
            Vec3::Y,
        ),
    );

    (scene, camera)
}

/// A homogeneous scattering medium bounded by a sphere, in front of a
/// bright backdrop.
pub fn volume(resolution: UVec2) -> (Scene, PerspectiveCamera) {
    let medium = Instance::new(
        Arc::new(Volume::new(1.0, Some(Arc::new(Sphere::new()) as Arc<dyn Shape>))),
        Some(translate_scale(Vec3::new(0.0, 1.2, 0.0), 1.2)),
        Arc::new(HenyeyGreenstein::new(0.3, Color::splat(0.9))),
        None,
        None,
    );

    let floor = Instance::new(
        quad(
            Vec3::new(-20.0, 0.0, -20.0),
            Vec3::new(0.0, 0.0, 40.0),
            Vec3::new(40.0, 0.0, 0.0),
        ),
        None,
        diffuse(Color::splat(0.5)),
        None,
        None,
    );

    let key_light: Arc<dyn Light> = Arc::new(PointLight::new(
        Vec3::new(3.0, 6.0, -3.0),
        Color::splat(120.0 * PI),
    ));
    let sky = Arc::new(EnvironmentMap::new(
        constant(Color::new(0.4, 0.55, 0.8)),
        None,
    ));

    let scene = Scene::new(
        vec![medium, floor],
        vec![key_light, sky.clone()],
        Some(sky),
    );

    let camera = PerspectiveCamera::new(
        40.0,
        FovAxis::Y,
        resolution,
        look_at(Vec3::new(0.0, 1.8, -6.0), Vec3::new(0.0, 1.2, 0.0), Vec3::Y),
    );

    (scene, camera)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_points_camera_forward() {
        let transform = look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::Y);
        let forward = transform.apply_vector(Vec3::Z);
        assert!((forward - Vec3::Z).length() < 1e-5);
        assert!((transform.apply_point(Vec3::ZERO) - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn test_demo_scenes_construct() {
        let resolution = UVec2::new(64, 48);
        let (scene, camera) = spheres(resolution);
        assert!(scene.has_lights());
        assert_eq!(camera.resolution(), resolution);

        let (scene, _) = cornell(resolution);
        assert!(!scene.has_lights()); // only area light, found by BSDF sampling

        let (scene, _) = volume(resolution);
        assert_eq!(scene.instances().len(), 2);
    }
}
