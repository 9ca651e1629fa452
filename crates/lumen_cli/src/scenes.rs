//! Built-in demo scenes.

use clap::ValueEnum;
use lumen_renderer::{Camera, Color, Light, Material, Primitive, Scene, Sphere, Texture, Triangle, Vec3};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoScene {
    /// Colored spheres in an open room lit by a glowing sphere
    #[default]
    Spheres,
    /// Closed box with a light panel, a mirror ball and a glass ball
    Cornell,
    /// Clear and tinted glass over a checkered floor
    Glass,
}

impl DemoScene {
    /// Build the scene and a camera framing it.
    ///
    /// Every scene carries emissive geometry for path tracing and explicit
    /// lights at the same spots for direct lighting.
    pub fn build(self) -> (Scene, Camera) {
        let (scene, camera) = match self {
            DemoScene::Spheres => spheres(),
            DemoScene::Cornell => cornell(),
            DemoScene::Glass => glass(),
        };
        log::info!(
            "Built {:?} scene: {} primitives, {} lights",
            self,
            scene.primitives.len(),
            scene.lights.len()
        );
        (scene, camera)
    }
}

/// Two triangles spanning `a b c d`, wound so the normal follows
/// `(b - a) x (c - a)`.
fn quad(scene: &mut Scene, a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: Material) {
    scene.add(Triangle::new(a, b, c, material.clone()));
    scene.add(Triangle::new(a, c, d, material));
}

/// Regular tetrahedron of circumradius `size` around the origin.
fn tetrahedron(size: f32, material: Material) -> Vec<Box<dyn Primitive>> {
    let s = size / 3f32.sqrt();
    let [a, b, c, d] = [
        Vec3::new(s, s, s),
        Vec3::new(s, -s, -s),
        Vec3::new(-s, s, -s),
        Vec3::new(-s, -s, s),
    ];
    vec![
        Box::new(Triangle::new(a, b, c, material.clone())),
        Box::new(Triangle::new(a, c, d, material.clone())),
        Box::new(Triangle::new(a, d, b, material.clone())),
        Box::new(Triangle::new(b, d, c, material)),
    ]
}

fn spheres() -> (Scene, Camera) {
    let mut scene = Scene::new();

    let grey = Material::lambertian(Color::splat(0.25));
    quad(
        &mut scene,
        Vec3::new(-40.0, 10.0, -10.0),
        Vec3::new(40.0, 10.0, -10.0),
        Vec3::new(40.0, 10.0, 20.0),
        Vec3::new(-40.0, 10.0, 20.0),
        grey,
    );
    quad(
        &mut scene,
        Vec3::new(-40.0, -5.0, -10.0),
        Vec3::new(-40.0, -5.0, 20.0),
        Vec3::new(40.0, -5.0, 20.0),
        Vec3::new(40.0, -5.0, -10.0),
        Material::lambertian(Color::new(0.75, 0.25, 0.25)),
    );
    quad(
        &mut scene,
        Vec3::new(-40.0, -5.0, 20.0),
        Vec3::new(-40.0, 10.0, 20.0),
        Vec3::new(40.0, 10.0, 20.0),
        Vec3::new(40.0, -5.0, 20.0),
        Material::lambertian(Color::new(0.25, 0.25, 0.75)),
    );

    scene.add(Sphere::new(
        Vec3::new(0.0, 10.0, 15.0),
        3.0,
        Material::emissive(Color::splat(10.0)),
    ));
    scene.add_light(Light::point(Vec3::new(0.0, 6.5, 15.0), Color::ONE, 150.0));

    scene.add(Sphere::new(
        Vec3::new(-3.0, 0.0, 12.0),
        2.0,
        Material::lambertian(Color::new(0.25, 0.75, 0.25)),
    ));
    scene.add(Sphere::new(
        Vec3::new(4.0, 2.5, 12.0),
        2.0,
        Material::lambertian(Color::new(0.1, 0.3, 0.6)),
    ));
    scene.add(Sphere::new(
        Vec3::new(0.5, -3.0, 15.0),
        2.0,
        Material::mirror(Color::new(0.75, 0.75, 0.25), 0.8, 0.0),
    ));

    // Mirror prop hanging beside the light
    scene.add_translated(
        tetrahedron(1.5, Material::mirror(Color::splat(0.9), 0.9, 0.0)),
        Vec3::new(-5.0, 5.5, 16.0),
    );

    let camera = Camera::look_at(Vec3::new(0.0, 0.0, -2.0), Vec3::new(0.0, 0.0, 12.0), Vec3::Y)
        .with_lens(45.0, 0.0, 14.0);
    (scene, camera)
}

fn cornell() -> (Scene, Camera) {
    let mut scene = Scene::new();
    let white = Material::lambertian(Color::splat(0.73));
    let red = Material::lambertian(Color::new(0.65, 0.05, 0.05));
    let green = Material::lambertian(Color::new(0.12, 0.45, 0.15));

    let (lo, hi) = (-2.0, 2.0);
    // Floor, ceiling, back wall
    quad(
        &mut scene,
        Vec3::new(lo, lo, lo),
        Vec3::new(lo, lo, hi),
        Vec3::new(hi, lo, hi),
        Vec3::new(hi, lo, lo),
        white.clone(),
    );
    quad(
        &mut scene,
        Vec3::new(lo, hi, lo),
        Vec3::new(hi, hi, lo),
        Vec3::new(hi, hi, hi),
        Vec3::new(lo, hi, hi),
        white.clone(),
    );
    quad(
        &mut scene,
        Vec3::new(lo, lo, hi),
        Vec3::new(lo, hi, hi),
        Vec3::new(hi, hi, hi),
        Vec3::new(hi, lo, hi),
        white,
    );
    // Left red, right green
    quad(
        &mut scene,
        Vec3::new(lo, lo, lo),
        Vec3::new(lo, hi, lo),
        Vec3::new(lo, hi, hi),
        Vec3::new(lo, lo, hi),
        red,
    );
    quad(
        &mut scene,
        Vec3::new(hi, lo, lo),
        Vec3::new(hi, lo, hi),
        Vec3::new(hi, hi, hi),
        Vec3::new(hi, hi, lo),
        green,
    );

    // Light panel just below the ceiling
    let y = hi - 0.01;
    quad(
        &mut scene,
        Vec3::new(-0.5, y, -0.5),
        Vec3::new(-0.5, y, 0.5),
        Vec3::new(0.5, y, 0.5),
        Vec3::new(0.5, y, -0.5),
        Material::emissive(Color::splat(15.0)),
    );
    scene.add_light(Light::point(Vec3::new(0.0, hi - 0.2, 0.0), Color::ONE, 6.0));

    scene.add(Sphere::new(
        Vec3::new(-0.8, lo + 0.7, 0.6),
        0.7,
        Material::mirror(Color::splat(0.9), 0.95, 0.05),
    ));
    scene.add(Sphere::new(Vec3::new(0.8, lo + 0.6, -0.3), 0.6, Material::dielectric(1.51)));

    let camera = Camera::look_at(Vec3::new(0.0, 0.0, -7.5), Vec3::ZERO, Vec3::Y).with_lens(40.0, 0.0, 7.5);
    (scene, camera)
}

fn glass() -> (Scene, Camera) {
    let mut scene = Scene::new();

    let checker = Texture::Checker {
        even: Color::splat(0.8),
        odd: Color::splat(0.1),
        scale: 10.0,
    };
    quad(
        &mut scene,
        Vec3::new(-20.0, 0.0, -20.0),
        Vec3::new(-20.0, 0.0, 20.0),
        Vec3::new(20.0, 0.0, 20.0),
        Vec3::new(20.0, 0.0, -20.0),
        Material::lambertian(checker),
    );

    scene.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.51)));
    scene.add(Sphere::new(
        Vec3::new(-2.2, 0.8, 0.5),
        0.8,
        Material::tinted_dielectric(1.45, Color::new(0.9, 0.3, 0.3), 1.5),
    ));
    scene.add(Sphere::new(
        Vec3::new(2.2, 0.8, 0.5),
        0.8,
        Material::tinted_dielectric(2.4, Color::new(0.3, 0.5, 0.9), 0.8),
    ));
    scene.add(Sphere::new(
        Vec3::new(0.0, 6.0, 3.0),
        1.0,
        Material::emissive(Color::splat(20.0)),
    ));

    scene.add_light(Light::spot(
        Vec3::new(0.0, 6.0, -3.0),
        Vec3::new(0.0, -1.0, 0.5),
        25f32.to_radians(),
        40f32.to_radians(),
        Color::ONE,
        60.0,
    ));
    scene.add_light(Light::directional(Vec3::new(-0.3, -1.0, 0.4), Color::new(1.0, 0.95, 0.9), 0.6));

    let camera = Camera::look_at(Vec3::new(0.0, 2.0, -6.0), Vec3::new(0.0, 0.8, 0.0), Vec3::Y)
        .with_lens(45.0, 0.05, 6.1);
    (scene, camera)
}
