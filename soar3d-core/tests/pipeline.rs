//! End-to-end frames through the public API
use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use nalgebra::Vector3;
use soar3d_core::{
    shapes, Camera, CameraMan, CameraMode, Color, CutConfig, Font, Layer, Scene, SceneObject,
    Subject, Surface, Terrain,
};

#[derive(Default)]
struct Recorder {
    lines: usize,
    polygons: Vec<(Vec<i32>, Vec<i32>)>,
    colors: Vec<Color>,
}

impl Surface for Recorder {
    fn set_color(&mut self, color: Color) {
        self.colors.push(color);
    }
    fn set_font(&mut self, _font: &Font) {}
    fn draw_line(&mut self, _x1: i32, _y1: i32, _x2: i32, _y2: i32) {
        self.lines += 1;
    }
    fn fill_polygon(&mut self, xs: &[i32], ys: &[i32]) {
        self.polygons.push((xs.to_vec(), ys.to_vec()));
    }
    fn draw_string(&mut self, _text: &str, _x: i32, _y: i32) {}
    fn fill_circle(&mut self, _x: i32, _y: i32, _diameter: i32) {}
}

struct Hover {
    eye: Vector3<f32>,
    focus: Vector3<f32>,
}

impl Subject for Hover {
    fn eye(&self) -> Vector3<f32> {
        self.eye
    }
    fn focus(&self) -> Vector3<f32> {
        self.focus
    }
}

struct Ridge;

impl Terrain for Ridge {
    fn height(&self, _x: f32, y: f32) -> f32 {
        (1.0 - y.abs()).max(0.0)
    }
}

#[test]
fn focus_lands_on_screen_center() {
    let mut camera = Camera::new(640, 480);
    camera.set_eye(Vector3::new(3.0, 0.0, 0.0));
    camera.set_focus(Vector3::zeros());
    camera.rebuild_view_state();

    let (_, screen) = camera.project_point(&Vector3::zeros());
    let screen = screen.expect("focus is always in view");
    assert_eq!((screen.x, screen.y), (320.0, 240.0));
}

#[test]
fn object_outside_cone_is_not_drawn() {
    let mut scene = Scene::new();

    let mut centered = SceneObject::new(Layer::Default);
    centered.add_face(
        &[
            Vector3::new(0.0, -0.2, -0.2),
            Vector3::new(0.0, 0.2, -0.2),
            Vector3::new(0.0, 0.2, 0.2),
        ],
        Color::GREEN,
        true,
        false,
    );
    let centered = scene.add(centered);

    let mut wide = SceneObject::new(Layer::Default);
    wide.add_face(
        &[Vector3::new(0.0, 40.0, 0.0), Vector3::new(0.0, 41.0, 0.0)],
        Color::RED,
        false,
        false,
    );
    let wide = scene.add(wide);

    let mut camera = Camera::new(800, 600);
    let mut surface = Recorder::default();
    scene.render(&mut camera, None, Some(&mut surface));

    assert!(scene.get(centered).unwrap().in_view());
    assert!(!scene.get(wide).unwrap().in_view());
    assert_eq!(surface.polygons.len(), 1);
    assert_eq!(surface.lines, 0);
    assert!(!surface.colors.contains(&Color::RED));
}

#[test]
fn depth_sort_paints_far_object_first() {
    let mut scene = Scene::new();
    let near = scene.add(shifted_cube(-2.0, Color::RED));
    let far = scene.add(shifted_cube(-5.0, Color::BLUE));

    let mut camera = Camera::new(800, 600);
    camera.set_eye(Vector3::new(12.0, 0.0, 0.0));
    scene.prepare(&mut camera, None);

    assert_eq!(scene.layers().layer(Layer::Default), &[far, near]);
}

fn shifted_cube(x: f32, color: Color) -> SceneObject {
    let mut cube = shapes::unit_cube(Layer::Default, true);
    cube.scale_by(0.5);
    cube.set_color(color);
    cube.translate(&Vector3::new(x - cube.points()[0].position().x, 0.0, 0.0));
    cube
}

#[test]
fn cut_reaches_stationary_subject_with_eased_steps() {
    let mut camera = Camera::new(800, 600);
    let mut man = CameraMan::new(CutConfig::default());
    let hover = Rc::new(RefCell::new(Hover {
        eye: Vector3::new(-20.0, 8.0, 6.0),
        focus: Vector3::new(-10.0, 8.0, 2.0),
    }));
    man.set_primary(hover);
    man.set_mode(&mut camera, CameraMode::SelfView);

    let mut steps = Vec::new();
    for _ in 0..75 {
        let before = camera.eye();
        man.tick(&mut camera);
        steps.push((camera.eye() - before).norm());
    }

    assert_relative_eq!(camera.eye(), Vector3::new(-20.0, 8.0, 6.0), epsilon = 1e-4);
    assert_relative_eq!(camera.focus(), Vector3::new(-10.0, 8.0, 2.0), epsilon = 1e-4);
    assert!(steps[..12].windows(2).all(|w| w[1] > w[0]));
    assert!(steps[63..].windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn group_switch_mid_cut_starts_fresh() {
    let mut camera = Camera::new(800, 600);
    let mut man = CameraMan::default();
    man.set_primary(Rc::new(RefCell::new(Hover {
        eye: Vector3::new(30.0, 0.0, 5.0),
        focus: Vector3::new(20.0, 0.0, 2.0),
    })));
    man.set_secondary(Rc::new(RefCell::new(Hover {
        eye: Vector3::new(0.0, -30.0, 5.0),
        focus: Vector3::new(0.0, -20.0, 2.0),
    })));

    man.set_mode(&mut camera, CameraMode::SelfView);
    for _ in 0..35 {
        man.tick(&mut camera);
    }
    assert_eq!(man.cut_remaining(), 40);

    man.set_mode(&mut camera, CameraMode::Group);
    assert_eq!(man.mode(), CameraMode::Group);
    assert_eq!(man.cut_remaining(), 75);

    for _ in 0..75 {
        man.tick(&mut camera);
    }
    assert_relative_eq!(camera.eye(), Vector3::new(0.0, -30.0, 5.0), epsilon = 1e-4);
}

#[test]
fn shadow_drops_onto_terrain_each_frame() {
    let mut glider = SceneObject::new(Layer::Default);
    glider
        .add_face_with_shadow(
            &[
                Vector3::new(0.0, 0.0, 3.0),
                Vector3::new(0.5, 0.0, 3.0),
                Vector3::new(0.5, 0.5, 3.0),
            ],
            Color::YELLOW,
            true,
            true,
        )
        .unwrap();

    let mut scene = Scene::new();
    let id = scene.add(glider);
    let mut camera = Camera::new(800, 600);
    camera.set_eye(Vector3::new(5.0, 0.0, 6.0));
    scene.prepare(&mut camera, Some(&Ridge));

    let object = scene.get(id).unwrap();
    let heights: Vec<f32> = object.shadows()[0]
        .face()
        .points()
        .iter()
        .map(|p| object.point(*p).position().z)
        .collect();
    assert_eq!(heights, vec![0.5, 1.0, 1.0]);
}
