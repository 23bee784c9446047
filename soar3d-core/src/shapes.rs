//! Builders for common template shapes
use nalgebra::Vector3;

use crate::color::Color;
use crate::geometry::SceneObject;
use crate::layers::Layer;

/// Axis-aligned plane of a square, and which way its winding faces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareFace {
    YzFront,
    YzBack,
    ZxFront,
    ZxBack,
    XyFront,
    XyBack,
}

/// Closed loop (5 points, last repeats first) around a square in the given
/// plane, offset by `d` along the plane's normal axis
pub fn square(face: SquareFace, bottom: f32, left: f32, top: f32, right: f32, d: f32) -> [Vector3<f32>; 5] {
    let corners = match face {
        SquareFace::YzFront => [(left, bottom), (left, top), (right, top), (right, bottom)],
        SquareFace::YzBack => [(left, bottom), (right, bottom), (right, top), (left, top)],
        SquareFace::ZxBack => [(left, bottom), (left, top), (right, top), (right, bottom)],
        SquareFace::ZxFront => [(left, bottom), (right, bottom), (right, top), (left, top)],
        SquareFace::XyFront => [(left, bottom), (left, top), (right, top), (right, bottom)],
        SquareFace::XyBack => [(left, bottom), (right, bottom), (right, top), (left, top)],
    };

    let point = |(u, v): (f32, f32)| match face {
        SquareFace::YzFront | SquareFace::YzBack => Vector3::new(d, u, v),
        SquareFace::ZxFront | SquareFace::ZxBack => Vector3::new(u, d, v),
        SquareFace::XyFront | SquareFace::XyBack => Vector3::new(u, v, d),
    };

    [
        point(corners[0]),
        point(corners[1]),
        point(corners[2]),
        point(corners[3]),
        point(corners[0]),
    ]
}

pub fn unit_square(face: SquareFace, d: f32) -> [Vector3<f32>; 5] {
    square(face, -0.5, -0.5, 0.5, 0.5, d)
}

/// A unit cube centred on the origin, one colour per side
pub fn unit_cube(layer: Layer, solid: bool) -> SceneObject {
    let mut cube = SceneObject::new(layer);
    let sides = [
        (SquareFace::XyFront, 0.5, Color::GREEN),
        (SquareFace::XyBack, -0.5, Color::RED),
        (SquareFace::YzFront, 0.5, Color::BLUE),
        (SquareFace::YzBack, -0.5, Color::MAGENTA),
        (SquareFace::ZxFront, 0.5, Color::ORANGE),
        (SquareFace::ZxBack, -0.5, Color::PINK),
    ];
    for (face, d, color) in sides {
        cube.add_face(&unit_square(face, d), color, solid, true);
    }
    cube
}

/// `n` points on a circle of `radius` in the XZ plane around `center`
pub fn circle_xz(n: usize, radius: f32, center: &Vector3<f32>) -> Vec<Vector3<f32>> {
    let dtheta = std::f32::consts::TAU / n as f32;
    (0..n)
        .map(|i| {
            let theta = dtheta * i as f32;
            center + Vector3::new(theta.sin() * radius, 0.0, theta.cos() * radius)
        })
        .collect()
}
