//! Labeled values shown in the info window.

use crate::camera::{CameraState, WORLD_UP};
use crate::linear::{Mat4, Vec3};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Value {
    Scalar(f32),
    Vector(Vec3),
    Matrix(Mat4),
}

/// Colour family used when displaying a readout.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Group {
    Scene,
    Angle,
    Camera,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Readout {
    pub name: &'static str,
    pub group: Group,
    pub value: Value,
}

impl Readout {
    pub const fn new(name: &'static str, group: Group, value: Value) -> Readout {
        Readout { name, group, value }
    }

    /// The raw floats: 1, 3 or 16 of them.
    #[cfg(test)]
    pub fn floats(&self) -> Vec<f32> {
        match self.value {
            Value::Scalar(scalar) => vec![scalar],
            Value::Vector(vector) => <[f32; 3]>::from(vector).to_vec(),
            Value::Matrix(matrix) => matrix.to_row_major().to_vec(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(scalar) => write!(f, "{:9.3}", scalar),
            Value::Vector(v) => write!(f, "{{{:9.3}, {:9.3}, {:9.3}}}", v.x, v.y, v.z),
            Value::Matrix(m) => {
                writeln!(f, "{{")?;
                for (i, row) in m.rows.iter().enumerate() {
                    let separator = if i < 3 { "," } else { "" };
                    writeln!(
                        f,
                        "    {:9.3}, {:9.3}, {:9.3}, {:9.3}{}",
                        row.x, row.y, row.z, row.w, separator
                    )?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// Everything the info window shows for one frame: the quad corners and world up, the angles,
/// and the camera frame with its view matrix.
pub fn collect(camera: &CameraState, corners: &[Vec3; 4]) -> Vec<Readout> {
    const CORNER_NAMES: [&str; 4] = ["points[0]", "points[1]", "points[2]", "points[3]"];

    let mut readouts = Vec::with_capacity(12);

    for (name, corner) in CORNER_NAMES.iter().zip(corners) {
        readouts.push(Readout::new(*name, Group::Scene, Value::Vector(*corner)));
    }

    readouts.extend_from_slice(&[
        Readout::new("world_up", Group::Scene, Value::Vector(WORLD_UP)),
        Readout::new("yaw_deg", Group::Angle, Value::Scalar(camera.yaw())),
        Readout::new("pitch_deg", Group::Angle, Value::Scalar(camera.pitch())),
        Readout::new("camera_pos", Group::Camera, Value::Vector(camera.position())),
        Readout::new("camera_dir", Group::Camera, Value::Vector(camera.forward())),
        Readout::new("camera_right", Group::Camera, Value::Vector(camera.right())),
        Readout::new("camera_up", Group::Camera, Value::Vector(camera.up())),
        Readout::new("look_at", Group::Angle, Value::Matrix(*camera.view())),
    ]);

    readouts
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORNERS: [Vec3; 4] = [
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(-0.5, 0.5, 0.0),
        Vec3::new(0.5, 0.5, 0.0),
        Vec3::new(0.5, -0.5, 0.0),
    ];

    fn find<'a>(readouts: &'a [Readout], name: &str) -> &'a Readout {
        readouts
            .iter()
            .find(|readout| readout.name == name)
            .unwrap_or_else(|| panic!("missing readout `{}`", name))
    }

    #[test]
    fn scalar_uses_fixed_width() {
        assert_eq!(Value::Scalar(1.5).to_string(), "    1.500");
        assert_eq!(Value::Scalar(-89.0).to_string(), "  -89.000");
    }

    #[test]
    fn vector_is_braced() {
        let readout = Readout::new("world_up", Group::Scene, Value::Vector(WORLD_UP));
        assert_eq!(
            readout.to_string(),
            "world_up = {    0.000,     1.000,     0.000}"
        );
    }

    #[test]
    fn matrix_prints_four_rows() {
        let text = Value::Matrix(Mat4::IDENTITY).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "{");
        assert_eq!(lines[1], "        1.000,     0.000,     0.000,     0.000,");
        assert_eq!(lines[4], "        0.000,     0.000,     0.000,     1.000");
        assert_eq!(lines[5], "}");
    }

    #[test]
    fn collects_camera_state() {
        let mut camera = CameraState::default();
        camera.rotate(12.0, -7.0);
        let readouts = collect(&camera, &CORNERS);

        assert_eq!(readouts.len(), 12);
        assert_eq!(find(&readouts, "yaw_deg").value, Value::Scalar(12.0));
        assert_eq!(find(&readouts, "pitch_deg").value, Value::Scalar(-7.0));
        assert_eq!(
            find(&readouts, "camera_dir").value,
            Value::Vector(camera.forward())
        );
        assert_eq!(
            find(&readouts, "look_at").value,
            Value::Matrix(*camera.view())
        );
        assert_eq!(
            find(&readouts, "points[2]").value,
            Value::Vector(Vec3::new(0.5, 0.5, 0.0))
        );
    }

    #[test]
    fn float_counts_match_kind() {
        let camera = CameraState::default();
        let readouts = collect(&camera, &CORNERS);

        assert_eq!(find(&readouts, "yaw_deg").floats().len(), 1);
        assert_eq!(find(&readouts, "camera_up").floats().len(), 3);

        let view = find(&readouts, "look_at").floats();
        assert_eq!(view.len(), 16);
        assert_eq!(view[11], 3.0);
    }
}
