use crate::linear::{Mat4, Vec3};

/// Fixed reference direction used to derive `right`.
pub const WORLD_UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Pitch is kept within `[-PITCH_LIMIT, PITCH_LIMIT]` degrees so that `forward` never lines up
/// with `WORLD_UP`.
pub const PITCH_LIMIT: f32 = 89.0;

/// Orthonormal camera frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Basis {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Basis {
    /// Derives the frame for the given angles (in degrees).
    ///
    /// `forward` comes from the spherical parameterization, `right` from `forward` and
    /// `WORLD_UP`, and `up` from the other two. `up` is the cross product of two orthogonal unit
    /// vectors and is not normalized again.
    ///
    /// Precondition: `pitch` lies strictly inside `(-90, 90)`, otherwise `right` degenerates.
    pub fn from_angles(yaw: f32, pitch: f32) -> Basis {
        let yaw = yaw.to_radians();
        let pitch = pitch.to_radians();

        let forward = Vec3::new(
            yaw.sin() * pitch.cos(),
            pitch.sin(),
            -yaw.cos() * pitch.cos(),
        )
        .normalize();
        debug_assert!(forward.is_finite(), "camera forward {:?} is not finite", forward);

        let side = forward.cross(WORLD_UP);
        debug_assert!(
            side.length_squared() > 0.0,
            "camera forward {:?} is parallel to the world up direction",
            forward
        );

        let right = side.normalize();
        let up = right.cross(forward);

        Basis { right, up, forward }
    }
}

/// Builds the world-to-camera transform `R * T`.
///
/// `T` moves the eye to the origin, then `R` (rows `right`, `up`, `forward`) rotates the world
/// into camera space. Camera-space `+z` points along `forward`.
pub fn look_at(basis: &Basis, position: Vec3) -> Mat4 {
    let rotation = Mat4::from_row_vectors(basis.right, basis.up, basis.forward);
    let translation = Mat4::translation(-position);
    rotation * translation
}

/// The free-look camera: eye position, yaw/pitch in degrees, and the frame and view matrix
/// derived from them.
///
/// The derived fields are private and recomputed on every change, so `view` always matches
/// the current basis and position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    basis: Basis,
    view: Mat4,
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState::new(Vec3::new(0.0, 0.0, 3.0), 0.0, 0.0)
    }
}

impl CameraState {
    /// Non-finite angles are replaced by zero and `pitch` is clamped to `PITCH_LIMIT`.
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> CameraState {
        let finite_or_zero = |angle: f32| if angle.is_finite() { angle } else { 0.0 };

        let yaw = finite_or_zero(yaw);
        let pitch = clamp_pitch(finite_or_zero(pitch));
        let basis = Basis::from_angles(yaw, pitch);

        CameraState {
            position,
            yaw,
            pitch,
            basis,
            view: look_at(&basis, position),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[cfg(test)]
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    pub fn forward(&self) -> Vec3 {
        self.basis.forward
    }

    pub fn right(&self) -> Vec3 {
        self.basis.right
    }

    pub fn up(&self) -> Vec3 {
        self.basis.up
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    /// Adds the given deltas (degrees) to yaw and pitch, clamps pitch, and re-derives the basis
    /// and view matrix.
    ///
    /// The camera is left unchanged if a delta or the accumulated yaw is not finite.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let yaw = self.yaw + delta_yaw;
        let pitch = self.pitch + delta_pitch;

        if !(delta_yaw.is_finite() && delta_pitch.is_finite() && yaw.is_finite()) {
            warn!(delta_yaw, delta_pitch, yaw = self.yaw, "rejecting non-finite camera rotation");
            return;
        }

        self.yaw = yaw;
        self.pitch = clamp_pitch(pitch);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.basis = Basis::from_angles(self.yaw, self.pitch);
        self.view = look_at(&self.basis, self.position);
    }
}

fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn assert_vec3_eq(actual: Vec3, expected: Vec3, epsilon: f32) {
        assert_abs_diff_eq!(actual.x, expected.x, epsilon = epsilon);
        assert_abs_diff_eq!(actual.y, expected.y, epsilon = epsilon);
        assert_abs_diff_eq!(actual.z, expected.z, epsilon = epsilon);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = CameraState::default();

        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.yaw(), 0.0);
        assert_eq!(camera.pitch(), 0.0);
        assert_vec3_eq(camera.forward(), Vec3::new(0.0, 0.0, -1.0), 1e-6);
        assert_vec3_eq(camera.right(), Vec3::new(1.0, 0.0, 0.0), 1e-6);
        assert_vec3_eq(camera.up(), Vec3::new(0.0, 1.0, 0.0), 1e-6);
    }

    #[test]
    fn look_at_moves_eye_to_origin() {
        let basis = Basis {
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            forward: Vec3::new(0.0, 0.0, 1.0),
        };
        let position = Vec3::new(0.0, 0.0, 3.0);
        let view = look_at(&basis, position);

        assert_eq!(view.column(3).truncate(), Vec3::new(0.0, 0.0, -3.0));
        assert_eq!(view.transform_point(position), Vec3::zero());
    }

    #[test]
    fn look_at_rotates_after_translating() {
        let basis = Basis::from_angles(90.0, 0.0);
        let position = Vec3::new(1.0, 2.0, 3.0);
        let view = look_at(&basis, position);

        assert_vec3_eq(view.transform_point(position), Vec3::zero(), 1e-6);

        // one unit ahead of the eye lands on the camera-space z axis
        let ahead = view.transform_point(position + basis.forward);
        assert_vec3_eq(ahead, Vec3::new(0.0, 0.0, 1.0), 1e-6);

        let reversed = Mat4::translation(-position) * Mat4::from_row_vectors(
            basis.right,
            basis.up,
            basis.forward,
        );
        assert_ne!(view, reversed);
    }

    #[test]
    fn view_bottom_row_is_affine() {
        let camera = CameraState::new(Vec3::new(-4.0, 1.5, 2.0), 33.0, -12.0);
        assert_eq!(camera.view().rows[3], crate::linear::Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn yaw_of_ninety_degrees_faces_positive_x() {
        let mut camera = CameraState::default();
        camera.rotate(90.0, 0.0);

        assert_eq!(camera.yaw(), 90.0);
        assert_vec3_eq(camera.forward(), Vec3::new(1.0, 0.0, 0.0), 1e-4);
    }

    #[test]
    fn pitch_is_clamped_at_both_poles() {
        let mut camera = CameraState::default();
        camera.rotate(0.0, 95.0);
        assert_eq!(camera.pitch(), 89.0);

        camera.rotate(0.0, -190.0);
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn initial_pitch_is_clamped() {
        assert_eq!(CameraState::new(Vec3::zero(), 0.0, 120.0).pitch(), 89.0);
        assert_eq!(CameraState::new(Vec3::zero(), 0.0, -120.0).pitch(), -89.0);
    }

    #[test]
    fn non_finite_initial_angles_fall_back_to_zero() {
        let camera = CameraState::new(Vec3::zero(), f32::NAN, f32::INFINITY);
        assert_eq!(camera.yaw(), 0.0);
        assert_eq!(camera.pitch(), 0.0);
        assert!(camera.forward().is_finite());
    }

    #[test]
    fn non_finite_rotation_is_rejected() {
        let mut camera = CameraState::default();
        camera.rotate(30.0, 10.0);
        let before = camera;

        camera.rotate(f32::INFINITY, 0.0);
        camera.rotate(0.0, f32::NEG_INFINITY);
        camera.rotate(f32::NAN, f32::NAN);

        assert_eq!(camera, before);
    }

    #[test]
    fn yaw_overflow_keeps_previous_state() {
        let mut camera = CameraState::new(Vec3::zero(), 3.0e38, 0.0);
        let before = camera;

        camera.rotate(3.0e38, 0.0);

        assert_eq!(camera, before);
        assert!(camera.forward().is_finite());
    }

    #[test]
    fn view_tracks_rotation() {
        let mut camera = CameraState::default();
        camera.rotate(-45.0, 20.0);

        let expected = look_at(camera.basis(), camera.position());
        assert_eq!(*camera.view(), expected);
    }

    proptest! {
        #[test]
        fn basis_is_orthonormal(yaw in -720.0f32..720.0, pitch in -89.0f32..=89.0) {
            let Basis { right, up, forward } = Basis::from_angles(yaw, pitch);

            prop_assert!((forward.length() - 1.0).abs() < 1e-5);
            prop_assert!((right.length() - 1.0).abs() < 1e-5);
            prop_assert!((up.length() - 1.0).abs() < 1e-5);

            prop_assert!(forward.dot(right).abs() < 1e-5);
            prop_assert!(forward.dot(up).abs() < 1e-5);
            prop_assert!(right.dot(up).abs() < 1e-5);
        }

        #[test]
        fn right_stays_horizontal(yaw in -720.0f32..720.0, pitch in -89.0f32..=89.0) {
            let basis = Basis::from_angles(yaw, pitch);
            prop_assert!(basis.right.y.abs() < 1e-6);
            prop_assert!(basis.up.y > 0.0);
        }
    }
}
