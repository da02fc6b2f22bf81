use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Point3, Vector3};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 45.0;

const PITCH_LIMIT: f32 = 89.0;
const ZOOM_RANGE: (f32, f32) = (1.0, 45.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// First-person camera driven by Euler angles (degrees).
///
/// `front`, `right` and `up` are derived from yaw and pitch and kept in sync by every
/// mutating method.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    world_up: Vector3<f32>,

    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 0.0, 3.0))
    }
}

impl Camera {
    pub fn new(position: Point3<f32>) -> Self {
        let mut cam = Self {
            position,
            front: -Vector3::z(),
            up: Vector3::y(),
            right: Vector3::x(),
            world_up: Vector3::y(),
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
            near: 0.1,
            far: 100.0,
        };
        cam.update_vectors();
        cam
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    /// Points the camera along `front`, deriving yaw and pitch from it. A zero vector is
    /// ignored.
    pub fn set_front(&mut self, front: Vector3<f32>) {
        let Some(dir) = front.try_normalize(1e-12) else {
            return;
        };
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees();
        self.yaw = dir.z.atan2(dir.x).to_degrees();
        self.constrain_pitch();
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        TransformFactory::look_at(&self.position, &(self.position + self.front), &self.up)
    }

    pub fn projection_matrix(&self, aspect_ratio: f32) -> Matrix4<f32> {
        TransformFactory::perspective(aspect_ratio, self.zoom.to_radians(), self.near, self.far)
    }

    pub fn process_keyboard(&mut self, direction: Movement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        let offset = match direction {
            Movement::Forward => self.front,
            Movement::Backward => -self.front,
            Movement::Left => -self.right,
            Movement::Right => self.right,
        };
        self.position += offset * velocity;
    }

    /// Mouse-look. Positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;
        if constrain_pitch {
            self.constrain_pitch();
        }
        self.update_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
    }

    fn constrain_pitch(&mut self) {
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vector3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::default();
        assert!(close(cam.front(), -Vector3::z()));
        assert!(close(cam.right(), Vector3::x()));
        assert_eq!(cam.position, Point3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn pitch_is_clamped_when_constrained() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(cam.pitch, 89.0);

        cam.process_mouse_movement(0.0, -20_000.0, true);
        assert_eq!(cam.pitch, -89.0);
    }

    #[test]
    fn zoom_stays_within_range() {
        let mut cam = Camera::default();
        cam.process_mouse_scroll(100.0);
        assert_eq!(cam.zoom, 1.0);
        cam.process_mouse_scroll(-100.0);
        assert_eq!(cam.zoom, 45.0);
    }

    #[test]
    fn set_front_round_trips_through_yaw_and_pitch() {
        let mut cam = Camera::default();
        let dir = Vector3::new(1.0, 0.5, -2.0).normalize();
        cam.set_front(dir);
        assert!(close(cam.front(), dir));

        cam.set_front(Vector3::zeros());
        assert!(close(cam.front(), dir));
    }

    #[test]
    fn keyboard_moves_along_the_view_axes() {
        let mut cam = Camera::default();
        cam.process_keyboard(Movement::Forward, 1.0);
        assert!((cam.position - Point3::new(0.0, 0.0, 0.5)).norm() < 1e-5);

        cam.process_keyboard(Movement::Right, 2.0);
        assert!((cam.position - Point3::new(5.0, 0.0, 0.5)).norm() < 1e-5);
    }

    #[test]
    fn view_matrix_moves_the_eye_to_the_origin() {
        let cam = Camera::new(Point3::new(1.0, 2.0, 3.0));
        let eye = cam.view_matrix().transform_point(&cam.position);
        assert!(eye.coords.norm() < 1e-5);
    }
}
