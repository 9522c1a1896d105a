use glam::{Mat4, Vec2};

use crate::math;

/// Degrees of rotation per pixel of pointer travel.
pub const DEFAULT_SENSITIVITY: f32 = 0.3;

/// Pitch is held inside `[-PITCH_LIMIT, PITCH_LIMIT]` degrees.
pub const PITCH_LIMIT: f32 = 89.0;

/// Whether a drag is in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragState {
    Idle,
    /// Dragging, with the pointer position of the last processed event.
    Dragging { anchor: Vec2 },
}

/// Pointer-drag orbit controller.
///
/// The camera never moves; dragging spins the object in front of it. Moving
/// the pointer right turns the object as if it were grabbed and pulled.
///
/// Angles are accumulated in degrees. Pitch is clamped whenever it changes,
/// so any value read back is already within [`PITCH_LIMIT`].
///
/// # Example
/// ```
/// use orbitview::OrbitCamera;
///
/// let mut orbit = OrbitCamera::new();
/// orbit.press(100.0, 100.0);
/// orbit.move_to(110.0, 100.0);
/// orbit.release();
/// assert!((orbit.yaw + 3.0).abs() < 1e-5);
/// assert_eq!(orbit.pitch, 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Rotation about world +Y in degrees.
    pub yaw: f32,
    /// Rotation about the object's local X in degrees.
    pub pitch: f32,
    /// Degrees per pixel.
    pub sensitivity: f32,
    state: DragState,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: DEFAULT_SENSITIVITY,
            state: DragState::Idle,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mouse sensitivity in degrees per pixel.
    pub fn sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    /// Current drag state.
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Start a drag anchored at the given pointer position.
    pub fn press(&mut self, x: f32, y: f32) {
        self.state = DragState::Dragging {
            anchor: Vec2::new(x, y),
        };
    }

    /// Feed a pointer position. Ignored unless a drag is active.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let DragState::Dragging { anchor } = self.state else {
            return;
        };

        let current = Vec2::new(x, y);
        let delta = (anchor - current) * self.sensitivity;

        self.yaw += delta.x;
        self.pitch = (self.pitch + delta.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.state = DragState::Dragging { anchor: current };
    }

    /// End the current drag, if any.
    pub fn release(&mut self) {
        self.state = DragState::Idle;
    }

    /// Object rotation for the current yaw and pitch.
    pub fn rotation(&self) -> Mat4 {
        math::rotation_from_yaw_pitch(self.pitch.to_radians(), self.yaw.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_round_trip_maps_axes_independently() {
        let mut orbit = OrbitCamera::new();
        orbit.press(100.0, 100.0);
        orbit.move_to(110.0, 100.0);
        orbit.release();

        assert_eq!(orbit.yaw, 10.0 * DEFAULT_SENSITIVITY * -1.0);
        assert_eq!(orbit.pitch, 0.0);
        assert_eq!(orbit.state(), DragState::Idle);

        let yaw = orbit.yaw;
        orbit.press(50.0, 50.0);
        orbit.move_to(50.0, 40.0);
        assert_eq!(orbit.yaw, yaw);
        assert_eq!(orbit.pitch, -10.0 * DEFAULT_SENSITIVITY * -1.0);
    }

    #[test]
    fn pitch_saturates_at_limit() {
        let mut orbit = OrbitCamera::new();
        orbit.press(0.0, 0.0);
        // Each event moves the pointer up by enough pixels for +10 degrees.
        let step = 10.0 / DEFAULT_SENSITIVITY;
        for i in 1..=1000 {
            orbit.move_to(0.0, -(i as f32) * step);
            assert!(orbit.pitch <= PITCH_LIMIT);
        }
        assert_eq!(orbit.pitch, PITCH_LIMIT);

        for i in 1..=1000 {
            orbit.move_to(0.0, -1000.0 * step + i as f32 * step);
            assert!(orbit.pitch >= -PITCH_LIMIT);
        }
        assert_eq!(orbit.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn motion_while_idle_is_ignored() {
        let mut orbit = OrbitCamera::new();
        orbit.move_to(300.0, -200.0);
        orbit.move_to(-40.0, 12.0);
        assert_eq!((orbit.yaw, orbit.pitch), (0.0, 0.0));
        assert!(!orbit.is_dragging());

        orbit.press(0.0, 0.0);
        orbit.release();
        orbit.move_to(100.0, 100.0);
        assert_eq!((orbit.yaw, orbit.pitch), (0.0, 0.0));
    }

    #[test]
    fn anchor_follows_pointer() {
        let mut orbit = OrbitCamera::new().sensitivity(1.0);
        orbit.press(0.0, 0.0);
        orbit.move_to(5.0, 0.0);
        orbit.move_to(7.0, 0.0);
        assert_eq!(orbit.yaw, -7.0);
        assert_eq!(
            orbit.state(),
            DragState::Dragging {
                anchor: Vec2::new(7.0, 0.0)
            }
        );
    }

    #[test]
    fn rotation_uses_radians() {
        let mut orbit = OrbitCamera::new();
        orbit.yaw = 90.0;
        let p = orbit.rotation().transform_vector3(glam::Vec3::Z);
        assert!(p.abs_diff_eq(glam::Vec3::X, 1e-6), "got {p:?}");
    }
}
