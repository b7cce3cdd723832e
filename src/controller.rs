use crate::camera::CameraState;

/// Whether the primary button is currently held.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

impl Default for DragState {
    fn default() -> Self {
        DragState::Idle
    }
}

/// Discrete input delivered to the controller, in the order it was received.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Event {
    PrimaryPressed,
    PrimaryReleased,
    /// Relative pointer motion in pixels.
    PointerMoved { dx: f32, dy: f32 },
    QuitRequested,
}

impl Event {
    /// Pointer motion carrying a non-finite delta.
    pub fn is_malformed(&self) -> bool {
        match *self {
            Event::PointerMoved { dx, dy } => !(dx.is_finite() && dy.is_finite()),
            _ => false,
        }
    }
}

/// Applies one event to the drag state and camera, returning their successors.
///
/// While dragging, motion adds `dx * sensitivity` to yaw and subtracts `dy * sensitivity` from
/// pitch (screen y grows downwards). Motion while idle, malformed motion and quit requests leave
/// both values untouched.
pub fn apply_event(
    state: DragState,
    mut camera: CameraState,
    event: Event,
    sensitivity: f32,
) -> (DragState, CameraState) {
    match (state, event) {
        (DragState::Idle, Event::PrimaryPressed) => (DragState::Dragging, camera),
        (DragState::Dragging, Event::PrimaryReleased) => (DragState::Idle, camera),
        (DragState::Dragging, Event::PointerMoved { .. }) if event.is_malformed() => {
            (state, camera)
        }
        (DragState::Dragging, Event::PointerMoved { dx, dy }) => {
            camera.rotate(sensitivity * dx, -sensitivity * dy);
            (state, camera)
        }
        (DragState::Idle, Event::PointerMoved { .. }) => (state, camera),
        (_, Event::PrimaryPressed)
        | (_, Event::PrimaryReleased)
        | (_, Event::QuitRequested) => (state, camera),
    }
}

/// Owns the drag state and feeds events into [`apply_event`].
#[derive(Debug, Copy, Clone)]
pub struct Controller {
    state: DragState,
    sensitivity: f32,
}

/// What the event loop should do after an event was handled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

impl Controller {
    pub const DEFAULT_SENSITIVITY: f32 = 1.0;

    pub fn new(sensitivity: f32) -> Controller {
        Controller {
            state: DragState::Idle,
            sensitivity,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn handle(&mut self, camera: &mut CameraState, event: Event) -> Flow {
        if event == Event::QuitRequested {
            info!("quit requested");
            return Flow::Quit;
        }

        if self.state == DragState::Dragging && event.is_malformed() {
            warn!(?event, "dropping pointer motion with non-finite delta");
        }

        let (state, updated) = apply_event(self.state, *camera, event, self.sensitivity);

        if state != self.state {
            debug!(from = ?self.state, to = ?state, "drag state changed");
            self.state = state;
        }

        if updated != *camera {
            debug!(yaw = updated.yaw(), pitch = updated.pitch(), "camera rotated");
            *camera = updated;
        }

        Flow::Continue
    }

    /// Applies every queued event in order. Stops at the first quit request.
    pub fn drain(
        &mut self,
        camera: &mut CameraState,
        events: impl IntoIterator<Item = Event>,
    ) -> Flow {
        for event in events {
            if self.handle(camera, event) == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }
}

impl Default for Controller {
    fn default() -> Self {
        Controller::new(Controller::DEFAULT_SENSITIVITY)
    }
}
