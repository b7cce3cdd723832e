use crate::camera::CameraState;
use crate::linear::{Mat4, Vec3};
use crate::readout::{self, Readout};

/// Receives the view transform once per frame.
pub(crate) trait RenderSink {
    fn set_view(&mut self, view: &Mat4);
}

/// Receives the labeled camera values once per frame.
pub(crate) trait DebugSink {
    fn show(&mut self, readouts: Vec<Readout>);
}

/// Hands the current camera to both collaborators: first the view matrix to `render`, then the
/// readouts to `debug`.
///
/// Call this only after all input for the frame has been applied to `camera`, so that both
/// collaborators observe the same state.
pub(crate) fn submit(
    camera: &CameraState,
    corners: &[Vec3; 4],
    render: &mut impl RenderSink,
    debug: &mut impl DebugSink,
) {
    render.set_view(camera.view());
    debug.show(readout::collect(camera, corners));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, Event};
    use crate::readout::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        View(Mat4),
        Readouts(Vec<Readout>),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl RenderSink for Recorder {
        fn set_view(&mut self, view: &Mat4) {
            self.calls.borrow_mut().push(Call::View(*view));
        }
    }

    impl DebugSink for Recorder {
        fn show(&mut self, readouts: Vec<Readout>) {
            self.calls.borrow_mut().push(Call::Readouts(readouts));
        }
    }

    const CORNERS: [Vec3; 4] = [Vec3::new(0.0, 0.0, 0.0); 4];

    #[test]
    fn view_is_submitted_before_readouts() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut render = Recorder {
            calls: calls.clone(),
        };
        let mut debug = Recorder {
            calls: calls.clone(),
        };

        let camera = CameraState::default();
        submit(&camera, &CORNERS, &mut render, &mut debug);

        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], Call::View(*camera.view()));
        assert!(matches!(calls[1], Call::Readouts(_)));
    }

    #[test]
    fn render_and_debug_agree_after_input() {
        let mut render = Recorder::default();
        let mut debug = Recorder::default();

        let mut camera = CameraState::default();
        let mut controller = Controller::default();
        controller.drain(
            &mut camera,
            vec![
                Event::PrimaryPressed,
                Event::PointerMoved { dx: 25.0, dy: 10.0 },
                Event::PointerMoved { dx: -5.0, dy: 2.0 },
            ],
        );

        submit(&camera, &CORNERS, &mut render, &mut debug);

        let rendered = match &render.calls.borrow()[0] {
            Call::View(view) => *view,
            other => panic!("unexpected call {:?}", other),
        };

        let shown = match &debug.calls.borrow()[0] {
            Call::Readouts(readouts) => readouts.clone(),
            other => panic!("unexpected call {:?}", other),
        };

        let shown_view = shown
            .iter()
            .find(|readout| readout.name == "look_at")
            .map(|readout| readout.value);
        let shown_yaw = shown
            .iter()
            .find(|readout| readout.name == "yaw_deg")
            .map(|readout| readout.value);

        assert_eq!(shown_view, Some(Value::Matrix(rendered)));
        assert_eq!(shown_yaw, Some(Value::Scalar(20.0)));
    }
}
