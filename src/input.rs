use crate::controller::Event;
use winit::dpi::LogicalPosition;
use winit::event::{ElementState, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};

/// Turns window events into controller events.
///
/// winit reports absolute cursor positions, so the last position is remembered to produce
/// relative motion. Positions are measured in logical pixels.
#[derive(Debug, Default)]
pub(crate) struct PointerInput {
    last_position: Option<LogicalPosition<f64>>,
}

impl PointerInput {
    pub fn new() -> PointerInput {
        PointerInput::default()
    }

    pub fn translate(&mut self, event: &WindowEvent, scale_factor: f64) -> Option<Event> {
        match event {
            _ if is_quit_request(event) => Some(Event::QuitRequested),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => Some(Event::PrimaryPressed),
                ElementState::Released => Some(Event::PrimaryReleased),
            },
            WindowEvent::CursorMoved { position, .. } => {
                let position = position.to_logical::<f64>(scale_factor);
                let previous = self.last_position.replace(position)?;
                Some(Event::PointerMoved {
                    dx: (position.x - previous.x) as f32,
                    dy: (position.y - previous.y) as f32,
                })
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_position = None;
                None
            }
            _ => None,
        }
    }
}

/// Whether the event asks the application to close: the close button or Escape.
pub(crate) fn is_quit_request(event: &WindowEvent) -> bool {
    matches!(
        event,
        WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                input: KeyboardInput {
                    state: ElementState::Pressed,
                    virtual_keycode: Some(VirtualKeyCode::Escape),
                    ..
                },
                ..
            }
    )
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;
    use winit::event::{DeviceId, ModifiersState};

    fn device() -> DeviceId {
        unsafe { DeviceId::dummy() }
    }

    fn cursor(x: f64, y: f64) -> WindowEvent<'static> {
        WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(x, y),
            modifiers: ModifiersState::empty(),
        }
    }

    fn mouse(state: ElementState, button: MouseButton) -> WindowEvent<'static> {
        WindowEvent::MouseInput {
            device_id: device(),
            state,
            button,
            modifiers: ModifiersState::empty(),
        }
    }

    fn key(state: ElementState, key: VirtualKeyCode) -> WindowEvent<'static> {
        WindowEvent::KeyboardInput {
            device_id: device(),
            input: KeyboardInput {
                scancode: 0,
                state,
                virtual_keycode: Some(key),
                modifiers: ModifiersState::empty(),
            },
            is_synthetic: false,
        }
    }

    #[test]
    fn first_cursor_position_only_primes() {
        let mut input = PointerInput::new();
        assert_eq!(input.translate(&cursor(10.0, 10.0), 1.0), None);
        assert_eq!(
            input.translate(&cursor(13.0, 6.0), 1.0),
            Some(Event::PointerMoved { dx: 3.0, dy: -4.0 })
        );
    }

    #[test]
    fn deltas_are_logical() {
        let mut input = PointerInput::new();
        input.translate(&cursor(0.0, 0.0), 2.0);
        assert_eq!(
            input.translate(&cursor(20.0, 10.0), 2.0),
            Some(Event::PointerMoved { dx: 10.0, dy: 5.0 })
        );
    }

    #[test]
    fn leaving_window_forgets_position() {
        let mut input = PointerInput::new();
        input.translate(&cursor(0.0, 0.0), 1.0);
        input.translate(&WindowEvent::CursorLeft { device_id: device() }, 1.0);
        assert_eq!(input.translate(&cursor(500.0, 500.0), 1.0), None);
    }

    #[test]
    fn left_button_is_primary() {
        let mut input = PointerInput::new();
        assert_eq!(
            input.translate(&mouse(ElementState::Pressed, MouseButton::Left), 1.0),
            Some(Event::PrimaryPressed)
        );
        assert_eq!(
            input.translate(&mouse(ElementState::Released, MouseButton::Left), 1.0),
            Some(Event::PrimaryReleased)
        );
        assert_eq!(
            input.translate(&mouse(ElementState::Pressed, MouseButton::Right), 1.0),
            None
        );
    }

    #[test]
    fn escape_and_close_request_quit() {
        let mut input = PointerInput::new();
        assert_eq!(
            input.translate(&key(ElementState::Pressed, VirtualKeyCode::Escape), 1.0),
            Some(Event::QuitRequested)
        );
        assert_eq!(
            input.translate(&key(ElementState::Released, VirtualKeyCode::Escape), 1.0),
            None
        );
        assert_eq!(
            input.translate(&key(ElementState::Pressed, VirtualKeyCode::A), 1.0),
            None
        );
        assert_eq!(
            input.translate(&WindowEvent::CloseRequested, 1.0),
            Some(Event::QuitRequested)
        );
    }
}
