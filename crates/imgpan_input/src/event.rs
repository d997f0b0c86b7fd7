use crate::Point;

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` code to a button.
    pub fn from_dom(code: i16) -> Self {
        match code {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            other => MouseButton::Other(other.max(0) as u16),
        }
    }

    /// The primary button is the one that starts a pan drag.
    pub fn is_primary(&self) -> bool {
        matches!(self, MouseButton::Left)
    }
}

/// Keyboard modifiers held while an event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl or Meta (Cmd on macOS) turns a wheel scroll into a zoom.
    pub fn is_zoom(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A wheel scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    /// Vertical scroll amount; negative scrolls up.
    pub delta_y: f32,
    pub modifiers: Modifiers,
}

impl WheelInput {
    pub fn new(delta_y: f32, modifiers: Modifiers) -> Self {
        Self { delta_y, modifiers }
    }
}

/// A mouse or pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub button: MouseButton,
    pub position: Point,
}

impl PointerInput {
    pub fn new(button: MouseButton, x: f32, y: f32) -> Self {
        Self {
            button,
            position: Point::new(x, y),
        }
    }
}

/// One active touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Identifier that stays stable for the lifetime of the contact.
    pub id: i32,
    pub client_x: f32,
    pub client_y: f32,
}

impl TouchPoint {
    pub fn new(id: i32, client_x: f32, client_y: f32) -> Self {
        Self {
            id,
            client_x,
            client_y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.client_x, self.client_y)
    }
}

/// A touch event carrying every contact still on the surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TouchInput {
    pub touches: Vec<TouchPoint>,
}

impl TouchInput {
    pub fn new(touches: Vec<TouchPoint>) -> Self {
        Self { touches }
    }

    pub fn len(&self) -> usize {
        self.touches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }

    /// Look up a contact by identifier.
    pub fn find(&self, id: i32) -> Option<&TouchPoint> {
        self.touches.iter().find(|t| t.id == id)
    }
}

/// Verdict returned by every input handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The viewport used the event; the host should suppress the default action.
    Consumed,
    /// The viewport ignored the event; let it through.
    Ignored,
}

impl Handled {
    pub fn prevents_default(&self) -> bool {
        matches!(self, Handled::Consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_button_from_dom() {
        assert_eq!(MouseButton::from_dom(0), MouseButton::Left);
        assert_eq!(MouseButton::from_dom(1), MouseButton::Middle);
        assert_eq!(MouseButton::from_dom(2), MouseButton::Right);
        assert_eq!(MouseButton::from_dom(4), MouseButton::Other(4));
        assert!(MouseButton::from_dom(0).is_primary());
        assert!(!MouseButton::from_dom(1).is_primary());
    }

    #[test]
    fn test_zoom_modifier() {
        assert!(!Modifiers::default().is_zoom());
        assert!(Modifiers { ctrl: true, ..Default::default() }.is_zoom());
        assert!(Modifiers { meta: true, ..Default::default() }.is_zoom());
        assert!(!Modifiers { shift: true, alt: true, ..Default::default() }.is_zoom());
    }

    #[test]
    fn test_touch_find_by_id() {
        let input = TouchInput::new(vec![TouchPoint::new(7, 1.0, 2.0), TouchPoint::new(9, 3.0, 4.0)]);
        assert_eq!(input.len(), 2);
        assert_eq!(input.find(9).map(|t| t.position()), Some(Point::new(3.0, 4.0)));
        assert!(input.find(1).is_none());
    }
}
