//! Gesture arbitration between mouse drag and two-finger pinch.
//!
//! Mouse and touch are mutually exclusive input families. One state machine
//! owns both so they never race on the shared transform:
//!
//! ```text
//!   Idle --primary down--> Dragging --up / cancel--> Idle
//!   Idle --2 touches-----> Pinching --< 2 touches--> Idle
//!   Dragging --2 touches-> Pinching      (pinch preempts drag)
//!   Pinching --mouse down: ignored
//! ```
//!
//! Wheel zoom is stateless and never goes through here.

use imgpan_input::{Point, PointerInput, TouchInput, TouchPoint};

use crate::constants::PINCH_TOUCH_COUNT;

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pan drag in progress; `last` is the pointer position of the previous event.
    Dragging { last: Point },
    /// Pinch in progress; `pair` holds the two contacts as last seen.
    Pinching { pair: [TouchPoint; 2] },
}

/// Outcome of one pinch move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinchStep {
    /// Fingers spread apart
    ZoomIn,
    /// Fingers moved together
    ZoomOut,
    /// Distance unchanged, or the contact pair was re-recorded
    Hold,
}

/// Tracks the active gesture and turns raw input into pan deltas and zoom steps.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    state: Gesture,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Gesture {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, Gesture::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, Gesture::Dragging { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.state, Gesture::Pinching { .. })
    }

    /// Recorded touch contacts: two while pinching, none otherwise.
    pub fn active_touches(&self) -> &[TouchPoint] {
        match &self.state {
            Gesture::Pinching { pair } => pair.as_slice(),
            _ => &[],
        }
    }

    /// Returns `true` if the press started a drag.
    pub fn pointer_down(&mut self, input: &PointerInput) -> bool {
        if !input.button.is_primary() {
            return false;
        }
        if self.is_pinching() {
            log::debug!("Pointer down ignored while pinching");
            return false;
        }

        log::debug!("Drag start at ({:.1}, {:.1})", input.position.x, input.position.y);
        self.state = Gesture::Dragging {
            last: input.position,
        };
        true
    }

    /// Returns the movement since the previous event while dragging.
    pub fn pointer_move(&mut self, position: Point) -> Option<(f32, f32)> {
        match &mut self.state {
            Gesture::Dragging { last } => {
                let delta = position.delta_from(*last);
                *last = position;
                Some(delta)
            }
            _ => None,
        }
    }

    /// Ends a drag (pointer up, cancel or leave). Returns `true` if one was active.
    pub fn pointer_up(&mut self) -> bool {
        if self.is_dragging() {
            log::debug!("Drag end");
            self.state = Gesture::Idle;
            true
        } else {
            false
        }
    }

    /// Returns `true` if the touch set now forms a (new) pinch.
    pub fn touch_start(&mut self, input: &TouchInput) -> bool {
        let Some(pair) = pair_of(input) else {
            return false;
        };

        if self.is_dragging() {
            log::debug!("Pinch preempts active drag");
        } else if self.is_idle() {
            log::debug!("Pinch start");
        }
        self.state = Gesture::Pinching { pair };
        true
    }

    /// Compare the contact distance with the previous event.
    ///
    /// Returns `None` when no pinch is active or the event does not carry exactly
    /// two contacts. Contacts are matched by identifier; if the ids changed, the
    /// new pair is recorded and no step is taken.
    pub fn touch_move(&mut self, input: &TouchInput) -> Option<PinchStep> {
        let Gesture::Pinching { pair } = &mut self.state else {
            return None;
        };
        let current = pair_of(input)?;

        let matched = (input.find(pair[0].id), input.find(pair[1].id));
        let (Some(a), Some(b)) = matched else {
            log::debug!("Pinch contacts changed, re-recording");
            *pair = current;
            return Some(PinchStep::Hold);
        };

        let old_distance = pair[0].position().distance_to(pair[1].position());
        let new_distance = a.position().distance_to(b.position());
        *pair = [*a, *b];

        let step = if new_distance > old_distance {
            PinchStep::ZoomIn
        } else if new_distance < old_distance {
            PinchStep::ZoomOut
        } else {
            PinchStep::Hold
        };
        Some(step)
    }

    /// Handle a touch end or cancel. Returns `true` if the pinch ended.
    pub fn touch_end(&mut self, input: &TouchInput) -> bool {
        if !self.is_pinching() {
            return false;
        }

        if input.len() < PINCH_TOUCH_COUNT {
            log::debug!("Pinch end");
            self.state = Gesture::Idle;
            return true;
        }

        if let Some(pair) = pair_of(input) {
            self.state = Gesture::Pinching { pair };
        }
        false
    }
}

/// The two contacts of `input`, if it has exactly two.
fn pair_of(input: &TouchInput) -> Option<[TouchPoint; 2]> {
    match input.touches.as_slice() {
        [a, b] => Some([*a, *b]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgpan_input::MouseButton;

    fn touches(points: &[(i32, f32, f32)]) -> TouchInput {
        TouchInput::new(
            points
                .iter()
                .map(|&(id, x, y)| TouchPoint::new(id, x, y))
                .collect(),
        )
    }

    fn left(x: f32, y: f32) -> PointerInput {
        PointerInput::new(MouseButton::Left, x, y)
    }

    #[test]
    fn test_starts_idle() {
        let tracker = GestureTracker::new();
        assert!(tracker.is_idle());
        assert!(tracker.active_touches().is_empty());
    }

    #[test]
    fn test_drag_lifecycle() {
        let mut tracker = GestureTracker::new();

        assert!(tracker.pointer_down(&left(10.0, 20.0)));
        assert!(tracker.is_dragging());

        assert_eq!(tracker.pointer_move(Point::new(15.0, 25.0)), Some((5.0, 5.0)));
        assert_eq!(tracker.pointer_move(Point::new(12.0, 25.0)), Some((-3.0, 0.0)));

        assert!(tracker.pointer_up());
        assert!(tracker.is_idle());
        assert_eq!(tracker.pointer_move(Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_secondary_button_does_not_drag() {
        let mut tracker = GestureTracker::new();
        assert!(!tracker.pointer_down(&PointerInput::new(MouseButton::Right, 0.0, 0.0)));
        assert!(!tracker.pointer_down(&PointerInput::new(MouseButton::Middle, 0.0, 0.0)));
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_pointer_up_without_drag() {
        let mut tracker = GestureTracker::new();
        assert!(!tracker.pointer_up());
    }

    #[test]
    fn test_single_touch_is_not_a_pinch() {
        let mut tracker = GestureTracker::new();
        assert!(!tracker.touch_start(&touches(&[(0, 10.0, 10.0)])));
        assert!(tracker.is_idle());
        assert_eq!(tracker.touch_move(&touches(&[(0, 50.0, 50.0)])), None);
    }

    #[test]
    fn test_pinch_records_pair() {
        let mut tracker = GestureTracker::new();
        assert!(tracker.touch_start(&touches(&[(1, 0.0, 0.0), (2, 50.0, 0.0)])));
        assert!(tracker.is_pinching());
        assert_eq!(tracker.active_touches().len(), 2);
        assert_eq!(tracker.active_touches()[1].client_x, 50.0);
    }

    #[test]
    fn test_pinch_spread_and_squeeze() {
        let mut tracker = GestureTracker::new();
        tracker.touch_start(&touches(&[(1, 0.0, 0.0), (2, 50.0, 0.0)]));

        let step = tracker.touch_move(&touches(&[(1, 0.0, 0.0), (2, 80.0, 0.0)]));
        assert_eq!(step, Some(PinchStep::ZoomIn));

        let step = tracker.touch_move(&touches(&[(1, 0.0, 0.0), (2, 60.0, 0.0)]));
        assert_eq!(step, Some(PinchStep::ZoomOut));

        let step = tracker.touch_move(&touches(&[(1, 0.0, 0.0), (2, 60.0, 0.0)]));
        assert_eq!(step, Some(PinchStep::Hold));
    }

    #[test]
    fn test_pinch_matches_by_id_not_order() {
        let mut tracker = GestureTracker::new();
        tracker.touch_start(&touches(&[(1, 0.0, 0.0), (2, 50.0, 0.0)]));

        // Same contacts reported in reverse order, spread to 80px
        let step = tracker.touch_move(&touches(&[(2, 80.0, 0.0), (1, 0.0, 0.0)]));
        assert_eq!(step, Some(PinchStep::ZoomIn));
    }

    #[test]
    fn test_pinch_with_new_contacts_rerecords() {
        let mut tracker = GestureTracker::new();
        tracker.touch_start(&touches(&[(1, 0.0, 0.0), (2, 50.0, 0.0)]));

        let step = tracker.touch_move(&touches(&[(3, 0.0, 0.0), (4, 500.0, 0.0)]));
        assert_eq!(step, Some(PinchStep::Hold));
        assert_eq!(tracker.active_touches()[0].id, 3);
    }

    #[test]
    fn test_pinch_ignores_three_contacts() {
        let mut tracker = GestureTracker::new();
        tracker.touch_start(&touches(&[(1, 0.0, 0.0), (2, 50.0, 0.0)]));
        let three = touches(&[(1, 0.0, 0.0), (2, 90.0, 0.0), (3, 5.0, 5.0)]);
        assert_eq!(tracker.touch_move(&three), None);
        assert!(!tracker.touch_start(&three));
        assert!(tracker.is_pinching());
    }

    #[test]
    fn test_pinch_ends_below_two_contacts() {
        let mut tracker = GestureTracker::new();
        tracker.touch_start(&touches(&[(1, 0.0, 0.0), (2, 50.0, 0.0)]));

        assert!(tracker.touch_end(&touches(&[(1, 0.0, 0.0)])));
        assert!(tracker.is_idle());
        assert!(tracker.active_touches().is_empty());
    }

    #[test]
    fn test_touch_end_with_two_remaining_keeps_pinch() {
        let mut tracker = GestureTracker::new();
        tracker.touch_start(&touches(&[(1, 0.0, 0.0), (2, 50.0, 0.0)]));
        // Third finger added then lifted; two remain
        assert!(!tracker.touch_end(&touches(&[(1, 0.0, 0.0), (2, 70.0, 0.0)])));
        assert!(tracker.is_pinching());
        assert_eq!(tracker.active_touches()[1].client_x, 70.0);
    }

    #[test]
    fn test_pinch_preempts_drag() {
        let mut tracker = GestureTracker::new();
        tracker.pointer_down(&left(0.0, 0.0));
        assert!(tracker.touch_start(&touches(&[(1, 0.0, 0.0), (2, 50.0, 0.0)])));
        assert!(tracker.is_pinching());
        assert_eq!(tracker.pointer_move(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_mouse_down_ignored_while_pinching() {
        let mut tracker = GestureTracker::new();
        tracker.touch_start(&touches(&[(1, 0.0, 0.0), (2, 50.0, 0.0)]));
        assert!(!tracker.pointer_down(&left(0.0, 0.0)));
        assert!(tracker.is_pinching());
        // Pointer up does not end a pinch either
        assert!(!tracker.pointer_up());
        assert!(tracker.is_pinching());
    }
}
