//! Gesture state machine that turns raw pointer/touch input into drawing intents.
//!
//! The router never touches drawing data. It is fed host events in delivery
//! order and answers with the intents the session should apply.
//!
//! ## States
//!
//! - `Idle`: nothing is captured, the host keeps all native gestures
//! - `Armed(action)`: single-contact input draws or erases
//! - `ActiveStroke`: a drawing gesture is in progress
//! - `IgnoringMultitouch`: two or more contacts were seen; everything is
//!   suppressed until every contact lifts

use super::geo::LatLng;
use super::model::Mode;

/// What an armed router does with single-contact input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmedAction {
    Draw,
    Erase,
}

impl ArmedAction {
    fn from_mode(mode: Mode) -> Option<Self> {
        match mode {
            Mode::Idle => None,
            Mode::Drawing => Some(ArmedAction::Draw),
            Mode::Erasing => Some(ArmedAction::Erase),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterState {
    #[default]
    Idle,
    Armed(ArmedAction),
    ActiveStroke,
    /// Remembers the action to resume once all contacts lift
    IgnoringMultitouch(ArmedAction),
}

/// Where an input sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    Touch,
}

/// Host input, already mapped to geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { position: LatLng },
    PointerMove { position: LatLng },
    PointerUp,
    /// `contacts` is the number of touches on the surface after this event
    TouchStart { position: LatLng, contacts: usize },
    TouchMove { position: LatLng, contacts: usize },
    TouchEnd { contacts: usize },
}

/// Requests emitted by the router for the session to carry out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    BeginStroke { position: LatLng },
    ExtendStroke { position: LatLng },
    EndStroke,
    EraseAt { position: LatLng, source: InputSource },
}

#[derive(Debug, Default)]
pub struct InputRouter {
    state: RouterState,
    /// Mouse button went down while armed and is still held.
    /// Drags that began before the current mode never count.
    pointer_pressed: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    /// True when the host may run its single-pointer pan gesture.
    pub fn native_pan_enabled(&self) -> bool {
        matches!(self.state, RouterState::Idle)
    }

    fn armed_action(&self) -> Option<ArmedAction> {
        match self.state {
            RouterState::Idle => None,
            RouterState::Armed(action) | RouterState::IgnoringMultitouch(action) => Some(action),
            RouterState::ActiveStroke => Some(ArmedAction::Draw),
        }
    }

    /// Switch modes. An in-progress stroke is finalized, never dropped.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Intent> {
        let mut intents = Vec::new();
        let previous = self.state;
        let next = ArmedAction::from_mode(mode);

        match (self.state, next) {
            (RouterState::ActiveStroke, Some(ArmedAction::Draw)) => {}
            (RouterState::ActiveStroke, _) => {
                intents.push(Intent::EndStroke);
                self.state = next.map_or(RouterState::Idle, RouterState::Armed);
            }
            (RouterState::IgnoringMultitouch(_), Some(action)) => {
                self.state = RouterState::IgnoringMultitouch(action);
            }
            (_, Some(action)) => self.state = RouterState::Armed(action),
            (_, None) => self.state = RouterState::Idle,
        }

        if self.state != previous {
            self.pointer_pressed = false;
        }
        intents
    }

    pub fn handle(&mut self, event: InputEvent) -> Vec<Intent> {
        match event {
            InputEvent::PointerDown { position } => {
                self.pointer_pressed = self.state != RouterState::Idle;
                self.contact_down(position, InputSource::Pointer)
            }
            InputEvent::PointerMove { position } => {
                if !self.pointer_pressed {
                    return Vec::new();
                }
                self.contact_move(position, InputSource::Pointer)
            }
            InputEvent::PointerUp => {
                self.pointer_pressed = false;
                self.contact_up()
            }
            InputEvent::TouchStart { position, contacts } => {
                if contacts >= 2 {
                    return self.enter_multitouch();
                }
                self.contact_down(position, InputSource::Touch)
            }
            InputEvent::TouchMove { position, contacts } => {
                if contacts >= 2 {
                    return self.enter_multitouch();
                }
                self.contact_move(position, InputSource::Touch)
            }
            InputEvent::TouchEnd { contacts } => {
                if let RouterState::IgnoringMultitouch(action) = self.state {
                    if contacts == 0 {
                        self.state = RouterState::Armed(action);
                    }
                    return Vec::new();
                }
                self.contact_up()
            }
        }
    }

    fn contact_down(&mut self, position: LatLng, source: InputSource) -> Vec<Intent> {
        match self.state {
            RouterState::Armed(ArmedAction::Draw) => {
                self.state = RouterState::ActiveStroke;
                vec![Intent::BeginStroke { position }]
            }
            RouterState::Armed(ArmedAction::Erase) => vec![Intent::EraseAt { position, source }],
            // A second press without a release: keep extending
            RouterState::ActiveStroke => vec![Intent::ExtendStroke { position }],
            RouterState::Idle | RouterState::IgnoringMultitouch(_) => Vec::new(),
        }
    }

    fn contact_move(&mut self, position: LatLng, source: InputSource) -> Vec<Intent> {
        match self.state {
            RouterState::ActiveStroke => vec![Intent::ExtendStroke { position }],
            RouterState::Armed(ArmedAction::Erase) => vec![Intent::EraseAt { position, source }],
            _ => Vec::new(),
        }
    }

    fn contact_up(&mut self) -> Vec<Intent> {
        match self.state {
            RouterState::ActiveStroke => {
                self.state = RouterState::Armed(ArmedAction::Draw);
                vec![Intent::EndStroke]
            }
            _ => Vec::new(),
        }
    }

    fn enter_multitouch(&mut self) -> Vec<Intent> {
        let Some(action) = self.armed_action() else {
            return Vec::new();
        };
        let intents = if self.state == RouterState::ActiveStroke {
            vec![Intent::EndStroke]
        } else {
            Vec::new()
        };
        self.state = RouterState::IgnoringMultitouch(action);
        intents
    }
}
