//! Outward-flowing events and the listener trait.
//!
//! Events decouple the terminal core from its host: the network task
//! forwards `Output` bytes to the remote side, the display task coalesces
//! `ContentChanged`/`LabelsChanged` into throttled screen pushes. Tests use
//! `VoidListener` or a recording listener.

/// Events produced by the terminal core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Grid, cursor, or mode state changed — a redraw is needed.
    ///
    /// Fired on every mutating call; the host coalesces using its display
    /// timeout.
    ContentChanged,
    /// Title or button labels changed.
    LabelsChanged,
    /// BEL character received.
    Bell,
    /// Response bytes for the remote program (DSR, DA).
    ///
    /// The listener enqueues these on its transport; the core never waits.
    Output(String),
}

/// Receives events from the terminal core.
///
/// The default implementation is a no-op, so `VoidListener` needs no method
/// body.
pub trait EventListener {
    /// Handle a terminal event. Default: no-op.
    fn send_event(&self, _event: Event) {}
}

/// No-op event listener for tests and headless operation.
pub struct VoidListener;

impl EventListener for VoidListener {}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::{Event, EventListener, VoidListener};

    /// Listener that records every event for assertions.
    #[derive(Default)]
    pub struct Recorder {
        pub events: RefCell<Vec<Event>>,
    }

    impl EventListener for Recorder {
        fn send_event(&self, event: Event) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn void_listener_ignores_events() {
        VoidListener.send_event(Event::Bell);
    }

    #[test]
    fn recorder_captures_in_order() {
        let rec = Recorder::default();
        rec.send_event(Event::ContentChanged);
        rec.send_event(Event::Output("\x1b[0n".into()));
        assert_eq!(
            *rec.events.borrow(),
            vec![Event::ContentChanged, Event::Output("\x1b[0n".into())]
        );
    }
}
