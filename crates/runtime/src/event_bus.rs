use crate::frame::Frame;

/// One structured diagnostic record.
///
/// The engine never logs through a global logger; components emit events here
/// and the host decides whether to print, store, or drop them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, frame: Frame, kind: &'static str, message: impl Into<String>) {
        self.events.push(Event {
            frame_index: frame.index,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use crate::frame::Frame;

    #[test]
    fn events_carry_the_emitting_frame() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(7), "adapter", "dropped 2 invalid coordinates");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 7);
        assert_eq!(bus.events()[0].kind, "adapter");
    }

    #[test]
    fn drain_empties_the_bus() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(0), "k", "m");
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.is_empty());
    }
}
