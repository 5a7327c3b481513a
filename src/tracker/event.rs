/// An event meant to be acted on exactly once.
///
/// Firing replaces whatever was pending; taking hands the payload over and
/// returns the slot to `Idle`, so a later re-read of the same state sees
/// nothing to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneShot<T> {
    Idle,
    Pending(T),
}

impl<T> Default for OneShot<T> {
    fn default() -> Self {
        OneShot::Idle
    }
}

impl<T> OneShot<T> {
    pub fn fire(&mut self, payload: T) {
        *self = OneShot::Pending(payload);
    }

    pub fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, OneShot::Idle) {
            OneShot::Pending(payload) => Some(payload),
            OneShot::Idle => None,
        }
    }

    pub fn peek(&self) -> Option<&T> {
        match self {
            OneShot::Pending(payload) => Some(payload),
            OneShot::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, OneShot::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_exactly_once() {
        let mut event = OneShot::default();
        event.fire(7);
        assert!(event.is_pending());
        assert_eq!(event.peek(), Some(&7));
        assert_eq!(event.take(), Some(7));
        assert_eq!(event.take(), None);
        assert_eq!(event, OneShot::Idle);
    }

    #[test]
    fn refiring_replaces_pending_payload() {
        let mut event = OneShot::Idle;
        event.fire("first");
        event.fire("second");
        assert_eq!(event.take(), Some("second"));
    }
}
