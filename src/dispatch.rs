use crate::events::Event;

/// Registry of consumer event handlers.
///
/// Handlers are visited in registration order and receive a borrowed view of
/// the event. Handlers have no access to the dispatcher, so registration
/// during a dispatch cannot happen; a handler registered between frames only
/// observes subsequent events.
pub struct EventDispatcher<'h> {
    handlers: Vec<Box<dyn FnMut(&Event<'_>) + 'h>>,
}

impl<'h> EventDispatcher<'h> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register<F>(&mut self, handler: F)
    where
        F: FnMut(&Event<'_>) + 'h,
    {
        self.handlers.push(Box::new(handler));
    }

    pub fn dispatch(&mut self, event: &Event<'_>) {
        for handler in self.handlers.iter_mut() {
            handler(event);
        }
    }
}

impl<'h> Default for EventDispatcher<'h> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MatchStart, RoundEndOfficial};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_run_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));

        let mut dispatcher = EventDispatcher::new();
        for tag in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            dispatcher.register(move |_ev| seen.borrow_mut().push(tag));
        }

        dispatcher.dispatch(&Event::MatchStart(MatchStart));

        assert_eq!(vec!["first", "second", "third"], *seen.borrow());
    }

    #[test]
    fn handlers_observe_every_dispatch() {
        let count = Rc::new(RefCell::new(0));
        let mut dispatcher = EventDispatcher::new();
        {
            let count = Rc::clone(&count);
            dispatcher.register(move |ev| {
                if matches!(ev, Event::RoundEndOfficial(_)) {
                    *count.borrow_mut() += 1;
                }
            });
        }

        dispatcher.dispatch(&Event::RoundEndOfficial(RoundEndOfficial));
        dispatcher.dispatch(&Event::MatchStart(MatchStart));
        dispatcher.dispatch(&Event::RoundEndOfficial(RoundEndOfficial));

        assert_eq!(2, *count.borrow());
    }
}
