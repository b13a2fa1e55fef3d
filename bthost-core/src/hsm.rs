//! The flat state-machine framework every profile state machine is built
//! on.
//!
//! Deliberately flat, not hierarchical — none of the profiles hosted here
//! nest states, so `StateMachine` skips the substate-traversal machinery a
//! general HSM would need and just tracks "current" and "previous".

/// A single state. `Ctx` is the profile's shared mutable context (device
/// record, pending flags, timers); `Event` is that profile's event enum.
pub trait State<Ctx, Event> {
    /// Run once on transition into this state, including re-entering the
    /// same state via a self-transition (used to reset per-state timers).
    fn enter(&self, _ctx: &mut Ctx) {}

    /// Run once on transition out of this state, before `enter` of the next.
    fn exit(&self, _ctx: &mut Ctx) {}

    /// Handle one event. Returning `Some(next)` transitions to `next`
    /// (running this state's `exit`, then `next`'s `enter`); `None` means
    /// the event was consumed without a transition.
    fn process_event(&self, ctx: &mut Ctx, event: &Event) -> Option<Self>
    where
        Self: Sized;
}

/// Owns the current and previous state value for one profile instance.
/// `S` is an enum implementing `State`; callers transition by event only —
/// there is no public `force_state`, so the invariant that `previous`
/// always reflects the state exited by the most recent transition (never
/// skipped) can't be bypassed.
pub struct StateMachine<S> {
    current: S,
    previous: Option<S>,
}

impl<S> StateMachine<S> {
    pub fn new<Ctx, Event>(initial: S, ctx: &mut Ctx) -> Self
    where
        S: State<Ctx, Event>,
    {
        initial.enter(ctx);
        Self { current: initial, previous: None }
    }

    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn previous(&self) -> Option<&S> {
        self.previous.as_ref()
    }

    /// Dispatch one event to the current state, transitioning if it
    /// returns a new state. Returns whether a transition happened.
    pub fn dispatch<Ctx, Event>(&mut self, ctx: &mut Ctx, event: &Event) -> bool
    where
        S: State<Ctx, Event> + Clone,
    {
        match self.current.process_event(ctx, event) {
            Some(next) => {
                self.current.exit(ctx);
                let prior = std::mem::replace(&mut self.current, next);
                self.previous = Some(prior);
                self.current.enter(ctx);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
    }

    #[derive(Default)]
    struct Ctx {
        enters: Vec<&'static str>,
        exits: Vec<&'static str>,
    }

    enum Ev {
        Toggle,
        Same,
    }

    impl State<Ctx, Ev> for Light {
        fn enter(&self, ctx: &mut Ctx) {
            ctx.enters.push(match self {
                Light::Red => "red",
                Light::Green => "green",
            });
        }

        fn exit(&self, ctx: &mut Ctx) {
            ctx.exits.push(match self {
                Light::Red => "red",
                Light::Green => "green",
            });
        }

        fn process_event(&self, _ctx: &mut Ctx, event: &Ev) -> Option<Self> {
            match (self, event) {
                (Light::Red, Ev::Toggle) => Some(Light::Green),
                (Light::Green, Ev::Toggle) => Some(Light::Red),
                (_, Ev::Same) => Some(self.clone()),
            }
        }
    }

    #[test]
    fn transition_runs_exit_then_enter_and_tracks_previous() {
        let mut ctx = Ctx::default();
        let mut sm = StateMachine::new(Light::Red, &mut ctx);
        assert_eq!(*sm.current(), Light::Red);
        assert!(sm.previous().is_none());

        assert!(sm.dispatch(&mut ctx, &Ev::Toggle));
        assert_eq!(*sm.current(), Light::Green);
        assert_eq!(sm.previous(), Some(&Light::Red));
        assert_eq!(ctx.exits, vec!["red"]);
        assert_eq!(ctx.enters, vec!["red", "green"]);
    }

    #[test]
    fn self_transition_reruns_enter_and_exit() {
        let mut ctx = Ctx::default();
        let mut sm = StateMachine::new(Light::Red, &mut ctx);
        assert!(sm.dispatch(&mut ctx, &Ev::Same));
        assert_eq!(*sm.current(), Light::Red);
        assert_eq!(sm.previous(), Some(&Light::Red));
        assert_eq!(ctx.enters, vec!["red", "red"]);
        assert_eq!(ctx.exits, vec!["red"]);
    }

    #[test]
    fn current_is_never_optional() {
        let mut ctx = Ctx::default();
        let sm = StateMachine::new(Light::Green, &mut ctx);
        let _: &Light = sm.current();
    }
}
