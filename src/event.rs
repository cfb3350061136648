use crate::{math as m, physics::BodyKey};

/// Position and velocity of a body at the instant of a collision,
/// taken before the collision response changes the velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
pub struct Snapshot {
    pub position: m::Vec2,
    pub velocity: m::Vec2,
}

/// Which kinds of bodies took part in a collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize))]
pub enum ContactKind {
    BallBall,
    /// A ball hit the inside of a boundary.
    /// The boundary is always the first body of the event.
    BallBoundary,
}

/// A single resolved collision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent {
    /// Absolute simulation time of the contact.
    pub time: f64,
    pub bodies: [BodyKey; 2],
    /// The point of contact in world space.
    pub point: m::Vec2,
    /// State of each body at `time`, in the same order as `bodies`.
    pub snapshots: [Snapshot; 2],
    pub kind: ContactKind,
    // registration order of the pair, used to order simultaneous collisions
    pub(crate) pair_index: usize,
}

/// A hook that gets notified of every resolved collision,
/// e.g. to cue sounds or visual effects.
///
/// Observers get a shared reference to the event only,
/// so they can't affect the simulation.
pub trait CollisionObserver {
    fn on_collision(&mut self, evt: &CollisionEvent);
}

/// Observer that ignores everything.
pub struct NoObserver;
impl CollisionObserver for NoObserver {
    fn on_collision(&mut self, _: &CollisionEvent) {}
}

/// Observer that calls a closure.
pub struct ObserverFn<F: FnMut(&CollisionEvent)>(pub F);
impl<F: FnMut(&CollisionEvent)> CollisionObserver for ObserverFn<F> {
    fn on_collision(&mut self, evt: &CollisionEvent) {
        (self.0)(evt)
    }
}

impl<O: CollisionObserver + ?Sized> CollisionObserver for &mut O {
    fn on_collision(&mut self, evt: &CollisionEvent) {
        (**self).on_collision(evt)
    }
}

/// Observer that gathers events to be handled later, e.g. once per rendered frame.
#[derive(Default)]
pub struct EventSink {
    pub(self) events: Vec<CollisionEvent>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, evt: CollisionEvent) {
        self.events.push(evt);
    }

    /// Events gathered since the last drain, in the order they were resolved.
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> impl '_ + Iterator<Item = CollisionEvent> {
        self.events.drain(..)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl CollisionObserver for EventSink {
    fn on_collision(&mut self, evt: &CollisionEvent) {
        self.push(*evt);
    }
}
