use super::Body;

use thunderdome as td;

/// Key type to look up a body stored in the physics world.
///
/// Keys stay valid for the lifetime of the world and are used to attribute
/// collision events to bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyKey(pub(super) td::Index);

impl BodyKey {
    /// Get the underlying [`thunderdome::Index`][thunderdome::Index] of this key.
    /// Useful for creating your own mappings from bodies to other things
    /// such as sprites or sounds.
    #[inline]
    pub fn index(&self) -> td::Index {
        self.0
    }
}

/// Storage for every body in the physics world.
///
/// Iteration order is insertion order as long as nothing is removed,
/// which is also the order collision pairs are registered in.
#[derive(Default)]
pub struct EntitySet {
    pub(super) bodies: td::Arena<Body>,
}

impl EntitySet {
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Access a [`Body`][super::Body] in the physics world, if it exists.
    #[inline]
    pub fn get(&self, body: BodyKey) -> Option<&Body> {
        self.bodies.get(body.0)
    }

    #[inline]
    pub(super) fn get_mut(&mut self, body: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(body.0)
    }

    pub fn insert(&mut self, body: Body) -> BodyKey {
        BodyKey(self.bodies.insert(body))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.len() == 0
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = (BodyKey, &Body)> {
        self.bodies.iter().map(|(idx, body)| (BodyKey(idx), body))
    }

    // not exposed to users, must use through Physics::clear
    pub(super) fn clear(&mut self) {
        self.bodies.clear();
    }
}
