use crate::math as m;

/// Mass of a ball per cubed unit of radius.
///
/// Mass only matters relative to other balls, so the absolute scale is arbitrary.
pub const MASS_PER_CUBIC_RADIUS: f64 = 1.0 / 7200.0;

/// Highest number of distinct collision group tags.
pub const MAX_GROUP_TAGS: u32 = 64;

/// RGBA color carried through to rendering. The physics never reads it.
pub type Color = [f32; 4];

/// Errors that can occur when constructing bodies.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BodyError {
    #[error("Ball radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("Boundary must have positive width and height, got {width} x {height}")]
    NonPositiveSize { width: f64, height: f64 },
    #[error("Body position and size must be finite")]
    NonFinite,
    #[error("A {kind:?} description has {expected} values, got {got}")]
    ShapeDescriptionLength {
        kind: ShapeKind,
        expected: usize,
        got: usize,
    },
    #[error("Collision group tag {0} is out of range, tags must be below 64")]
    GroupTagOutOfRange(u32),
}

//
// shapes
//

/// An axis-aligned rectangle given by its top-left corner and side lengths.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub fn min_x(&self) -> f64 {
        self.x
    }
    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }
    #[inline]
    pub fn min_y(&self) -> f64 {
        self.y
    }
    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }
}

/// The geometric shape of a body, used for collision detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Circle { r: f64 },
    Rect(Rect),
}

impl Shape {
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Ball,
            Shape::Rect(_) => ShapeKind::Boundary,
        }
    }
}

/// Discriminant of [`Shape`][self::Shape] used when parsing flat shape descriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    Ball,
    Boundary,
}

impl ShapeKind {
    /// Number of values in a flat description of this kind of shape.
    pub fn description_len(&self) -> usize {
        match self {
            ShapeKind::Ball => 3,
            ShapeKind::Boundary => 4,
        }
    }
}

//
// collision groups
//

/// A set of up to 64 collision group tags stored as a bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupMask(pub u64);

impl GroupMask {
    pub fn from_tags(tags: &[u32]) -> Result<Self, BodyError> {
        let mut bits = 0;
        for &tag in tags {
            if tag >= MAX_GROUP_TAGS {
                return Err(BodyError::GroupTagOutOfRange(tag));
            }
            bits |= 1_u64 << tag;
        }
        Ok(GroupMask(bits))
    }

    #[inline]
    pub fn intersects(&self, other: GroupMask) -> bool {
        self.0 & other.0 != 0
    }
}

/// Which other bodies a body can collide with.
///
/// Untagged bodies collide with each other but never with tagged ones.
/// Tagged bodies collide if they share at least one tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionGroups {
    #[default]
    Untagged,
    Tagged(GroupMask),
    /// Never collides with anything.
    Disabled,
}

impl CollisionGroups {
    pub fn tagged(tags: &[u32]) -> Result<Self, BodyError> {
        if tags.is_empty() {
            return Ok(CollisionGroups::Untagged);
        }
        Ok(CollisionGroups::Tagged(GroupMask::from_tags(tags)?))
    }

    /// Check whether two bodies with these groups should be tested for collision.
    pub fn can_collide(&self, other: &CollisionGroups) -> bool {
        use CollisionGroups::*;
        match (self, other) {
            (Disabled, _) | (_, Disabled) => false,
            (Untagged, Untagged) => true,
            (Tagged(a), Tagged(b)) => a.intersects(*b),
            _ => false,
        }
    }
}

//
// mass
//

/// Mass of a body, which can be infinite.
///
/// Boundaries have infinite mass. Nothing ever moves them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mass {
    Finite(f64),
    Infinite,
}

impl From<f64> for Mass {
    #[inline]
    fn from(mass: f64) -> Self {
        Mass::Finite(mass)
    }
}

impl Mass {
    /// Get the mass value, or `None` if it's infinite.
    #[inline]
    pub fn value(&self) -> Option<f64> {
        match self {
            Mass::Finite(mass) => Some(*mass),
            Mass::Infinite => None,
        }
    }
}

//
// kinematics
//

/// Position and its derivatives.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Kinematics {
    pub position: m::Vec2,
    pub velocity: m::Vec2,
    pub acceleration: m::Vec2,
}

impl Kinematics {
    /// Step forward by `dt` with a semi-implicit Euler step:
    /// velocity is updated first and the new velocity moves the position.
    #[inline]
    pub fn extrapolate(&self, acceleration: m::Vec2, dt: f64) -> Kinematics {
        let velocity = self.velocity + acceleration * dt;
        Kinematics {
            position: self.position + velocity * dt,
            velocity,
            acceleration: self.acceleration,
        }
    }
}

//
// bodies
//

/// A moving circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub(crate) kinematics: Kinematics,
    radius: f64,
    mass: Mass,
    color: Option<Color>,
    groups: CollisionGroups,
}

impl Ball {
    /// Create a ball at rest. Mass is derived from the radius.
    pub fn new(center: impl Into<[f64; 2]>, radius: f64) -> Result<Self, BodyError> {
        let [x, y] = center.into();
        if !(x.is_finite() && y.is_finite() && radius.is_finite()) {
            return Err(BodyError::NonFinite);
        }
        if radius <= 0.0 {
            return Err(BodyError::NonPositiveRadius(radius));
        }
        Ok(Ball {
            kinematics: Kinematics {
                position: m::Vec2::new(x, y),
                ..Default::default()
            },
            radius,
            mass: Mass::from(MASS_PER_CUBIC_RADIUS * radius.powi(3)),
            color: None,
            groups: CollisionGroups::default(),
        })
    }

    /// Set the velocity of the ball in a builder-like chain.
    pub fn with_velocity(mut self, velocity: impl Into<[f64; 2]>) -> Self {
        let [x, y] = velocity.into();
        self.kinematics.velocity = m::Vec2::new(x, y);
        self
    }

    /// Set the ball's own constant acceleration in a builder-like chain.
    pub fn with_acceleration(mut self, acceleration: impl Into<[f64; 2]>) -> Self {
        let [x, y] = acceleration.into();
        self.kinematics.acceleration = m::Vec2::new(x, y);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f64 {
        self.mass.value().unwrap_or(f64::INFINITY)
    }
}

/// A static rectangle that contains balls, which bounce off its inner faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    rect: Rect,
    color: Option<Color>,
    groups: CollisionGroups,
}

impl Boundary {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, BodyError> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(BodyError::NonFinite);
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(BodyError::NonPositiveSize { width, height });
        }
        Ok(Boundary {
            rect: Rect {
                x,
                y,
                width,
                height,
            },
            color: None,
            groups: CollisionGroups::default(),
        })
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }
}

/// Anything that takes part in the simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Body {
    Ball(Ball),
    Boundary(Boundary),
}

impl From<Ball> for Body {
    fn from(ball: Ball) -> Self {
        Body::Ball(ball)
    }
}

impl From<Boundary> for Body {
    fn from(boundary: Boundary) -> Self {
        Body::Boundary(boundary)
    }
}

impl Body {
    /// Create a body from a flat description: `[x, y, r]` for a ball
    /// or `[x, y, width, height]` for a boundary.
    pub fn from_description(kind: ShapeKind, data: &[f64]) -> Result<Self, BodyError> {
        let expected = kind.description_len();
        if data.len() != expected {
            return Err(BodyError::ShapeDescriptionLength {
                kind,
                expected,
                got: data.len(),
            });
        }
        match kind {
            ShapeKind::Ball => Ok(Ball::new([data[0], data[1]], data[2])?.into()),
            ShapeKind::Boundary => Ok(Boundary::new(data[0], data[1], data[2], data[3])?.into()),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Body::Ball(b) => Shape::Circle { r: b.radius },
            Body::Boundary(b) => Shape::Rect(b.rect),
        }
    }

    /// Center of a ball or top-left corner of a boundary.
    pub fn position(&self) -> m::Vec2 {
        match self {
            Body::Ball(b) => b.kinematics.position,
            Body::Boundary(b) => m::Vec2::new(b.rect.x, b.rect.y),
        }
    }

    pub fn velocity(&self) -> m::Vec2 {
        match self {
            Body::Ball(b) => b.kinematics.velocity,
            Body::Boundary(_) => m::Vec2::zero(),
        }
    }

    pub fn acceleration(&self) -> m::Vec2 {
        match self {
            Body::Ball(b) => b.kinematics.acceleration,
            Body::Boundary(_) => m::Vec2::zero(),
        }
    }

    pub fn radius(&self) -> Option<f64> {
        match self {
            Body::Ball(b) => Some(b.radius),
            Body::Boundary(_) => None,
        }
    }

    pub fn rect(&self) -> Option<Rect> {
        match self {
            Body::Ball(_) => None,
            Body::Boundary(b) => Some(b.rect),
        }
    }

    pub fn mass(&self) -> Mass {
        match self {
            Body::Ball(b) => b.mass,
            Body::Boundary(_) => Mass::Infinite,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Body::Ball(b) => b.color,
            Body::Boundary(b) => b.color,
        }
    }

    pub fn groups(&self) -> CollisionGroups {
        match self {
            Body::Ball(b) => b.groups,
            Body::Boundary(b) => b.groups,
        }
    }

    /// Check whether the body can move at all.
    #[inline]
    pub fn is_movable(&self) -> bool {
        matches!(self, Body::Ball(_))
    }

    pub(crate) fn kinematics(&self) -> Kinematics {
        match self {
            Body::Ball(b) => b.kinematics,
            Body::Boundary(b) => Kinematics {
                position: m::Vec2::new(b.rect.x, b.rect.y),
                ..Default::default()
            },
        }
    }

    /// Only the scheduler moves bodies. Boundaries are immovable and ignore this.
    pub(crate) fn set_motion(&mut self, position: m::Vec2, velocity: m::Vec2) {
        if let Body::Ball(b) = self {
            b.kinematics.position = position;
            b.kinematics.velocity = velocity;
        }
    }
}
