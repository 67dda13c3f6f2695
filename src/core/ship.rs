//! Ship kinds, static ship types and live ship instances.

use core::fmt;

use crate::core::common::Coord;

/// Number of distinct ship kinds.
pub const SHIP_KIND_COUNT: usize = 4;

/// Enumerated ship kind. A kind's size is its index plus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipKind {
    Single,
    Double,
    Triple,
    Quadruple,
}

impl ShipKind {
    /// All kinds in ascending size order.
    pub const ALL: [ShipKind; SHIP_KIND_COUNT] = [
        ShipKind::Single,
        ShipKind::Double,
        ShipKind::Triple,
        ShipKind::Quadruple,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Number of cells the ship covers; also its starting health.
    pub const fn size(self) -> usize {
        self as usize + 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_size(size: usize) -> Option<Self> {
        size.checked_sub(1).and_then(Self::from_index)
    }

    pub fn name(self) -> &'static str {
        match self {
            ShipKind::Single => "single-unit",
            ShipKind::Double => "double-unit",
            ShipKind::Triple => "triple-unit",
            ShipKind::Quadruple => "quadruple-unit",
        }
    }
}

/// Axis a ship extends along from its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Along x: direction `(1, 0)`.
    #[default]
    Horizontal,
    /// Along y: direction `(0, 1)`.
    Vertical,
}

impl Orientation {
    /// Unit direction vector.
    pub const fn direction(self) -> (i32, i32) {
        match self {
            Orientation::Horizontal => (1, 0),
            Orientation::Vertical => (0, 1),
        }
    }

    /// The other orientation, for the placement UI's rotate toggle.
    pub const fn toggled(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Static ship type: a kind and how many of it a player may place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipType {
    kind: ShipKind,
    max_count: u32,
}

impl ShipType {
    pub const fn new(kind: ShipKind, max_count: u32) -> Self {
        Self { kind, max_count }
    }

    pub fn kind(&self) -> ShipKind {
        self.kind
    }

    pub fn size(&self) -> usize {
        self.kind.size()
    }

    /// Maximum number of instances permitted per match.
    pub fn max_count(&self) -> u32 {
        self.max_count
    }
}

/// Instance id: position in the registry's instance list. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipId(pub u32);

impl ShipId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A placed ship with mutable health. Kept for history after it sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShipInstance {
    id: ShipId,
    kind: ShipKind,
    health: u32,
    origin: Coord,
    orientation: Orientation,
}

impl ShipInstance {
    pub fn new(id: ShipId, kind: ShipKind, origin: Coord, orientation: Orientation) -> Self {
        Self {
            id,
            kind,
            health: kind.size() as u32,
            origin,
            orientation,
        }
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    pub fn kind(&self) -> ShipKind {
        self.kind
    }

    pub fn size(&self) -> usize {
        self.kind.size()
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn origin(&self) -> Coord {
        self.origin
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Cells covered by the ship, origin first.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let (dx, dy) = self.orientation.direction();
        let origin = self.origin;
        (0..self.size() as i32).map(move |i| origin.offset(i * dx, i * dy))
    }

    /// Remove one point of health and return what is left.
    pub(crate) fn damage(&mut self) -> u32 {
        self.health = self.health.saturating_sub(1);
        self.health
    }
}
