//! Rectangular item and box records.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangular item to pack.
///
/// An item has a preferred size (`width`, `height`) and a minimum size it
/// may be shrunk to (`width_min`, `height_min`). The solver is free to pick
/// any size within those per-axis ranges when placing the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Caller-assigned identifier, unique within one solve.
    pub id: u64,
    /// Preferred width.
    pub width: i64,
    /// Preferred height.
    pub height: i64,
    /// Minimum allowed width after shrinking.
    pub width_min: i64,
    /// Minimum allowed height after shrinking.
    pub height_min: i64,
}

impl Item {
    /// Creates an item with the given preferred and minimum dimensions.
    pub fn new(id: u64, width: i64, height: i64, width_min: i64, height_min: i64) -> Self {
        Self {
            id,
            width,
            height,
            width_min,
            height_min,
        }
    }

    /// Creates an item that cannot shrink (minimum size equals preferred size).
    pub fn rigid(id: u64, width: i64, height: i64) -> Self {
        Self::new(id, width, height, width, height)
    }

    /// Maximum amount both axes can shrink by simultaneously.
    pub fn max_equal_shrink(&self) -> i64 {
        (self.width - self.width_min).min(self.height - self.height_min)
    }

    /// Area at the preferred size.
    pub fn area(&self) -> i64 {
        self.width * self.height
    }

    /// Area at the minimum size.
    pub fn min_area(&self) -> i64 {
        self.width_min * self.height_min
    }
}

/// The box (bin) template items are packed into.
///
/// All boxes in one run share the same dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxSpec {
    /// Box identifier.
    pub id: u64,
    /// Box width.
    pub width: i64,
    /// Box height.
    pub height: i64,
}

impl BoxSpec {
    /// Creates a box template.
    pub fn new(id: u64, width: i64, height: i64) -> Self {
        Self { id, width, height }
    }

    /// Box area.
    pub fn area(&self) -> i64 {
        self.width * self.height
    }
}

/// An item after packing: final position, final (possibly shrunk) size, and
/// the box it was assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackedItem {
    /// Identifier of the source item.
    pub id: u64,
    /// X coordinate of the top-left corner inside the box.
    pub x: i64,
    /// Y coordinate of the top-left corner inside the box.
    pub y: i64,
    /// Final width.
    pub width: i64,
    /// Final height.
    pub height: i64,
    /// Identifier of the assigned box.
    pub box_id: u64,
}

impl PackedItem {
    /// Returns true if this placement lies fully inside the given box.
    pub fn fits_in(&self, bx: &BoxSpec) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x + self.width <= bx.width
            && self.y + self.height <= bx.height
    }

    /// Returns true if this placement overlaps another in the plane.
    ///
    /// Uses the half-open separation test: touching edges do not overlap.
    /// Box assignment is not considered; callers compare `box_id` first.
    pub fn overlaps(&self, other: &PackedItem) -> bool {
        !(self.x + self.width <= other.x
            || other.x + other.width <= self.x
            || self.y + self.height <= other.y
            || other.y + other.height <= self.y)
    }
}
