//! Error types for ScalePack.

use thiserror::Error;

/// Result type alias for ScalePack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during packing operations.
///
/// These cover caller mistakes caught before any solving begins. Solve
/// failures (infeasible, timeout) are never reported through this type;
/// they are encoded in the returned packing report instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The item list was empty.
    #[error("items list cannot be empty")]
    EmptyItems,

    /// Invalid box dimensions.
    #[error("invalid box: {0}")]
    InvalidBox(String),

    /// Non-positive solve time budget.
    #[error("time limit must be a positive number of seconds")]
    InvalidTimeLimit,

    /// An item with non-positive or inconsistent dimensions.
    #[error("item {id}: {reason}")]
    InvalidItem {
        /// Identifier of the offending item.
        id: u64,
        /// What is wrong with it.
        reason: String,
    },

    /// An item whose minimum size cannot fit inside the box.
    #[error(
        "item {id}: minimum dimensions ({width_min}x{height_min}) exceed box dimensions ({box_width}x{box_height})"
    )]
    ItemTooLarge {
        /// Identifier of the offending item.
        id: u64,
        /// Minimum width of the item.
        width_min: i64,
        /// Minimum height of the item.
        height_min: i64,
        /// Box width.
        box_width: i64,
        /// Box height.
        box_height: i64,
    },

    /// Two items share the same identifier.
    #[error("duplicate item id: {0}")]
    DuplicateItemId(u64),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}
