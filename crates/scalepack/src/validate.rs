//! Input validation.
//!
//! All caller-facing preconditions are checked here, before any model is
//! built: a run never partially executes against invalid input.

use std::collections::HashSet;

use scalepack_core::{Error, Item, Result};

/// Validates the full input of a packing run.
pub fn validate_input(
    items: &[Item],
    box_width: i64,
    box_height: i64,
    time_limit_secs: u64,
) -> Result<()> {
    if items.is_empty() {
        return Err(Error::EmptyItems);
    }
    if box_width <= 0 {
        return Err(Error::InvalidBox(format!(
            "width must be positive, got {box_width}"
        )));
    }
    if box_height <= 0 {
        return Err(Error::InvalidBox(format!(
            "height must be positive, got {box_height}"
        )));
    }
    if time_limit_secs == 0 {
        return Err(Error::InvalidTimeLimit);
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        validate_item(item, box_width, box_height)?;
        if !seen.insert(item.id) {
            return Err(Error::DuplicateItemId(item.id));
        }
    }
    Ok(())
}

fn validate_item(item: &Item, box_width: i64, box_height: i64) -> Result<()> {
    let positive = [
        (item.width, "width"),
        (item.height, "height"),
        (item.width_min, "width_min"),
        (item.height_min, "height_min"),
    ];
    for (value, name) in positive {
        if value <= 0 {
            return Err(Error::InvalidItem {
                id: item.id,
                reason: format!("'{name}' must be positive, got {value}"),
            });
        }
    }
    if item.width_min > item.width {
        return Err(Error::InvalidItem {
            id: item.id,
            reason: format!(
                "'width_min' ({}) cannot be greater than 'width' ({})",
                item.width_min, item.width
            ),
        });
    }
    if item.height_min > item.height {
        return Err(Error::InvalidItem {
            id: item.id,
            reason: format!(
                "'height_min' ({}) cannot be greater than 'height' ({})",
                item.height_min, item.height
            ),
        });
    }
    if item.width_min > box_width || item.height_min > box_height {
        return Err(Error::ItemTooLarge {
            id: item.id,
            width_min: item.width_min,
            height_min: item.height_min,
            box_width,
            box_height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input() {
        let items = vec![Item::new(1, 100, 50, 80, 40), Item::new(2, 60, 80, 50, 70)];
        assert!(validate_input(&items, 200, 200, 30).is_ok());
    }

    #[test]
    fn test_empty_items() {
        assert!(matches!(
            validate_input(&[], 200, 200, 30),
            Err(Error::EmptyItems)
        ));
    }

    #[test]
    fn test_bad_box_dimensions() {
        let items = vec![Item::rigid(1, 10, 10)];
        assert!(matches!(
            validate_input(&items, 0, 200, 30),
            Err(Error::InvalidBox(_))
        ));
        assert!(matches!(
            validate_input(&items, 200, -5, 30),
            Err(Error::InvalidBox(_))
        ));
    }

    #[test]
    fn test_zero_time_limit() {
        let items = vec![Item::rigid(1, 10, 10)];
        assert!(matches!(
            validate_input(&items, 200, 200, 0),
            Err(Error::InvalidTimeLimit)
        ));
    }

    #[test]
    fn test_non_positive_item_dimension() {
        let items = vec![Item::new(7, 10, 10, 0, 5)];
        match validate_input(&items, 200, 200, 30) {
            Err(Error::InvalidItem { id, reason }) => {
                assert_eq!(id, 7);
                assert!(reason.contains("width_min"));
            }
            other => panic!("expected InvalidItem, got {other:?}"),
        }
    }

    #[test]
    fn test_min_exceeds_preferred() {
        let items = vec![Item::new(3, 10, 10, 12, 5)];
        assert!(matches!(
            validate_input(&items, 200, 200, 30),
            Err(Error::InvalidItem { id: 3, .. })
        ));
    }

    #[test]
    fn test_min_exceeds_box() {
        // Minimum width larger than the box: rejected before any solve.
        let items = vec![Item::new(4, 300, 50, 250, 40)];
        assert!(matches!(
            validate_input(&items, 200, 200, 30),
            Err(Error::ItemTooLarge { id: 4, .. })
        ));
    }

    #[test]
    fn test_duplicate_ids() {
        let items = vec![Item::rigid(5, 10, 10), Item::rigid(5, 20, 20)];
        assert!(matches!(
            validate_input(&items, 200, 200, 30),
            Err(Error::DuplicateItemId(5))
        ));
    }
}
