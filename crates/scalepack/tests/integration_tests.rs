//! Integration tests for scalepack.

use std::collections::HashMap;

use scalepack::{
    pack, BoxSpec, Item, PackConfig, PackedItem, PackingOutcome, PackingResult,
};

/// Checks every structural invariant of a successful packing:
/// complete coverage, per-item size bounds, box containment, and pairwise
/// non-overlap inside each box.
fn assert_valid_packing(result: &PackingResult, items: &[Item], box_width: i64, box_height: i64) {
    assert!(result.success, "packing failed: {}", result.message);
    let bx = BoxSpec::new(0, box_width, box_height);
    let by_id: HashMap<u64, &Item> = items.iter().map(|item| (item.id, item)).collect();
    let packed: Vec<&PackedItem> = result.packed_items().collect();
    assert_eq!(packed.len(), items.len(), "every item must be placed");

    for p in &packed {
        let item = by_id[&p.id];
        assert!(
            p.width >= item.width_min && p.width <= item.width,
            "item {}: width {} outside [{}, {}]",
            p.id,
            p.width,
            item.width_min,
            item.width
        );
        assert!(
            p.height >= item.height_min && p.height <= item.height,
            "item {}: height {} outside [{}, {}]",
            p.id,
            p.height,
            item.height_min,
            item.height
        );
        assert!(p.fits_in(&bx), "item {} out of bounds", p.id);
        if let Some(n) = result.num_boxes_used {
            assert!((p.box_id as usize) < n, "item {} in unexpected box", p.id);
        }
    }

    for (i, a) in packed.iter().enumerate() {
        for b in &packed[i + 1..] {
            if a.box_id == b.box_id {
                assert!(
                    !a.overlaps(b),
                    "items {} and {} overlap in box {}",
                    a.id,
                    b.id,
                    a.box_id
                );
            }
        }
    }
}

fn config() -> PackConfig {
    PackConfig::new().with_time_limit_secs(30)
}

mod single_item_tests {
    use super::*;

    #[test]
    fn test_fitting_item_packs_without_shrink() {
        let items = vec![Item::new(1, 100, 50, 80, 40)];
        let result = pack(&items, 200, 200, &config()).unwrap();

        assert!(result.success);
        assert_eq!(result.num_boxes_used, Some(1));
        assert_eq!(result.outcome, PackingOutcome::Optimal);
        assert_eq!(result.total_shrink(), Some(0));

        let packed: Vec<_> = result.packed_items().collect();
        assert_eq!(packed.len(), 1);
        assert_eq!(packed[0].width, 100);
        assert_eq!(packed[0].height, 50);
        assert_valid_packing(&result, &items, 200, 200);
    }
}

mod box_count_tests {
    use super::*;

    #[test]
    fn test_two_oversize_items_need_two_boxes() {
        // Each rigid item takes more than half the box in both axes.
        let items = vec![Item::rigid(1, 150, 150), Item::rigid(2, 150, 150)];
        let result = pack(&items, 200, 200, &config()).unwrap();

        assert!(result.success);
        assert_eq!(result.num_boxes_used, Some(2));
        assert_eq!(result.total_shrink(), Some(0));
        assert_valid_packing(&result, &items, 200, 200);
    }

    #[test]
    fn test_three_pairwise_incompatible_items_need_three_boxes() {
        let items = vec![
            Item::rigid(1, 100, 100),
            Item::rigid(2, 100, 100),
            Item::rigid(3, 100, 100),
        ];
        let result = pack(&items, 150, 150, &config()).unwrap();

        assert!(result.success);
        assert_eq!(result.num_boxes_used, Some(3));
        assert_valid_packing(&result, &items, 150, 150);
    }

    #[test]
    fn test_shrink_range_reduces_box_count() {
        // At preferred size neither axis fits two items in one 100x50 box,
        // but the allowed minima do: box minimization may exploit them.
        let items = vec![Item::new(1, 60, 60, 40, 40), Item::new(2, 60, 60, 40, 40)];
        let result = pack(&items, 100, 50, &config()).unwrap();

        assert!(result.success);
        assert_eq!(result.num_boxes_used, Some(1));
        assert_valid_packing(&result, &items, 100, 50);
    }
}

mod validation_tests {
    use super::*;
    use scalepack::Error;

    #[test]
    fn test_min_width_exceeding_box_is_rejected() {
        // Rejected before any solve attempt.
        let items = vec![Item::new(1, 300, 50, 250, 40)];
        let err = pack(&items, 200, 200, &config()).unwrap_err();
        assert!(matches!(err, Error::ItemTooLarge { id: 1, .. }));
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = pack(&[], 200, 200, &config()).unwrap_err();
        assert!(matches!(err, Error::EmptyItems));
    }

    #[test]
    fn test_inconsistent_minimum_rejected() {
        let items = vec![Item::new(1, 50, 50, 60, 40)];
        let err = pack(&items, 200, 200, &config()).unwrap_err();
        assert!(matches!(err, Error::InvalidItem { id: 1, .. }));
    }
}

mod shrink_tests {
    use super::*;

    #[test]
    fn test_global_shrink_is_minimized() {
        // Heights are rigid, so the only single-box layout is side by side:
        // widths must give up 40 in total, and no more.
        let items = vec![
            Item::new(1, 120, 150, 80, 150),
            Item::new(2, 120, 150, 80, 150),
        ];
        let result = pack(&items, 200, 200, &config()).unwrap();

        assert!(result.success);
        assert_eq!(result.num_boxes_used, Some(1));
        assert_eq!(result.outcome, PackingOutcome::Optimal);
        assert_eq!(result.total_shrink(), Some(40));
        assert_valid_packing(&result, &items, 200, 200);
    }

    #[test]
    fn test_equal_shrink_couples_axes() {
        // Width must give up 10 to fit the box; with equal shrink the
        // height follows, landing exactly on its minimum.
        let items = vec![Item::new(1, 100, 50, 80, 40)];
        let result = pack(&items, 90, 90, &config().with_equal_shrink(true)).unwrap();

        assert!(result.success);
        assert_eq!(result.total_shrink(), Some(20));
        let packed: Vec<_> = result.packed_items().collect();
        assert_eq!(packed[0].width, 90);
        assert_eq!(packed[0].height, 40);
        assert_valid_packing(&result, &items, 90, 90);
    }

    #[test]
    fn test_equal_shrink_never_beats_independent() {
        let cases: Vec<(Vec<Item>, i64, i64)> = vec![
            (
                vec![Item::new(1, 60, 60, 40, 40), Item::new(2, 60, 60, 40, 40)],
                100,
                100,
            ),
            (vec![Item::new(1, 100, 50, 80, 40)], 90, 90),
        ];

        for (items, w, h) in cases {
            let independent = pack(&items, w, h, &config()).unwrap();
            let equal = pack(&items, w, h, &config().with_equal_shrink(true)).unwrap();
            assert!(independent.success && equal.success);

            let independent_shrink = independent.total_shrink().unwrap();
            let equal_shrink = equal.total_shrink().unwrap();
            assert!(
                equal_shrink >= independent_shrink,
                "equal shrink {equal_shrink} < independent {independent_shrink}"
            );
        }
    }
}

mod per_box_tests {
    use super::*;

    #[test]
    fn test_per_box_reports_each_box() {
        // Four rigid items, one per box.
        let items = vec![
            Item::rigid(1, 80, 80),
            Item::rigid(2, 80, 80),
            Item::rigid(3, 80, 80),
            Item::rigid(4, 80, 80),
        ];
        let result = pack(&items, 100, 100, &config().with_per_box(true)).unwrap();

        assert!(result.success);
        assert_eq!(result.num_boxes_used, Some(4));
        assert_eq!(result.outcome, PackingOutcome::Optimal);
        assert_eq!(result.packing_results.len(), 4);
        for (box_id, entry) in result.packing_results.iter().enumerate() {
            assert_eq!(entry.box_id, Some(box_id as u64));
            assert!(entry.has_solution());
            assert_eq!(entry.outcome, PackingOutcome::Optimal);
            assert_eq!(entry.packed_items.as_ref().map(|p| p.len()), Some(1));
        }
        assert_valid_packing(&result, &items, 100, 100);
    }

    #[test]
    fn test_per_box_shrink_optimization() {
        let items = vec![Item::new(1, 60, 60, 40, 40), Item::new(2, 60, 60, 40, 40)];
        let result = pack(&items, 100, 100, &config().with_per_box(true)).unwrap();

        assert!(result.success);
        assert_eq!(result.num_boxes_used, Some(1));
        assert_eq!(result.packing_results.len(), 1);
        assert_eq!(result.packing_results[0].box_id, Some(0));
        assert_eq!(result.total_shrink(), Some(20));
        assert_valid_packing(&result, &items, 100, 100);
    }
}

mod determinism_tests {
    use super::*;

    #[test]
    fn test_identical_runs_agree_on_aggregates() {
        let items = vec![Item::new(1, 60, 60, 40, 40), Item::new(2, 60, 60, 40, 40)];

        let first = pack(&items, 100, 100, &config()).unwrap();
        let second = pack(&items, 100, 100, &config()).unwrap();

        assert_eq!(first.num_boxes_used, second.num_boxes_used);
        assert_eq!(first.total_shrink(), second.total_shrink());
        assert_eq!(first.total_shrink(), Some(20));
    }

    #[test]
    fn test_small_catalog_pair() {
        let items = vec![Item::new(1, 60, 60, 50, 50), Item::new(2, 55, 55, 45, 45)];
        let result = pack(&items, 200, 150, &config()).unwrap();

        assert!(result.success);
        assert_eq!(result.num_boxes_used, Some(1));
        assert_eq!(result.total_shrink(), Some(0));
        assert_valid_packing(&result, &items, 200, 150);
    }
}
