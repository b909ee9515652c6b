//! Packing model construction.
//!
//! Translates a set of items and a box template into a constraint model
//! whose solutions are valid non-overlapping placements. The geometry and
//! non-overlap encoding are shared by both phases; only the installed
//! objective differs (box-count minimization for Phase 1, shrink
//! minimization for Phase 2).
//!
//! The pairwise non-overlap encoding adds O(n²) disjunctions: for every
//! unordered item pair, at least one of "different boxes", "left of",
//! "right of", "above", or "below" must hold, each expressed as a guarded
//! linear constraint over the half-open separation test (`xi + wi <= xj`
//! and friends, so touching edges are allowed).

use scalepack_core::{Assignment, BoxSpec, Constraint, IntVar, Item, LinExpr, Model, PackedItem};

/// Decision variables introduced for a single item.
#[derive(Debug, Clone, Copy)]
pub struct ItemVars {
    /// Box assignment, in `[0, capacity - 1]`.
    pub box_var: IntVar,
    /// X position of the top-left corner.
    pub x: IntVar,
    /// Y position of the top-left corner.
    pub y: IntVar,
    /// Final width, in `[width_min, width]`.
    pub w: IntVar,
    /// Final height, in `[height_min, height]`.
    pub h: IntVar,
}

/// Builds the shared placement model for the given items and box capacity.
///
/// With `equal_shrink`, each item gets a single shrink variable driving both
/// axes (`w = width - s`, `h = height - s`); otherwise width and height vary
/// independently within their own bounds.
pub fn build_pack_model(
    items: &[Item],
    bx: &BoxSpec,
    capacity: usize,
    equal_shrink: bool,
) -> (Model, Vec<ItemVars>) {
    let mut model = Model::new();
    let item_vars: Vec<ItemVars> = items
        .iter()
        .map(|item| add_item_variables(&mut model, item, bx, capacity, equal_shrink))
        .collect();
    add_non_overlap_constraints(&mut model, &item_vars);
    (model, item_vars)
}

fn add_item_variables(
    model: &mut Model,
    item: &Item,
    bx: &BoxSpec,
    capacity: usize,
    equal_shrink: bool,
) -> ItemVars {
    let box_var = model.new_int_var(0, capacity as i64 - 1);
    let x = model.new_int_var(0, bx.width);
    let y = model.new_int_var(0, bx.height);
    let w = model.new_int_var(item.width_min, item.width);
    let h = model.new_int_var(item.height_min, item.height);

    if equal_shrink {
        let s = model.new_int_var(0, item.max_equal_shrink());
        model.add(Constraint::eq(w, item.width - s));
        model.add(Constraint::eq(h, item.height - s));
    }

    // Keep the item inside the box.
    model.add(Constraint::le(x + w, bx.width));
    model.add(Constraint::le(y + h, bx.height));

    ItemVars { box_var, x, y, w, h }
}

fn add_non_overlap_constraints(model: &mut Model, item_vars: &[ItemVars]) {
    for i in 0..item_vars.len() {
        for j in (i + 1)..item_vars.len() {
            let a = item_vars[i];
            let b = item_vars[j];

            let left = model.new_bool_var();
            let right = model.new_bool_var();
            let below = model.new_bool_var();
            let above = model.new_bool_var();
            let diff_box = model.new_bool_var();

            model.add(Constraint::ne(a.box_var, b.box_var).only_if(diff_box));
            model.add(Constraint::eq(a.box_var, b.box_var).only_if(diff_box.negated()));

            model.add(Constraint::le(a.x + a.w, b.x).only_if(left));
            model.add(Constraint::le(b.x + b.w, a.x).only_if(right));
            model.add(Constraint::le(a.y + a.h, b.y).only_if(below));
            model.add(Constraint::le(b.y + b.h, a.y).only_if(above));

            model.add_bool_or([
                left.into(),
                right.into(),
                below.into(),
                above.into(),
                diff_box.into(),
            ]);
        }
    }
}

/// Installs the Phase 1 objective: minimize the highest used box index.
///
/// Returns the auxiliary variable; its solved value plus one is the minimum
/// number of boxes that can hold all items.
pub fn add_min_boxes_objective(model: &mut Model, item_vars: &[ItemVars]) -> IntVar {
    let max_box_id = model.new_int_var(0, item_vars.len() as i64 - 1);
    for vars in item_vars {
        model.add(Constraint::le(vars.box_var, max_box_id));
    }
    model.minimize(max_box_id);
    max_box_id
}

/// Installs the Phase 2 objective: minimize total size reduction.
pub fn add_min_shrink_objective(model: &mut Model, items: &[Item], item_vars: &[ItemVars]) {
    let total_shrink: LinExpr = items
        .iter()
        .zip(item_vars)
        .map(|(item, vars)| (item.width - vars.w) + (item.height - vars.h))
        .sum();
    model.minimize(total_shrink);
}

/// Returns true if the items can shrink at all.
///
/// When there is no slack, Phase 2 models are solved as pure feasibility
/// problems to save solver effort.
pub fn has_shrink_slack(items: &[Item]) -> bool {
    let total_area: i64 = items.iter().map(Item::area).sum();
    let total_min_area: i64 = items.iter().map(Item::min_area).sum();
    total_area > total_min_area
}

/// Reads placements out of a solved assignment.
///
/// Returns the packed items and their total shrink.
pub fn extract_packed_items(
    items: &[Item],
    item_vars: &[ItemVars],
    assignment: &Assignment,
) -> (Vec<PackedItem>, i64) {
    let mut packed = Vec::with_capacity(items.len());
    let mut total_shrink = 0;
    for (item, vars) in items.iter().zip(item_vars) {
        let width = assignment.value(vars.w);
        let height = assignment.value(vars.h);
        total_shrink += (item.width - width) + (item.height - height);
        packed.push(PackedItem {
            id: item.id,
            x: assignment.value(vars.x),
            y: assignment.value(vars.y),
            width,
            height,
            box_id: assignment.value(vars.box_var) as u64,
        });
    }
    (packed, total_shrink)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_items() -> Vec<Item> {
        vec![Item::new(1, 100, 50, 80, 40), Item::new(2, 60, 80, 50, 70)]
    }

    #[test]
    fn test_variable_counts() {
        let bx = BoxSpec::new(0, 200, 200);
        let items = sample_items();

        // Independent shrink: 5 int vars per item, 5 bools per pair.
        let (model, vars) = build_pack_model(&items, &bx, items.len(), false);
        assert_eq!(vars.len(), 2);
        assert_eq!(model.num_vars(), 2 * 5 + 5);
        assert_eq!(model.disjunctions().len(), 1);

        // Equal shrink adds one shrink variable per item.
        let (model, _) = build_pack_model(&items, &bx, items.len(), true);
        assert_eq!(model.num_vars(), 2 * 6 + 5);
    }

    #[test]
    fn test_variable_bounds() {
        let bx = BoxSpec::new(0, 200, 150);
        let items = sample_items();
        let (model, vars) = build_pack_model(&items, &bx, items.len(), false);

        let v = vars[0];
        assert_eq!(model.var_bounds(v.box_var.index()), (0, 1));
        assert_eq!(model.var_bounds(v.x.index()), (0, 200));
        assert_eq!(model.var_bounds(v.y.index()), (0, 150));
        assert_eq!(model.var_bounds(v.w.index()), (80, 100));
        assert_eq!(model.var_bounds(v.h.index()), (40, 50));
    }

    #[test]
    fn test_equal_shrink_bounds() {
        let bx = BoxSpec::new(0, 200, 200);
        // Slack is 20 on width and 10 on height: shared shrink caps at 10.
        let items = vec![Item::new(1, 100, 50, 80, 40)];
        let (model, _) = build_pack_model(&items, &bx, 1, true);

        let shrink_index = model.num_vars() - 1;
        assert!(!model.is_bool_var(shrink_index));
        assert_eq!(model.var_bounds(shrink_index), (0, 10));
    }

    #[test]
    fn test_shrink_slack() {
        assert!(has_shrink_slack(&sample_items()));
        assert!(!has_shrink_slack(&[
            Item::rigid(1, 30, 30),
            Item::rigid(2, 40, 20)
        ]));
    }

    #[test]
    fn test_min_boxes_objective_bounds() {
        let bx = BoxSpec::new(0, 200, 200);
        let items = sample_items();
        let (mut model, vars) = build_pack_model(&items, &bx, items.len(), false);
        let max_box_id = add_min_boxes_objective(&mut model, &vars);

        assert_eq!(model.var_bounds(max_box_id.index()), (0, 1));
        assert!(model.objective().is_some());
    }

    #[test]
    fn test_extract_packed_items() {
        let bx = BoxSpec::new(0, 200, 200);
        let items = sample_items();
        let (model, vars) = build_pack_model(&items, &bx, items.len(), false);

        // Fabricate an assignment: every variable at its lower bound.
        let values: Vec<i64> = (0..model.num_vars())
            .map(|v| model.var_bounds(v).0)
            .collect();
        let assignment = Assignment::from_values(values);

        let (packed, total_shrink) = extract_packed_items(&items, &vars, &assignment);
        assert_eq!(packed.len(), 2);
        assert_eq!(packed[0].id, 1);
        assert_eq!(packed[0].width, 80);
        assert_eq!(packed[0].height, 40);
        // Both items at minimum size: (20 + 10) + (10 + 10).
        assert_eq!(total_shrink, 50);
    }
}
