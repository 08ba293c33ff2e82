//! Edit operation cost models.
//!
//! Every cost is a non-negative `f64`. [`CostModel`] is generic over
//! the label type so it composes with any [`crate::ted::tree::TreeNode`]
//! impl, not just [`crate::parsing::LabelId`].

/// Assigns a cost to each of the three edit operations APTED
/// considers: delete a node, insert a node, rename (relabel) a node.
///
/// A rename from a label to itself should normally cost `0.0`, but
/// this is a convention the implementor opts into, not something the
/// algorithm enforces — see [`FixedCostModel`] for the common case
/// and [`UnitCostModel`] for the textbook one.
pub trait CostModel<L> {
    fn delete(&self, label: &L) -> f64;
    fn insert(&self, label: &L) -> f64;
    fn rename(&self, from: &L, to: &L) -> f64;
}

/// Every operation costs exactly `1.0`, except renaming a label to
/// itself, which is always free. This is the cost model used by the
/// classic Zhang-Shasha and APTED papers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitCostModel;

impl<L: PartialEq> CostModel<L> for UnitCostModel {
    fn delete(&self, _label: &L) -> f64 {
        1.0
    }

    fn insert(&self, _label: &L) -> f64 {
        1.0
    }

    fn rename(&self, from: &L, to: &L) -> f64 {
        if from == to {
            0.0
        } else {
            1.0
        }
    }
}

/// Delete, insert and rename each carry their own fixed cost.
/// Renaming a label to itself is still always free, matching
/// [`UnitCostModel`]; callers who need no-op renames to cost
/// something should implement [`CostModel`] directly.
///
/// Costs need not satisfy the triangle inequality; APTED does not
/// depend on it, and enforcing it here would reject legitimate
/// asymmetric cost setups, so it is left as the caller's
/// responsibility.
#[derive(Debug, Clone, Copy)]
pub struct FixedCostModel {
    pub delete_cost: f64,
    pub insert_cost: f64,
    pub rename_cost: f64,
}

impl FixedCostModel {
    pub fn new(delete_cost: f64, insert_cost: f64, rename_cost: f64) -> Self {
        Self {
            delete_cost,
            insert_cost,
            rename_cost,
        }
    }
}

impl<L: PartialEq> CostModel<L> for FixedCostModel {
    fn delete(&self, _label: &L) -> f64 {
        self.delete_cost
    }

    fn insert(&self, _label: &L) -> f64 {
        self.insert_cost
    }

    fn rename(&self, from: &L, to: &L) -> f64 {
        if from == to {
            0.0
        } else {
            self.rename_cost
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_cost_rename_is_free_for_equal_labels() {
        let m = UnitCostModel;
        assert_eq!(CostModel::<i32>::rename(&m, &1, &1), 0.0);
        assert_eq!(CostModel::<i32>::rename(&m, &1, &2), 1.0);
        assert_eq!(m.delete(&1), 1.0);
        assert_eq!(m.insert(&1), 1.0);
    }

    #[test]
    fn fixed_cost_uses_configured_values() {
        let m = FixedCostModel::new(0.4, 0.4, 0.6);
        assert_eq!(m.delete(&"a"), 0.4);
        assert_eq!(m.insert(&"a"), 0.4);
        assert_eq!(m.rename(&"a", &"b"), 0.6);
        assert_eq!(m.rename(&"a", &"a"), 0.0);
    }
}
