//! All-mappings oracle (C8): brute-force reference used only in
//! tests, to check APTED's answer against an exhaustive search on
//! small trees (Testable Property 4).
//!
//! Enumerates every partial injective mapping between the two node
//! sets, keeping only those that preserve ancestor-descendant and
//! sibling-order relations (the defining constraint of a tree edit
//! mapping), and returns the minimum cost over all of them plus
//! deleting/inserting whatever is left unmapped. Exponential in the
//! node count; callers must check [`TedError::ResourceExceeded`]
//! before running it on anything but toy trees.

use crate::ted::cost::CostModel;
use crate::ted::error::TedError;
use crate::ted::indexing::AptedIndex;

/// Upper bound on tree size this oracle is willing to run on. Chosen
/// so a worst-case pair of 7-node trees (our test fixtures) finishes
/// in well under a second; anything bigger is somebody's bug, not a
/// legitimate use of an exponential algorithm.
pub const DEFAULT_NODE_BOUND: usize = 7;

pub fn all_mappings_min_cost<L: Clone + PartialEq, C: CostModel<L>>(
    idx1: &AptedIndex<L>,
    idx2: &AptedIndex<L>,
    cost: &C,
    bound: usize,
) -> Result<f64, TedError> {
    let actual = idx1.size().max(idx2.size());
    if actual > bound {
        return Err(TedError::ResourceExceeded { bound, actual });
    }

    let mut used2 = vec![false; idx2.size()];
    let mut current: Vec<(i32, i32)> = Vec::new();
    let mut best = f64::INFINITY;
    search(0, idx1, idx2, cost, &mut used2, &mut current, &mut best);
    Ok(best)
}

fn is_ancestor<L>(idx: &AptedIndex<L>, a: i32, b: i32) -> bool {
    b >= a && b <= a + idx.prel_to_size_[a as usize] - 1
}

fn is_consistent<L>(
    idx1: &AptedIndex<L>,
    idx2: &AptedIndex<L>,
    x: i32,
    y: i32,
    current: &[(i32, i32)],
) -> bool {
    for &(x2, y2) in current {
        let anc_12 = is_ancestor(idx1, x, x2);
        let anc_21 = is_ancestor(idx1, x2, x);
        let anc_12_g = is_ancestor(idx2, y, y2);
        let anc_21_g = is_ancestor(idx2, y2, y);
        if anc_12 != anc_12_g || anc_21 != anc_21_g {
            return false;
        }
        if (x < x2) != (y < y2) {
            return false;
        }
    }
    true
}

fn total_cost<L: Clone + PartialEq, C: CostModel<L>>(
    idx1: &AptedIndex<L>,
    idx2: &AptedIndex<L>,
    cost: &C,
    mapping: &[(i32, i32)],
) -> f64 {
    let mut mapped1 = vec![false; idx1.size()];
    let mut mapped2 = vec![false; idx2.size()];
    let mut total = 0.0;
    for &(x, y) in mapping {
        mapped1[x as usize] = true;
        mapped2[y as usize] = true;
        total += cost.rename(&idx1.prel_to_label_[x as usize], &idx2.prel_to_label_[y as usize]);
    }
    for (x, was_mapped) in mapped1.iter().enumerate() {
        if !was_mapped {
            total += cost.delete(&idx1.prel_to_label_[x]);
        }
    }
    for (y, was_mapped) in mapped2.iter().enumerate() {
        if !was_mapped {
            total += cost.insert(&idx2.prel_to_label_[y]);
        }
    }
    total
}

fn search<L: Clone + PartialEq, C: CostModel<L>>(
    x1: i32,
    idx1: &AptedIndex<L>,
    idx2: &AptedIndex<L>,
    cost: &C,
    used2: &mut [bool],
    current: &mut Vec<(i32, i32)>,
    best: &mut f64,
) {
    if x1 as usize == idx1.size() {
        let total = total_cost(idx1, idx2, cost, current);
        if total < *best {
            *best = total;
        }
        return;
    }

    search(x1 + 1, idx1, idx2, cost, used2, current, best);

    for y in 0..idx2.size() as i32 {
        if used2[y as usize] {
            continue;
        }
        if is_consistent(idx1, idx2, x1, y, current) {
            used2[y as usize] = true;
            current.push((x1, y));
            search(x1 + 1, idx1, idx2, cost, used2, current, best);
            current.pop();
            used2[y as usize] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{parse_single, LabelDict};
    use crate::ted::cost::{FixedCostModel, UnitCostModel};
    use crate::ted::gted;
    use crate::ted::tree::ArenaNode;

    fn index_bracket(s: &str) -> AptedIndex<i32> {
        let mut ld = LabelDict::new();
        let tree = parse_single(s.to_owned(), &mut ld);
        let root = ArenaNode::root(&tree);
        AptedIndex::index_tree(&root, &UnitCostModel)
    }

    #[test]
    fn oracle_agrees_with_gted_unit_cost() {
        let idx1 = index_bracket("{a{b{e}{f}}{c}{d{g}}}");
        let idx2 = index_bracket("{x{y}{z{w}}}");
        let (d, _) = gted::compute(&idx1, &idx2, &UnitCostModel);
        let apmt = all_mappings_min_cost(&idx1, &idx2, &UnitCostModel, DEFAULT_NODE_BOUND).unwrap();
        assert_eq!(d, apmt);
    }

    #[test]
    fn oracle_agrees_with_gted_fixed_cost() {
        let idx1 = index_bracket("{a{b}{c}}");
        let idx2 = index_bracket("{a{c}{b}}");
        let fixed = FixedCostModel::new(0.4, 0.4, 0.6);
        let (d, _) = gted::compute(&idx1, &idx2, &fixed);
        let apmt = all_mappings_min_cost(&idx1, &idx2, &fixed, DEFAULT_NODE_BOUND).unwrap();
        assert!((d - apmt).abs() < 1e-9);
    }

    #[test]
    fn oracle_rejects_oversized_input() {
        let idx1 = index_bracket("{a{b{e}{f}}{c}{d{g}}}");
        let idx2 = index_bracket("{a{b{e}{f}}{c}{d{g}}}");
        let err = all_mappings_min_cost(&idx1, &idx2, &UnitCostModel, 3).unwrap_err();
        assert!(matches!(err, TedError::ResourceExceeded { bound: 3, .. }));
    }
}
