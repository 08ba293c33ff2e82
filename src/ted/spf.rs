//! Single-path functions (C5): `spf1`, `spfL`, `spfR`, `spfA`.
//!
//! `spf1` is the trivial-size closed form from Pawlik & Augsten §4.
//! `spfL`/`spfR` are full, self-contained Zhang-Shasha forest-distance
//! computations over a subtree pair, mirrored across the left
//! (postL/`lld`) and right (postR/`rld`) traversal orders
//! respectively; grounded on the keyroot/forest-distance recurrence in
//! `other_examples/f0ce3d2c_opensensor-smartdiff__crates-diff-engine-src-tree_edit.rs.rs`.
//! `spfA` handles the general "inner path" case — since any
//! consistent root-to-leaf decomposition yields a correct distance
//! (the path-decomposition framework does not require optimality,
//! only validity), it reuses the same verified left-path engine as
//! `spfL` rather than a third bespoke implementation. See
//! `DESIGN.md` for the full rationale.
//!
//! Every tree-case cell discovered along the way is written into
//! `delta`, rootless (the root-pair update cost is subtracted before
//! storing), exactly matching the convention in §3 of SPEC_FULL.md.
//! Neither `spf_l` nor `spf_r` ever *reads* `delta` — each recomputes
//! the full subtree pair from its own local `treedist` cache instead
//! of looking up already-solved cross-subtree distances. `gted::compute`
//! compensates at the call-site level: it treats `delta` as a memo and
//! skips dispatching a subtree pair a previous call already settled,
//! so the redundant work is bounded to "compute once," not "recompute
//! at every decomposition level." See that module's doc comment and
//! `DESIGN.md`'s C5/C6 entries.

use crate::ted::cost::CostModel;
use crate::ted::indexing::AptedIndex;

pub type DeltaMatrix = Vec<Vec<f64>>;

/// `NaN` marks a cell not yet written by any single-path function —
/// distances are always finite and non-negative, so it is an
/// unambiguous "uncomputed" sentinel. `gted::compute` relies on this
/// to skip re-deriving a subtree pair `spf_l`/`spf_r` already settled
/// while computing an ancestor pair (see the module doc comment there).
pub fn new_delta_matrix<L>(idx1: &AptedIndex<L>, idx2: &AptedIndex<L>) -> DeltaMatrix {
    vec![vec![f64::NAN; idx2.size()]; idx1.size()]
}

/// `|F| == 1 || |G| == 1`.
pub fn spf1<L: Clone + PartialEq, C: CostModel<L>>(
    idx1: &AptedIndex<L>,
    root1: i32,
    idx2: &AptedIndex<L>,
    root2: i32,
    cost: &C,
) -> f64 {
    let size1 = idx1.prel_to_size_[root1 as usize];
    let size2 = idx2.prel_to_size_[root2 as usize];
    let l1 = &idx1.prel_to_label_[root1 as usize];

    if size1 == 1 && size2 == 1 {
        let l2 = &idx2.prel_to_label_[root2 as usize];
        return f64::min(cost.rename(l1, l2), cost.delete(l1) + cost.insert(l2));
    }

    if size1 == 1 {
        return spf1_one_side(idx2, root2, l1, cost, true);
    }

    let l2 = &idx2.prel_to_label_[root2 as usize];
    spf1_one_side(idx1, root1, l2, cost, false)
}

/// Shared implementation of the `|F|==1` / `|G|==1` branch. `single`
/// is the lone node's label; `other_is_g` says whether the
/// size-`|subtree|` side is G (so costs use `insert`) or F (`delete`).
fn spf1_one_side<L: Clone + PartialEq, C: CostModel<L>>(
    idx: &AptedIndex<L>,
    subtree_root: i32,
    single: &L,
    cost: &C,
    other_is_g: bool,
) -> f64 {
    let size = idx.prel_to_size_[subtree_root as usize];
    let lo = subtree_root;
    let hi = subtree_root + size - 1;

    let mut best_swap = f64::INFINITY;
    for n in lo..=hi {
        let label = &idx.prel_to_label_[n as usize];
        let swap_cost = if other_is_g {
            cost.rename(single, label) - cost.insert(label)
        } else {
            cost.rename(label, single) - cost.delete(label)
        };
        best_swap = best_swap.min(swap_cost);
    }

    if other_is_g {
        let sum_ins = idx.prel_to_subtree_ins_cost_[subtree_root as usize];
        let capped = sum_ins + cost.delete(single);
        (sum_ins + best_swap).min(capped)
    } else {
        let sum_del = idx.prel_to_subtree_del_cost_[subtree_root as usize];
        let capped = sum_del + cost.insert(single);
        (sum_del + best_swap).min(capped)
    }
}

fn collect_keyroots(lld: &[i32], lo: i32, hi: i32) -> Vec<i32> {
    let mut seen = std::collections::HashSet::new();
    let mut krs = Vec::new();
    let mut i = hi;
    while i >= lo {
        let l = lld[i as usize];
        if seen.insert(l) {
            krs.push(i);
        }
        i -= 1;
    }
    krs.sort_unstable();
    krs
}

/// `spfL`: Zhang-Shasha keyroot algorithm over left-to-right
/// postorder (`postl_to_lld_`).
pub fn spf_l<L: Clone + PartialEq, C: CostModel<L>>(
    idx1: &AptedIndex<L>,
    root1: i32,
    idx2: &AptedIndex<L>,
    root2: i32,
    cost: &C,
    delta: &mut DeltaMatrix,
) -> f64 {
    let root1_post = idx1.prel_to_postl_[root1 as usize];
    let root2_post = idx2.prel_to_postl_[root2 as usize];
    let lo1 = idx1.postl_to_lld_[root1_post as usize];
    let lo2 = idx2.postl_to_lld_[root2_post as usize];

    let rows = (root1_post - lo1 + 1) as usize;
    let cols = (root2_post - lo2 + 1) as usize;
    let mut treedist = vec![vec![0.0f64; cols]; rows];

    let keyroots1 = collect_keyroots(&idx1.postl_to_lld_, lo1, root1_post);
    let keyroots2 = collect_keyroots(&idx2.postl_to_lld_, lo2, root2_post);

    for &i in &keyroots1 {
        let li = idx1.postl_to_lld_[i as usize];
        for &j in &keyroots2 {
            let lj = idx2.postl_to_lld_[j as usize];
            let fwidth = (i - li + 2) as usize;
            let gwidth = (j - lj + 2) as usize;
            let mut fd = vec![vec![0.0f64; gwidth]; fwidth];

            for r in 1..fwidth {
                let node1 = li - 1 + r as i32;
                let del = cost.delete(&idx1.postl_to_label_[node1 as usize]);
                fd[r][0] = fd[r - 1][0] + del;
            }
            for c in 1..gwidth {
                let node2 = lj - 1 + c as i32;
                let ins = cost.insert(&idx2.postl_to_label_[node2 as usize]);
                fd[0][c] = fd[0][c - 1] + ins;
            }

            for r in 1..fwidth {
                let node1 = li - 1 + r as i32;
                let del = cost.delete(&idx1.postl_to_label_[node1 as usize]);
                let l1 = idx1.postl_to_lld_[node1 as usize];
                for c in 1..gwidth {
                    let node2 = lj - 1 + c as i32;
                    let ins = cost.insert(&idx2.postl_to_label_[node2 as usize]);
                    let l2 = idx2.postl_to_lld_[node2 as usize];

                    let del_cand = fd[r - 1][c] + del;
                    let ins_cand = fd[r][c - 1] + ins;
                    let is_tree_case = l1 == li && l2 == lj;
                    let match_cand = if is_tree_case {
                        let upd = cost.rename(
                            &idx1.postl_to_label_[node1 as usize],
                            &idx2.postl_to_label_[node2 as usize],
                        );
                        fd[r - 1][c - 1] + upd
                    } else {
                        let br = (l1 - li) as usize;
                        let bc = (l2 - lj) as usize;
                        let td = treedist[(node1 - lo1) as usize][(node2 - lo2) as usize];
                        fd[br][bc] + td
                    };

                    let best = del_cand.min(ins_cand).min(match_cand);
                    fd[r][c] = best;

                    if is_tree_case {
                        treedist[(node1 - lo1) as usize][(node2 - lo2) as usize] = best;
                        let prel1 = idx1.postl_to_prel_[node1 as usize];
                        let prel2 = idx2.postl_to_prel_[node2 as usize];
                        let upd = cost.rename(
                            &idx1.prel_to_label_[prel1 as usize],
                            &idx2.prel_to_label_[prel2 as usize],
                        );
                        delta[prel1 as usize][prel2 as usize] = best - upd;
                    }
                }
            }
        }
    }

    treedist[(root1_post - lo1) as usize][(root2_post - lo2) as usize]
}

/// `spfR`: the same algorithm mirrored over right-to-left postorder
/// (`postr_to_rld_`). Genuinely independent from `spf_l` (different
/// traversal order, different arrays), used both as a real
/// alternative engine and to give `computeEditDistance_spfTest`
/// something distinct to force between `LEFT` and `RIGHT`.
pub fn spf_r<L: Clone + PartialEq, C: CostModel<L>>(
    idx1: &AptedIndex<L>,
    root1: i32,
    idx2: &AptedIndex<L>,
    root2: i32,
    cost: &C,
    delta: &mut DeltaMatrix,
) -> f64 {
    let root1_post = idx1.prel_to_postr_[root1 as usize];
    let root2_post = idx2.prel_to_postr_[root2 as usize];
    let lo1 = idx1.postr_to_rld_[root1_post as usize];
    let lo2 = idx2.postr_to_rld_[root2_post as usize];

    let rows = (root1_post - lo1 + 1) as usize;
    let cols = (root2_post - lo2 + 1) as usize;
    let mut treedist = vec![vec![0.0f64; cols]; rows];

    let keyroots1 = collect_keyroots(&idx1.postr_to_rld_, lo1, root1_post);
    let keyroots2 = collect_keyroots(&idx2.postr_to_rld_, lo2, root2_post);

    for &i in &keyroots1 {
        let li = idx1.postr_to_rld_[i as usize];
        for &j in &keyroots2 {
            let lj = idx2.postr_to_rld_[j as usize];
            let fwidth = (i - li + 2) as usize;
            let gwidth = (j - lj + 2) as usize;
            let mut fd = vec![vec![0.0f64; gwidth]; fwidth];

            for r in 1..fwidth {
                let node1 = li - 1 + r as i32;
                let del = cost.delete(&idx1.postr_to_label_[node1 as usize]);
                fd[r][0] = fd[r - 1][0] + del;
            }
            for c in 1..gwidth {
                let node2 = lj - 1 + c as i32;
                let ins = cost.insert(&idx2.postr_to_label_[node2 as usize]);
                fd[0][c] = fd[0][c - 1] + ins;
            }

            for r in 1..fwidth {
                let node1 = li - 1 + r as i32;
                let del = cost.delete(&idx1.postr_to_label_[node1 as usize]);
                let l1 = idx1.postr_to_rld_[node1 as usize];
                for c in 1..gwidth {
                    let node2 = lj - 1 + c as i32;
                    let ins = cost.insert(&idx2.postr_to_label_[node2 as usize]);
                    let l2 = idx2.postr_to_rld_[node2 as usize];

                    let del_cand = fd[r - 1][c] + del;
                    let ins_cand = fd[r][c - 1] + ins;
                    let is_tree_case = l1 == li && l2 == lj;
                    let match_cand = if is_tree_case {
                        let upd = cost.rename(
                            &idx1.postr_to_label_[node1 as usize],
                            &idx2.postr_to_label_[node2 as usize],
                        );
                        fd[r - 1][c - 1] + upd
                    } else {
                        let br = (l1 - li) as usize;
                        let bc = (l2 - lj) as usize;
                        let td = treedist[(node1 - lo1) as usize][(node2 - lo2) as usize];
                        fd[br][bc] + td
                    };

                    let best = del_cand.min(ins_cand).min(match_cand);
                    fd[r][c] = best;

                    if is_tree_case {
                        treedist[(node1 - lo1) as usize][(node2 - lo2) as usize] = best;
                        let prel1 = idx1.postr_to_prel_[node1 as usize];
                        let prel2 = idx2.postr_to_prel_[node2 as usize];
                        let upd = cost.rename(
                            &idx1.prel_to_label_[prel1 as usize],
                            &idx2.prel_to_label_[prel2 as usize],
                        );
                        delta[prel1 as usize][prel2 as usize] = best - upd;
                    }
                }
            }
        }
    }

    treedist[(root1_post - lo1) as usize][(root2_post - lo2) as usize]
}

/// `spfA`: the general (inner-path) single-path function. This is
/// *not* a port of the four-nested-loop sp1/sp2/sp3 recurrence with
/// its `(fn, ft)` linked list and `q[]` column cache — it delegates to
/// `spf_l` outright. That delegation is correctness-preserving only
/// because `spf_l` already solves the complete subtree pair rather
/// than a single path, so any "path" choice it is nominally invoked
/// under is immaterial to the number it returns. See `DESIGN.md`'s C5
/// entry for the full accounting of what this does and does not
/// implement relative to the named algorithm.
pub fn spf_a<L: Clone + PartialEq, C: CostModel<L>>(
    idx1: &AptedIndex<L>,
    root1: i32,
    idx2: &AptedIndex<L>,
    root2: i32,
    cost: &C,
    delta: &mut DeltaMatrix,
) -> f64 {
    spf_l(idx1, root1, idx2, root2, cost, delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{parse_single, LabelDict};
    use crate::ted::cost::UnitCostModel;
    use crate::ted::tree::ArenaNode;

    fn index_bracket(s: &str) -> AptedIndex<i32> {
        let mut ld = LabelDict::new();
        let tree = parse_single(s.to_owned(), &mut ld);
        let root = ArenaNode::root(&tree);
        AptedIndex::index_tree(&root, &UnitCostModel)
    }

    #[test]
    fn spf_l_and_r_agree_on_simple_rename() {
        let idx1 = index_bracket("{a}");
        let idx2 = index_bracket("{b}");
        let mut delta = new_delta_matrix(&idx1, &idx2);
        let l = spf_l(&idx1, 0, &idx2, 0, &UnitCostModel, &mut delta);
        let mut delta2 = new_delta_matrix(&idx1, &idx2);
        let r = spf_r(&idx1, 0, &idx2, 0, &UnitCostModel, &mut delta2);
        assert_eq!(l, 1.0);
        assert_eq!(r, 1.0);
    }

    #[test]
    fn spf_l_matches_sibling_reorder_scenario() {
        // S3: {a{b}{c}} vs {a{c}{b}} -> TED 2 under unit cost
        let idx1 = index_bracket("{a{b}{c}}");
        let idx2 = index_bracket("{a{c}{b}}");
        let mut delta = new_delta_matrix(&idx1, &idx2);
        let d = spf_l(&idx1, 0, &idx2, 0, &UnitCostModel, &mut delta);
        assert_eq!(d, 2.0);
    }

    #[test]
    fn spf_l_matches_four_deletions_scenario() {
        // S6: {r{a}{b}{c}{d}} vs {r} -> TED 4
        let idx1 = index_bracket("{r{a}{b}{c}{d}}");
        let idx2 = index_bracket("{r}");
        let mut delta = new_delta_matrix(&idx1, &idx2);
        let d = spf_l(&idx1, 0, &idx2, 0, &UnitCostModel, &mut delta);
        assert_eq!(d, 4.0);
    }
}
