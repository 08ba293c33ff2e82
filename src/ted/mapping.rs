//! Mapping extractor (C7): backtraces the `delta` matrix filled in by
//! [`super::gted`]/[`super::spf`] into an explicit edit mapping.
//!
//! Grounded on the Zhang-Shasha forest-distance backtrace in
//! SPEC_FULL.md §4.6. Since the single-path engine in [`super::spf`]
//! already populates `delta` for every `(x, y)` subtree pair (not
//! just a pruned APTED-optimal subset — see that module's doc
//! comment), each popped `(i, j)` task here can read `delta` directly
//! wherever the recurrence needs a previously-solved subtree
//! distance, without needing extra bookkeeping for which pairs were
//! "actually visited" by the forward pass.

use crate::ted::cost::CostModel;
use crate::ted::indexing::AptedIndex;
use crate::ted::spf::DeltaMatrix;

/// One step taken while tracing the forest-distance table backwards.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Step {
    Delete,
    Insert,
    Match,
    Jump,
}

/// `(postL1, postL2)`, 1-based; `0` in either slot means "no
/// counterpart" (insert when the first is `0`, delete when the
/// second is `0`).
pub type MappingPair = (usize, usize);

#[derive(Debug, Clone, Default)]
pub struct EditMapping {
    pub pairs: Vec<MappingPair>,
}

pub enum EditOperation<L> {
    Delete { postl1: usize, label: L },
    Insert { postl2: usize, label: L },
    Update {
        postl1: usize,
        postl2: usize,
        from: L,
        to: L,
    },
}

/// Produced-to capability: an external sink for the three edit
/// operations.
pub trait OperationExecutor<L> {
    fn delete(&mut self, node: &L);
    fn insert(&mut self, node: &L);
    fn update(&mut self, from: &L, to: &L);
}

/// Builds the local forest-distance table and per-cell predecessor
/// choice for one `(i, j)` postL subtree pair, reading `delta` for
/// any cell that crosses into a different subtree pair.
fn build_table<L: Clone + PartialEq, C: CostModel<L>>(
    idx1: &AptedIndex<L>,
    i: i32,
    idx2: &AptedIndex<L>,
    j: i32,
    cost: &C,
    delta: &DeltaMatrix,
) -> (Vec<Vec<f64>>, Vec<Vec<Step>>, i32, i32) {
    let li = idx1.postl_to_lld_[i as usize];
    let lj = idx2.postl_to_lld_[j as usize];
    let fwidth = (i - li + 2) as usize;
    let gwidth = (j - lj + 2) as usize;
    let mut fd = vec![vec![0.0f64; gwidth]; fwidth];
    let mut step = vec![vec![Step::Match; gwidth]; fwidth];

    for r in 1..fwidth {
        let node1 = li - 1 + r as i32;
        let del = cost.delete(&idx1.postl_to_label_[node1 as usize]);
        fd[r][0] = fd[r - 1][0] + del;
        step[r][0] = Step::Delete;
    }
    for c in 1..gwidth {
        let node2 = lj - 1 + c as i32;
        let ins = cost.insert(&idx2.postl_to_label_[node2 as usize]);
        fd[0][c] = fd[0][c - 1] + ins;
        step[0][c] = Step::Insert;
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
                let prel1 = idx1.postl_to_prel_[node1 as usize];
                let prel2 = idx2.postl_to_prel_[node2 as usize];
                let upd = cost.rename(
                    &idx1.prel_to_label_[prel1 as usize],
                    &idx2.prel_to_label_[prel2 as usize],
                );
                let treeval = delta[prel1 as usize][prel2 as usize] + upd;
                let br = (l1 - li) as usize;
                let bc = (l2 - lj) as usize;
                fd[br][bc] + treeval
            };

            // Prefer delete, then insert, then match/jump, matching
            // the bullet order in SPEC_FULL.md §4.6.
            if del_cand <= ins_cand && del_cand <= match_cand {
                fd[r][c] = del_cand;
                step[r][c] = Step::Delete;
            } else if ins_cand <= match_cand {
                fd[r][c] = ins_cand;
                step[r][c] = Step::Insert;
            } else {
                fd[r][c] = match_cand;
                step[r][c] = if is_tree_case { Step::Match } else { Step::Jump };
            }
        }
    }

    (fd, step, li, lj)
}

/// Backtraces `delta` into the full edit mapping between the two
/// whole trees.
pub fn extract_mapping<L: Clone + PartialEq, C: CostModel<L>>(
    idx1: &AptedIndex<L>,
    idx2: &AptedIndex<L>,
    cost: &C,
    delta: &DeltaMatrix,
) -> EditMapping {
    let mut pairs = Vec::new();
    let root1_postl = (idx1.size() - 1) as i32;
    let root2_postl = (idx2.size() - 1) as i32;
    let mut stack: Vec<(i32, i32)> = vec![(root1_postl, root2_postl)];

    while let Some((i, j)) = stack.pop() {
        let (_fd, step, li, lj) = build_table(idx1, i, idx2, j, cost, delta);
        let mut row = (i - li + 1) as usize;
        let mut col = (j - lj + 1) as usize;

        loop {
            match step[row][col] {
                Step::Delete => {
                    let node1 = li - 1 + row as i32;
                    pairs.push(((node1 + 1) as usize, 0usize));
                    row -= 1;
                }
                Step::Insert => {
                    let node2 = lj - 1 + col as i32;
                    pairs.push((0usize, (node2 + 1) as usize));
                    col -= 1;
                }
                Step::Match => {
                    let node1 = li - 1 + row as i32;
                    let node2 = lj - 1 + col as i32;
                    pairs.push(((node1 + 1) as usize, (node2 + 1) as usize));
                    row -= 1;
                    col -= 1;
                }
                Step::Jump => {
                    let node1 = li - 1 + row as i32;
                    let node2 = lj - 1 + col as i32;
                    stack.push((node1, node2));
                    let l1 = idx1.postl_to_lld_[node1 as usize];
                    let l2 = idx2.postl_to_lld_[node2 as usize];
                    row = (l1 - li) as usize;
                    col = (l2 - lj) as usize;
                }
            }
            if row == 0 && col == 0 {
                break;
            }
        }
    }

    pairs.reverse();
    EditMapping { pairs }
}

pub fn mapping_cost<L: Clone + PartialEq, C: CostModel<L>>(
    mapping: &EditMapping,
    idx1: &AptedIndex<L>,
    idx2: &AptedIndex<L>,
    cost: &C,
) -> f64 {
    mapping
        .pairs
        .iter()
        .map(|&(p1, p2)| match (p1, p2) {
            (0, p2) => cost.insert(&idx2.postl_to_label_[p2 - 1]),
            (p1, 0) => cost.delete(&idx1.postl_to_label_[p1 - 1]),
            (p1, p2) => cost.rename(&idx1.postl_to_label_[p1 - 1], &idx2.postl_to_label_[p2 - 1]),
        })
        .sum()
}

pub fn to_operations<L: Clone>(
    mapping: &EditMapping,
    idx1: &AptedIndex<L>,
    idx2: &AptedIndex<L>,
) -> Vec<EditOperation<L>> {
    mapping
        .pairs
        .iter()
        .map(|&(p1, p2)| match (p1, p2) {
            (0, p2) => EditOperation::Insert {
                postl2: p2,
                label: idx2.postl_to_label_[p2 - 1].clone(),
            },
            (p1, 0) => EditOperation::Delete {
                postl1: p1,
                label: idx1.postl_to_label_[p1 - 1].clone(),
            },
            (p1, p2) => EditOperation::Update {
                postl1: p1,
                postl2: p2,
                from: idx1.postl_to_label_[p1 - 1].clone(),
                to: idx2.postl_to_label_[p2 - 1].clone(),
            },
        })
        .collect()
}

pub fn execute_operations<L, E: OperationExecutor<L>>(ops: &[EditOperation<L>], executor: &mut E) {
    for op in ops {
        match op {
            EditOperation::Delete { label, .. } => executor.delete(label),
            EditOperation::Insert { label, .. } => executor.insert(label),
            EditOperation::Update { from, to, .. } => executor.update(from, to),
        }
    }
}

pub fn execute_operations_in_reverse<L, E: OperationExecutor<L>>(
    ops: &[EditOperation<L>],
    executor: &mut E,
) {
    for op in ops.iter().rev() {
        match op {
            EditOperation::Delete { label, .. } => executor.delete(label),
            EditOperation::Insert { label, .. } => executor.insert(label),
            EditOperation::Update { from, to, .. } => executor.update(from, to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{parse_single, LabelDict};
    use crate::ted::cost::UnitCostModel;
    use crate::ted::gted;
    use crate::ted::tree::ArenaNode;

    fn index_bracket(s: &str) -> AptedIndex<i32> {
        let mut ld = LabelDict::new();
        let tree = parse_single(s.to_owned(), &mut ld);
        let root = ArenaNode::root(&tree);
        AptedIndex::index_tree(&root, &UnitCostModel)
    }

    #[test]
    fn mapping_cost_matches_distance() {
        let idx1 = index_bracket("{a{b}{c}}");
        let idx2 = index_bracket("{a{c}{b}}");
        let (d, delta) = gted::compute(&idx1, &idx2, &UnitCostModel);
        let mapping = extract_mapping(&idx1, &idx2, &UnitCostModel, &delta);
        let c = mapping_cost(&mapping, &idx1, &idx2, &UnitCostModel);
        assert_eq!(c, d);
    }

    #[test]
    fn mapping_cost_matches_distance_on_deletions() {
        let idx1 = index_bracket("{r{a}{b}{c}{d}}");
        let idx2 = index_bracket("{r}");
        let (d, delta) = gted::compute(&idx1, &idx2, &UnitCostModel);
        let mapping = extract_mapping(&idx1, &idx2, &UnitCostModel, &delta);
        let c = mapping_cost(&mapping, &idx1, &idx2, &UnitCostModel);
        assert_eq!(c, d);
    }

    struct RecordingExecutor {
        log: Vec<String>,
    }
    impl OperationExecutor<i32> for RecordingExecutor {
        fn delete(&mut self, node: &i32) {
            self.log.push(format!("delete({node})"));
        }
        fn insert(&mut self, node: &i32) {
            self.log.push(format!("insert({node})"));
        }
        fn update(&mut self, from: &i32, to: &i32) {
            self.log.push(format!("update({from},{to})"));
        }
    }

    #[test]
    fn execute_operations_reverse_is_literal_reverse() {
        let idx1 = index_bracket("{r{a}{b}}");
        let idx2 = index_bracket("{r}");
        let (_, delta) = gted::compute(&idx1, &idx2, &UnitCostModel);
        let mapping = extract_mapping(&idx1, &idx2, &UnitCostModel, &delta);
        let ops = to_operations(&mapping, &idx1, &idx2);

        let mut fwd = RecordingExecutor { log: Vec::new() };
        execute_operations(&ops, &mut fwd);
        let mut rev = RecordingExecutor { log: Vec::new() };
        execute_operations_in_reverse(&ops, &mut rev);

        let mut expected_rev = fwd.log.clone();
        expected_rev.reverse();
        assert_eq!(rev.log, expected_rev);
    }
}
