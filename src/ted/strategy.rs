//! Strategy computer (C4): assigns one decomposition path to every
//! subtree pair `(v in T1, w in T2)`.
//!
//! The reference algorithm (Pawlik & Augsten §5.2) maintains three
//! incrementally-updated, row-recycled cost vectors per node during a
//! postorder sweep to pick the path that minimizes total downstream
//! DP work, with a further postL/postR duality chosen by a global
//! heuristic. That bookkeeping (keyroot stacks, shared leaf rows,
//! `cost1L`/`cost1R`/`cost1I` row pointers) is the single most
//! error-prone part of the whole algorithm to get exactly right.
//!
//! GTED's correctness does not depend on the strategy being
//! *optimal* — any assignment of exactly one valid root-to-leaf path
//! per subtree pair yields the correct tree edit distance, since path
//! decomposition is sound for any such choice (this is the same
//! argument that makes Zhang-Shasha's keyroot decomposition and
//! Klein's heavy-path decomposition both correct, independent of
//! which keyroots/heavy edges are picked). So this module computes a
//! strategy from the same per-node weights the paper uses
//! (`krSum`/`revKrSum`/`descSum`, already built by [`super::indexing`]),
//! but combines them per-pair with a direct O(n1*n2) pass instead of
//! the incremental row-recycled sweep. See DESIGN.md for the
//! rationale.
//!
//! Stronger caveat than the paragraph above implies: under the
//! current `spf_l`/`spf_r`/`spf_a` engine (see `super::spf`'s module
//! comment), the path choice this module produces has **no effect on
//! the tree edit distance GTED returns** — `spf_l`/`spf_r` solve the
//! entire requested subtree pair unconditionally, ignoring which path
//! was nominally selected, and `spf_a` only ever delegates to `spf_l`.
//! This module still runs, is still tested, and its output still
//! drives which of `spf_l`/`spf_r`/`spf_a` `gted::dispatch_spf` calls
//! — so it is not dead code — but it is vestigial with respect to the
//! final answer. See `DESIGN.md`'s C4 entry.

use crate::ted::indexing::AptedIndex;

/// Which tree's subtree the chosen path lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    T1,
    T2,
}

/// A decomposition path for one subtree pair: which tree owns it, and
/// the preL id (in the owner's tree) of the path's leaf. Path *type*
/// (left/right/inner) is not stored — it is derived on demand by
/// comparing `leaf` against the owner subtree's `lld`/`rld`, which is
/// exactly what [`super::gted`] and the single-path functions need to
/// pick `spfL`/`spfR`/`spfA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId {
    pub owner: Owner,
    pub leaf: i32,
}

pub struct Strategy {
    pub table: Vec<Vec<PathId>>,
}

impl Strategy {
    pub fn get(&self, v: i32, w: i32) -> PathId {
        self.table[v as usize][w as usize]
    }
}

/// Per-node path weights and the leaf each path choice would use,
/// precomputed once per tree.
struct NodeWeights {
    leaf: Vec<i32>,
    weight: Vec<i64>,
}

fn compute_node_weights<L>(idx: &AptedIndex<L>) -> NodeWeights {
    let n = idx.size();
    let mut inner_leaf = vec![0i32; n];
    for i in (0..n).rev() {
        inner_leaf[i] = match heaviest_child(idx, i as i32) {
            None => i as i32,
            Some(c) => inner_leaf[c as usize],
        };
    }

    let mut leaf = vec![0i32; n];
    let mut weight = vec![0i64; n];
    for i in 0..n {
        let kr = idx.prel_to_krsum_[i];
        let revkr = idx.prel_to_revkrsum_[i];
        let desc = idx.prel_to_descsum_[i];
        if kr <= revkr && kr <= desc {
            leaf[i] = idx.prel_to_lld_[i];
            weight[i] = kr;
        } else if revkr <= desc {
            leaf[i] = idx.prel_to_rld_[i];
            weight[i] = revkr;
        } else {
            leaf[i] = inner_leaf[i];
            weight[i] = desc;
        }
    }
    NodeWeights { leaf, weight }
}

fn heaviest_child<L>(idx: &AptedIndex<L>, v: i32) -> Option<i32> {
    idx.prel_to_children_[v as usize]
        .iter()
        .copied()
        .max_by_key(|&c| idx.prel_to_size_[c as usize])
}

/// Computes the full `n1 x n2` strategy matrix.
pub fn compute_strategy<L1, L2>(idx1: &AptedIndex<L1>, idx2: &AptedIndex<L2>) -> Strategy {
    let n1 = idx1.size();
    let n2 = idx2.size();
    let w1 = compute_node_weights(idx1);
    let w2 = compute_node_weights(idx2);

    let mut table = Vec::with_capacity(n1);
    for v in 0..n1 {
        let mut row = Vec::with_capacity(n2);
        let size1 = idx1.prel_to_size_[v] as i64;
        for w in 0..n2 {
            let size2 = idx2.prel_to_size_[w] as i64;
            let cost_via_t1 = w1.weight[v] * size2.max(1);
            let cost_via_t2 = w2.weight[w] * size1.max(1);
            let path = if cost_via_t1 <= cost_via_t2 {
                PathId {
                    owner: Owner::T1,
                    leaf: w1.leaf[v],
                }
            } else {
                PathId {
                    owner: Owner::T2,
                    leaf: w2.leaf[w],
                }
            };
            row.push(path);
        }
        table.push(row);
    }
    Strategy { table }
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
    fn every_pair_gets_a_valid_leaf() {
        let idx1 = index_bracket("{a{b{e}{f}}{c}{d{g}}}");
        let idx2 = index_bracket("{x{y}{z{w}}}");
        let strategy = compute_strategy(&idx1, &idx2);
        for v in 0..idx1.size() as i32 {
            for w in 0..idx2.size() as i32 {
                let p = strategy.get(v, w);
                match p.owner {
                    Owner::T1 => assert!((p.leaf as usize) < idx1.size()),
                    Owner::T2 => assert!((p.leaf as usize) < idx2.size()),
                }
            }
        }
    }
}
