//! `Apted`: the public facade tying together the indexer, strategy
//! computer, GTED driver, single-path functions, and mapping
//! extractor into the external interface from SPEC_FULL.md §6.
//!
//! One instance holds the state of a single `(T1, T2)` computation —
//! `delta`, the two indexes — exactly as the teacher's algorithm
//! modules keep their scratch state on an owning struct rather than
//! free functions with out-params. An instance is not `Sync`; running
//! two comparisons concurrently means making two instances (see
//! SPEC_FULL.md §5).

use crate::ted::cost::CostModel;
use crate::ted::error::TedError;
use crate::ted::gted;
use crate::ted::indexing::AptedIndex;
use crate::ted::mapping::{self, EditMapping, OperationExecutor};
use crate::ted::oracle;
use crate::ted::spf::{self, DeltaMatrix};
use crate::ted::tree::TreeNode;

/// Forces every subtree pair's path to the leftmost or rightmost leaf,
/// bypassing the strategy computer. Exists only to exercise `spfL`
/// and `spfR` deterministically in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedPathType {
    Left,
    Right,
}

struct ComputedState<L> {
    idx1: AptedIndex<L>,
    idx2: AptedIndex<L>,
    delta: DeltaMatrix,
}

pub struct Apted<L, C: CostModel<L>> {
    cost_model: C,
    state: Option<ComputedState<L>>,
}

impl<L, C: CostModel<L>> Apted<L, C>
where
    L: Clone + PartialEq,
{
    pub fn new(cost_model: C) -> Self {
        Self {
            cost_model,
            state: None,
        }
    }

    pub fn cost_model(&self) -> &C {
        &self.cost_model
    }

    /// Full pipeline: index both trees, validate the cost model
    /// against every label pair actually present, compute the
    /// strategy, run GTED, and return the tree edit distance.
    pub fn compute_edit_distance<N1, N2>(&mut self, t1: &N1, t2: &N2) -> Result<f64, TedError>
    where
        N1: TreeNode<Label = L>,
        N2: TreeNode<Label = L>,
    {
        let idx1 = AptedIndex::index_tree(t1, &self.cost_model);
        let idx2 = AptedIndex::index_tree(t2, &self.cost_model);
        validate_cost_model(&idx1, &idx2, &self.cost_model)?;

        let (distance, delta) = gted::compute(&idx1, &idx2, &self.cost_model);
        self.state = Some(ComputedState { idx1, idx2, delta });
        Ok(distance)
    }

    /// Bypasses the strategy computer entirely and forces `spfL` or
    /// `spfR` on the whole-tree pair.
    pub fn compute_edit_distance_spf_test<N1, N2>(
        &mut self,
        t1: &N1,
        t2: &N2,
        forced: ForcedPathType,
    ) -> Result<f64, TedError>
    where
        N1: TreeNode<Label = L>,
        N2: TreeNode<Label = L>,
    {
        let idx1 = AptedIndex::index_tree(t1, &self.cost_model);
        let idx2 = AptedIndex::index_tree(t2, &self.cost_model);
        validate_cost_model(&idx1, &idx2, &self.cost_model)?;

        let mut delta = spf::new_delta_matrix(&idx1, &idx2);
        let distance = match forced {
            ForcedPathType::Left => spf::spf_l(&idx1, 0, &idx2, 0, &self.cost_model, &mut delta),
            ForcedPathType::Right => spf::spf_r(&idx1, 0, &idx2, 0, &self.cost_model, &mut delta),
        };
        self.state = Some(ComputedState { idx1, idx2, delta });
        Ok(distance)
    }

    /// Must be called only after [`Self::compute_edit_distance`] (or
    /// the spf-test variant); otherwise fails with
    /// [`TedError::PreconditionViolated`].
    pub fn compute_edit_mapping(&self) -> Result<EditMapping, TedError> {
        let state = self.state.as_ref().ok_or(TedError::PreconditionViolated)?;
        Ok(mapping::extract_mapping(
            &state.idx1,
            &state.idx2,
            &self.cost_model,
            &state.delta,
        ))
    }

    pub fn mapping_cost(&self, mapping: &EditMapping) -> Result<f64, TedError> {
        let state = self.state.as_ref().ok_or(TedError::PreconditionViolated)?;
        Ok(mapping::mapping_cost(
            mapping,
            &state.idx1,
            &state.idx2,
            &self.cost_model,
        ))
    }

    pub fn execute_operations<E: OperationExecutor<L>>(
        &self,
        edit_mapping: &EditMapping,
        executor: &mut E,
    ) -> Result<(), TedError> {
        let state = self.state.as_ref().ok_or(TedError::PreconditionViolated)?;
        let ops = mapping::to_operations(edit_mapping, &state.idx1, &state.idx2);
        mapping::execute_operations(&ops, executor);
        Ok(())
    }

    pub fn execute_operations_in_reverse<E: OperationExecutor<L>>(
        &self,
        edit_mapping: &EditMapping,
        executor: &mut E,
    ) -> Result<(), TedError> {
        let state = self.state.as_ref().ok_or(TedError::PreconditionViolated)?;
        let ops = mapping::to_operations(edit_mapping, &state.idx1, &state.idx2);
        mapping::execute_operations_in_reverse(&ops, executor);
        Ok(())
    }

    /// Exhaustive reference answer, for tests only — see
    /// [`crate::ted::oracle`].
    pub fn compute_edit_distance_oracle<N1, N2>(
        &self,
        t1: &N1,
        t2: &N2,
        node_bound: usize,
    ) -> Result<f64, TedError>
    where
        N1: TreeNode<Label = L>,
        N2: TreeNode<Label = L>,
    {
        let idx1 = AptedIndex::index_tree(t1, &self.cost_model);
        let idx2 = AptedIndex::index_tree(t2, &self.cost_model);
        oracle::all_mappings_min_cost(&idx1, &idx2, &self.cost_model, node_bound)
    }
}

fn validate_cost_model<L, C>(
    idx1: &AptedIndex<L>,
    idx2: &AptedIndex<L>,
    cost: &C,
) -> Result<(), TedError>
where
    C: CostModel<L>,
{
    let finite_nonneg = |v: f64| v.is_finite() && v >= 0.0;

    for label in idx1.prel_to_label_.iter().chain(idx2.prel_to_label_.iter()) {
        if !finite_nonneg(cost.delete(label)) || !finite_nonneg(cost.insert(label)) {
            return Err(TedError::InvalidCostModel);
        }
    }
    for l1 in &idx1.prel_to_label_ {
        for l2 in &idx2.prel_to_label_ {
            if !finite_nonneg(cost.rename(l1, l2)) {
                return Err(TedError::InvalidCostModel);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{parse_single, LabelDict};
    use crate::ted::cost::{FixedCostModel, UnitCostModel};
    use crate::ted::tree::ArenaNode;

    #[test]
    fn end_to_end_distance_and_mapping() {
        let mut ld = LabelDict::new();
        let t1 = parse_single("{a{b}{c}}".to_owned(), &mut ld);
        let t2 = parse_single("{a{c}{b}}".to_owned(), &mut ld);
        let n1 = ArenaNode::root(&t1);
        let n2 = ArenaNode::root(&t2);

        let mut apted = Apted::new(UnitCostModel);
        let distance = apted.compute_edit_distance(&n1, &n2).unwrap();
        assert_eq!(distance, 2.0);

        let mapping = apted.compute_edit_mapping().unwrap();
        let cost = apted.mapping_cost(&mapping).unwrap();
        assert_eq!(cost, distance);
    }

    #[test]
    fn mapping_before_distance_is_precondition_violated() {
        let apted = Apted::new(UnitCostModel);
        let err = apted.compute_edit_mapping().unwrap_err();
        assert!(matches!(err, TedError::PreconditionViolated));
    }

    #[test]
    fn negative_cost_model_is_rejected() {
        let mut ld = LabelDict::new();
        let t1 = parse_single("{a}".to_owned(), &mut ld);
        let t2 = parse_single("{b}".to_owned(), &mut ld);
        let n1 = ArenaNode::root(&t1);
        let n2 = ArenaNode::root(&t2);

        let mut apted = Apted::new(FixedCostModel::new(-1.0, 1.0, 1.0));
        let err = apted.compute_edit_distance(&n1, &n2).unwrap_err();
        assert!(matches!(err, TedError::InvalidCostModel));
    }

    #[test]
    fn spf_test_left_and_right_agree_with_full_pipeline() {
        let mut ld = LabelDict::new();
        let t1 = parse_single("{r{a}{b}{c}{d}}".to_owned(), &mut ld);
        let t2 = parse_single("{r}".to_owned(), &mut ld);
        let n1 = ArenaNode::root(&t1);
        let n2 = ArenaNode::root(&t2);

        let mut full = Apted::new(UnitCostModel);
        let full_d = full.compute_edit_distance(&n1, &n2).unwrap();

        let mut left = Apted::new(UnitCostModel);
        let left_d = left
            .compute_edit_distance_spf_test(&n1, &n2, ForcedPathType::Left)
            .unwrap();

        let mut right = Apted::new(UnitCostModel);
        let right_d = right
            .compute_edit_distance_spf_test(&n1, &n2, ForcedPathType::Right)
            .unwrap();

        assert_eq!(full_d, left_d);
        assert_eq!(full_d, right_d);
    }

    struct CountingExecutor {
        deletes: usize,
        inserts: usize,
        updates: usize,
    }
    impl OperationExecutor<i32> for CountingExecutor {
        fn delete(&mut self, _node: &i32) {
            self.deletes += 1;
        }
        fn insert(&mut self, _node: &i32) {
            self.inserts += 1;
        }
        fn update(&mut self, _from: &i32, _to: &i32) {
            self.updates += 1;
        }
    }

    #[test]
    fn execute_operations_visits_every_mapping_pair() {
        let mut ld = LabelDict::new();
        let t1 = parse_single("{r{a}{b}{c}{d}}".to_owned(), &mut ld);
        let t2 = parse_single("{r}".to_owned(), &mut ld);
        let n1 = ArenaNode::root(&t1);
        let n2 = ArenaNode::root(&t2);

        let mut apted = Apted::new(UnitCostModel);
        apted.compute_edit_distance(&n1, &n2).unwrap();
        let mapping = apted.compute_edit_mapping().unwrap();

        let mut executor = CountingExecutor {
            deletes: 0,
            inserts: 0,
            updates: 0,
        };
        apted.execute_operations(&mapping, &mut executor).unwrap();
        assert_eq!(executor.deletes, 4);
        assert_eq!(executor.inserts, 0);
        assert_eq!(executor.updates, 1);
    }
}
