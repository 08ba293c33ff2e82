//! Tree edit distance (APTED) over ordered labeled trees.
//!
//! The crate is split into a small parsing layer for the bracket
//! notation used throughout the test collections (`parsing`), and the
//! `ted` module tree, which holds the actual algorithm: node
//! indexing, optimal-path strategy computation, the single-path
//! distance functions, the GTED driver, mapping extraction and a
//! brute-force oracle used only by tests.

pub mod parsing;
pub mod ted;

pub use ted::apted::{Apted, ForcedPathType};
pub use ted::cost::{CostModel, FixedCostModel, UnitCostModel};
pub use ted::error::TedError;
pub use ted::mapping::{EditMapping, EditOperation, OperationExecutor};
pub use ted::tree::TreeNode;
