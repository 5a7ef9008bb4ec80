/*
 * Lattice Port
 *
 * The capability set a concrete analysis supplies to the worklist solver:
 * exactly the four operations of the classic framework. The engine never
 * inspects facts beyond cloning and equality.
 */

use crate::features::flow_graph::domain::BasicBlock;
use crate::shared::models::Function;

use super::super::infrastructure::errors::DataFlowResult;

/// A dataflow analysis as seen by the solver.
///
/// Termination contract: the solver reaches a fixpoint when the fact
/// lattice has finite height and `merge`/`transfer` are monotone. The
/// engine does not enforce monotonicity - a non-monotone implementation can
/// spin forever, and that is a caller error, not an engine defect.
pub trait Lattice {
    type Fact: Clone + PartialEq;

    /// Starting fact for every program point of `function`.
    fn initial(&self, function: &Function) -> Self::Fact;

    /// Forward analyses merge predecessor OUT facts; backward analyses run
    /// against the reversed graph.
    fn is_forward(&self) -> bool;

    /// Combine the facts flowing into a join point. Called with an empty
    /// slice for the entry of the (oriented) graph.
    fn merge(&self, facts: Vec<&Self::Fact>) -> Self::Fact;

    /// Push a fact through one block: kill-then-gen composed over the
    /// block's instructions, in forward or reverse order per direction.
    ///
    /// # Errors
    ///
    /// Fallible so constant folding can surface malformed IR (literal
    /// division by zero) instead of guessing.
    fn transfer(&self, incoming: Self::Fact, block: &BasicBlock) -> DataFlowResult<Self::Fact>;
}
