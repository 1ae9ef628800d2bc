use super::assignment::Assignment;
use super::clause::ClauseAllocator;
use super::Lit;


/// Common interface implemented by every propagating constraint kept in the
/// clause database: ordinary clauses today, cardinality/PB constraints in
/// principle. The search driver talks to constraints only through this
/// trait, never through `Clause` directly, so a future constraint kind needs
/// no change to `watches`/`conflict`.
pub trait Constr {
    /// Called when a watched literal `p` becomes false. Returns `false` if
    /// the constraint is now violated (a conflict), `true` otherwise. May
    /// rewrite the constraint's internal watch list.
    fn propagate(&mut self, ca: &mut ClauseAllocator, assigns: &mut Assignment, p: Lit) -> bool;

    /// Reason for the propagation that falsified `p`, used by conflict
    /// analysis. `p` is `None` when explaining a constraint-level conflict.
    fn calc_reason(&self, ca: &ClauseAllocator, assigns: &Assignment, p: Option<Lit>) -> Vec<Lit>;

    fn size(&self, ca: &ClauseAllocator) -> usize;
    fn get(&self, ca: &ClauseAllocator, i: usize) -> Lit;

    /// Detach the constraint from the watch lists and free its storage.
    fn remove(&self, ca: &mut ClauseAllocator, assigns: &mut Assignment);

    /// Attempt to simplify a satisfied constraint to `true`, given the
    /// current root-level assignment. Returns `true` if it can be discarded.
    fn simplify(&self, ca: &ClauseAllocator, assigns: &Assignment) -> bool;

    /// A constraint is locked if it is the reason for some assignment on the
    /// trail, and thus must not be deleted.
    fn locked(&self, ca: &ClauseAllocator, assigns: &Assignment) -> bool;

    fn activity(&self, ca: &ClauseAllocator) -> f64;
    fn learnt(&self, ca: &ClauseAllocator) -> bool;

    /// Whether `propagate` may be invoked more than once per watched literal
    /// per decision level (true for cardinality/PB constraints, false for
    /// ordinary clauses which detach themselves after firing).
    fn can_be_propagated_multiple_times(&self) -> bool {
        false
    }
}
