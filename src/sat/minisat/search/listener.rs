// Observer hooks into the search loop. Listeners only read state; the one
// exception the source exposes -- a listener forcing the solver to add a
// blocking clause and backtrack, used for model enumeration -- is modelled
// as a return value from `on_solution_found` rather than a reentrant call
// back into the solver, since the driver owns `&mut` access to everything a
// listener would need to call.

use crate::sat::formula::assignment::DecisionLevel;
use crate::sat::formula::clause::ClauseRef;
use crate::sat::formula::Lit;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolveStatus {
    Sat,
    Unsat,
    Undef,
}

#[allow(unused_variables)]
pub trait SearchListener {
    fn on_init(&mut self) {}
    fn on_start(&mut self) {}
    fn on_end(&mut self, status: SolveStatus) {}

    fn on_assuming(&mut self, lit: Lit) {}
    fn on_propagating(&mut self, lit: Lit, reason: Option<ClauseRef>) {}
    fn on_backtracking(&mut self, lit: Lit) {}
    fn on_adding(&mut self, lit: Lit) {}
    fn on_learn(&mut self, learnt: &[Lit]) {}
    fn on_conflict_found(&mut self, level: DecisionLevel) {}

    fn on_begin_loop(&mut self) {}
    fn on_backjump(&mut self, level: DecisionLevel) {}
    fn on_cleaning(&mut self) {}
    fn on_restarting(&mut self) {}

    /// Called once a model has been found, before it is handed back to the
    /// caller. Returning `Some(blocking_clause)` asks the driver to add that
    /// clause and keep searching instead of returning the model -- the model
    /// enumeration pattern from scenario S5.
    fn on_solution_found(&mut self, model: &[Lit]) -> Option<Vec<Lit>> {
        None
    }
}

pub struct NullListener;

impl SearchListener for NullListener {}
