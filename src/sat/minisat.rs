use crate::sat::{SolveRes, Solver, SolverError, Stats};
use crate::sat::formula::{Lit, Var};
use self::search::clause_db::ClauseDBSettings;
pub use self::search::conflict::CCMinMode;
use self::search::decision_heuristic::DecisionHeuristicSettings;
pub use self::search::decision_heuristic::PhaseSaving;
pub use self::search::listener::{NullListener, SearchListener, SolveStatus};
pub use self::search::restart::RestartStrategy;
use self::search::*;
use self::budget::Budget;

pub mod budget;
mod search;


#[derive(Default)]
pub struct CoreSettings {
    pub heur: DecisionHeuristicSettings,
    pub db: ClauseDBSettings,
    pub ccmin_mode: CCMinMode,
    pub search: SearchSettings,
    pub core: SearcherSettings,
}


/// Incremental CDCL solver. `ok` latches to `false` the moment a clause
/// makes the formula trivially unsatisfiable; once that happens every other
/// method becomes a no-op that reports `UnSAT` without touching `search`.
pub struct CoreSolver {
    ok: bool,
    ss: SearchSettings,
    search: Searcher,
}

impl Solver for CoreSolver {
    fn n_vars(&self) -> usize {
        self.search.number_of_vars()
    }

    fn n_clauses(&self) -> usize {
        self.search.number_of_clauses()
    }

    fn new_var(&mut self, upol: Option<bool>, dvar: bool) -> Var {
        self.search.new_var(upol, dvar)
    }

    fn add_clause(&mut self, clause: &[Lit]) -> Result<(), SolverError> {
        if self.ok {
            if let AddClauseRes::UnSAT = self.search.add_clause(clause) {
                self.ok = false;
            }
        }

        if self.ok {
            Ok(())
        } else {
            Err(SolverError::Contradiction)
        }
    }

    fn preprocess(&mut self, _: &Budget) -> bool {
        if self.ok {
            self.ok = self.search.preprocess();
        }
        self.ok
    }

    fn solve_limited(&mut self, budget: &Budget, assumptions: &[Lit]) -> SolveRes {
        self.solve_limited_with(budget, assumptions, &mut NullListener)
    }

    fn stats(&self) -> Stats {
        self.search.stats()
    }
}

impl CoreSolver {
    pub fn new(settings: CoreSettings) -> Self {
        CoreSolver {
            ok: true,
            ss: settings.search,
            search: Searcher::new(
                settings.core,
                settings.db,
                settings.heur,
                settings.ccmin_mode,
            ),
        }
    }

    /// Like `Solver::solve_limited`, but lets the caller observe the search
    /// through a custom `SearchListener` (progress reporting, blocking-clause
    /// model enumeration, interactive tracing).
    pub fn solve_limited_with(
        &mut self,
        budget: &Budget,
        assumptions: &[Lit],
        listener: &mut dyn SearchListener,
    ) -> SolveRes {
        if !self.ok {
            return SolveRes::UnSAT(self.search.stats());
        }

        match self.search.search(&self.ss, budget, assumptions, listener) {
            SearchRes::UnSAT(stats) => SolveRes::UnSAT(stats),
            SearchRes::SAT(stats) => {
                let model = self.search.model().expect("SAT result without a model");
                SolveRes::SAT(model.iter().map(|(v, s)| v.sign_lit(!*s)).collect(), stats)
            }
            SearchRes::Interrupted(c) => SolveRes::Interrupted(c),
        }
    }

    /// A minimal subset of `assumptions` that still forces the given model,
    /// obtained by dropping assumption literals one at a time and re-solving.
    /// Only meaningful to call right after a `SAT` result.
    pub fn prime_implicant(&mut self) -> Vec<Lit> {
        self.search.prime_implicant(&self.ss)
    }

    /// A subset of the last assumption set that is itself unsatisfiable,
    /// valid after an `UnSAT` result obtained under assumptions. Internally
    /// `analyze_final` collects the negation of each culprit assumption
    /// (the MiniSat convention, since those negations are what the conflict
    /// is built from); negate back here so the result is stated in terms of
    /// the assumption literals themselves.
    pub fn unsat_core(&self) -> Option<Vec<Lit>> {
        self.search
            .unsat_explanation()
            .map(|core| core.iter().map(|(lit, _)| !*lit).collect())
    }
}
