use std::{error, fmt};
use crate::sat::formula::{Lit, Var};

pub mod dimacs;
pub mod formula;
pub mod minisat;


#[derive(Default, Debug)]
pub struct Stats {
    pub solves: u64,
    pub restarts: u64,
    pub decisions: u64,
    pub rnd_decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub tot_literals: u64,
    pub del_literals: u64,
}


/// Failure modes that can be reported without aborting the process; callers
/// decide whether a `Usage` error is fatal.
#[derive(Debug)]
pub enum SolverError {
    /// A clause added under the current assignment makes the formula
    /// trivially unsatisfiable (root-level conflict).
    Contradiction,
    /// A `Budget` deadline or conflict/propagation limit was hit.
    Timeout,
    /// Bad input from a caller: malformed DIMACS, an out-of-range variable, etc.
    Usage(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolverError::Contradiction => write!(f, "formula is trivially unsatisfiable"),
            SolverError::Timeout => write!(f, "solve budget exhausted"),
            SolverError::Usage(msg) => write!(f, "{}", msg),
        }
    }
}

impl error::Error for SolverError {}


pub enum SolveRes {
    UnSAT(Stats),
    SAT(Vec<Lit>, Stats),
    Interrupted(f64),
}


pub trait Solver {
    fn n_vars(&self) -> usize;
    fn n_clauses(&self) -> usize;
    fn new_var(&mut self, upol: Option<bool>, dvar: bool) -> Var;
    fn add_clause(&mut self, clause: &[Lit]) -> Result<(), SolverError>;
    fn preprocess(&mut self, _: &minisat::budget::Budget) -> bool;
    fn solve_limited(&mut self, _: &minisat::budget::Budget, _: &[Lit]) -> SolveRes;
    fn stats(&self) -> Stats;
}
