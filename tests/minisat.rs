use minisat_rust::sat::minisat::{budget::Budget, CoreSettings, CoreSolver, SearchListener};
use minisat_rust::sat::formula::{Lit, Var};
use minisat_rust::sat::{SolveRes, Solver};

use proptest::prelude::*;


fn new_vars(solver: &mut CoreSolver, n: usize) -> Vec<Var> {
    (0..n).map(|_| solver.new_var(None, true)).collect()
}

fn cl(vars: &[Var], lits: &[i32]) -> Vec<Lit> {
    lits.iter()
        .map(|&id| vars[(id.abs() - 1) as usize].lit(id < 0))
        .collect()
}


// S1: {1∨2, ¬1∨2, 1∨¬2} is SAT with both variables true.
#[test]
fn s1_small_sat_model() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    let vars = new_vars(&mut solver, 2);

    solver.add_clause(&cl(&vars, &[1, 2])).unwrap();
    solver.add_clause(&cl(&vars, &[-1, 2])).unwrap();
    solver.add_clause(&cl(&vars, &[1, -2])).unwrap();

    match solver.solve_limited(&Budget::new(), &[]) {
        SolveRes::SAT(model, _) => {
            assert!(model.contains(&vars[0].pos_lit()));
            assert!(model.contains(&vars[1].pos_lit()));
        }
        _ => panic!("expected SAT"),
    }
}


// S2: {1, ¬1} as a single unit clause followed by its negation is a
// root-level contradiction, reported on the add that triggers it.
#[test]
fn s2_unit_contradiction_on_add() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    let vars = new_vars(&mut solver, 1);

    solver.add_clause(&cl(&vars, &[1])).unwrap();
    assert!(solver.add_clause(&cl(&vars, &[-1])).is_err());
}


// S3: {1∨2, 1∨¬2, ¬1∨3, ¬1∨¬3} is UNSAT with an empty explanation
// (no assumptions were involved).
#[test]
fn s3_unsat_no_assumptions_empty_core() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    let vars = new_vars(&mut solver, 3);

    solver.add_clause(&cl(&vars, &[1, 2])).unwrap();
    solver.add_clause(&cl(&vars, &[1, -2])).unwrap();
    solver.add_clause(&cl(&vars, &[-1, 3])).unwrap();
    solver.add_clause(&cl(&vars, &[-1, -3])).unwrap();

    match solver.solve_limited(&Budget::new(), &[]) {
        SolveRes::UnSAT(_) => {}
        _ => panic!("expected UnSAT"),
    }
    assert_eq!(solver.unsat_core(), Some(Vec::new()));
}


// S4: {1∨2, ¬1∨2, 1∨¬2} under assumption [¬2] is UNSAT, and the
// explanation names the offending assumption literal.
#[test]
fn s4_assumption_core_contains_assumption() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    let vars = new_vars(&mut solver, 2);

    solver.add_clause(&cl(&vars, &[1, 2])).unwrap();
    solver.add_clause(&cl(&vars, &[-1, 2])).unwrap();
    solver.add_clause(&cl(&vars, &[1, -2])).unwrap();

    let assumptions = cl(&vars, &[-2]);
    match solver.solve_limited(&Budget::new(), &assumptions) {
        SolveRes::UnSAT(_) => {}
        _ => panic!("expected UnSAT under assumption"),
    }

    let core = solver.unsat_core().expect("explanation expected");
    assert!(core.contains(&vars[1].neg_lit()));
}


struct EnumeratingListener {
    models_found: usize,
}

impl SearchListener for EnumeratingListener {
    fn on_solution_found(&mut self, model: &[Lit]) -> Option<Vec<Lit>> {
        self.models_found += 1;
        Some(model.iter().map(|&lit| !lit).collect())
    }
}

// S5: pigeonhole P(3,2) has no model, so an enumerating listener that
// blocks every solution it sees is never invoked.
#[test]
fn s5_pigeonhole_enumeration_finds_nothing() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    // pigeons[i][j]: pigeon i (0..3) sits in hole j (0..2).
    let pigeons: Vec<Vec<Var>> = (0..3)
        .map(|_| (0..2).map(|_| solver.new_var(None, true)).collect())
        .collect();

    for pigeon in &pigeons {
        solver.add_clause(&[pigeon[0].pos_lit(), pigeon[1].pos_lit()]).unwrap();
    }
    for hole in 0..2 {
        for i in 0..3 {
            for j in (i + 1)..3 {
                let _ = solver.add_clause(&[pigeons[i][hole].neg_lit(), pigeons[j][hole].neg_lit()]);
            }
        }
    }

    let mut listener = EnumeratingListener { models_found: 0 };
    match solver.solve_limited_with(&Budget::new(), &[], &mut listener) {
        SolveRes::UnSAT(_) => {}
        _ => panic!("pigeonhole P(3,2) must be unsatisfiable"),
    }
    assert_eq!(listener.models_found, 0);
}


// S6: {1∨2, 2∨3} is satisfiable under assumptions [1, 3]; the prime
// implicant is a subset of the decisions that still forces a model.
#[test]
fn s6_prime_implicant_is_a_sufficient_subset() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    let vars = new_vars(&mut solver, 3);

    solver.add_clause(&cl(&vars, &[1, 2])).unwrap();
    solver.add_clause(&cl(&vars, &[2, 3])).unwrap();

    let assumptions = cl(&vars, &[1, 3]);
    match solver.solve_limited(&Budget::new(), &assumptions) {
        SolveRes::SAT(_, _) => {}
        _ => panic!("expected SAT"),
    }

    let implicant = solver.prime_implicant();
    assert!(!implicant.is_empty(), "prime implicant must not be empty for a satisfiable formula");
    assert!(implicant.iter().all(|lit| lit.var() == vars[0] || lit.var() == vars[2] || lit.var() == vars[1]));
    // Neither assumption is redundant here: {2∨3} alone admits a model with
    // 1 false (2=true), and {1∨2} alone admits a model with 3 false (2=true),
    // so dropping either one changes what's forced. The prime implicant is
    // exactly the original decision set.
    assert_eq!(implicant.len(), 2);
    assert!(implicant.contains(&vars[0].pos_lit()));
    assert!(implicant.contains(&vars[2].pos_lit()));

    match solver.solve_limited(&Budget::new(), &implicant) {
        SolveRes::SAT(_, _) => {}
        _ => panic!("prime implicant must still force a model"),
    }
}


#[derive(Clone, Debug)]
struct RandomCnf {
    n_vars: usize,
    clauses: Vec<Vec<i32>>,
}

fn arb_cnf(max_vars: usize, max_clauses: usize) -> impl Strategy<Value = RandomCnf> {
    (2..=max_vars).prop_flat_map(move |n_vars| {
        let lit = (1..=n_vars as i32).prop_flat_map(|v| prop_oneof![Just(v), Just(-v)]);
        let clause = prop::collection::vec(lit, 1..=3);
        prop::collection::vec(clause, 0..=max_clauses)
            .prop_map(move |clauses| RandomCnf { n_vars, clauses })
    })
}

fn brute_force_sat(cnf: &RandomCnf) -> bool {
    for assignment in 0u32..(1 << cnf.n_vars) {
        let holds = cnf.clauses.iter().all(|clause| {
            clause.iter().any(|&lit| {
                let v = (lit.abs() - 1) as u32;
                let is_true = (assignment >> v) & 1 == 1;
                if lit > 0 {
                    is_true
                } else {
                    !is_true
                }
            })
        });
        if holds {
            return true;
        }
    }
    false
}

fn solve_cnf(cnf: &RandomCnf) -> (CoreSolver, Vec<Var>, SolveRes) {
    let mut solver = CoreSolver::new(CoreSettings::default());
    let vars = new_vars(&mut solver, cnf.n_vars);
    for clause in &cnf.clauses {
        let _ = solver.add_clause(&cl(&vars, clause));
    }
    let res = solver.solve_limited(&Budget::new(), &[]);
    (solver, vars, res)
}

proptest! {
    // Invariant 1: a reported model satisfies every original clause.
    #[test]
    fn prop_model_satisfies_every_clause(cnf in arb_cnf(8, 20)) {
        let (_, vars, res) = solve_cnf(&cnf);
        if let SolveRes::SAT(model, _) = res {
            for clause in &cnf.clauses {
                let satisfied = clause.iter().any(|&lit| {
                    let l = vars[(lit.abs() - 1) as usize].lit(lit < 0);
                    model.contains(&l)
                });
                prop_assert!(satisfied, "model fails to satisfy clause {:?}", clause);
            }
        }
    }

    // Invariant 2: an UnSAT verdict agrees with brute force on small instances.
    #[test]
    fn prop_unsat_soundness(cnf in arb_cnf(8, 20)) {
        let (_, _, res) = solve_cnf(&cnf);
        let brute = brute_force_sat(&cnf);
        match res {
            SolveRes::SAT(_, _) => prop_assert!(brute),
            SolveRes::UnSAT(_) => prop_assert!(!brute),
            SolveRes::Interrupted(_) => {}
        }
    }

    // Invariant 8: re-solving the same formula from scratch agrees with itself.
    #[test]
    fn prop_incremental_idempotence(cnf in arb_cnf(8, 20)) {
        let (_, _, res1) = solve_cnf(&cnf);
        let (_, _, res2) = solve_cnf(&cnf);
        match (res1, res2) {
            (SolveRes::SAT(m1, _), SolveRes::SAT(m2, _)) => prop_assert_eq!(m1.len(), m2.len()),
            (SolveRes::UnSAT(_), SolveRes::UnSAT(_)) => {}
            (SolveRes::Interrupted(_), SolveRes::Interrupted(_)) => {}
            _ => prop_assert!(false, "inconsistent verdicts across two solves of the same formula"),
        }
    }
}
