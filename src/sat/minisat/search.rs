use crate::sat;
use crate::sat::formula::{assignment::*, clause::*, util::extract_model, LBool, Lit, LitMap, Var, VarMap};
use self::backtrack::BacktrackableFormula;
use self::conflict::{AnalyzeContext, CCMinMode, Conflict};
use self::decision_heuristic::{DecisionHeuristic, DecisionHeuristicSettings};
use self::listener::{NullListener, SearchListener, SolveStatus};
use self::restart::{RestartStrategy, RestartTimer};
use super::budget::Budget;

mod backtrack;
pub mod clause_db;
pub mod conflict;
pub mod decision_heuristic;
pub mod listener;
mod luby;
pub mod restart;
mod random;
mod watches;


#[derive(Clone, Copy, Debug)]
pub struct LearningStrategy {
    pub min_learnts_lim: i32, // Minimum number to set the learnts limit to.
    pub size_factor: f64, // The intitial limit for learnt clauses is a factor of the original clauses.
    pub size_inc: f64, // The limit for learnt clauses is multiplied with this factor each restart.
    pub size_adjust_start_confl: i32,
    pub size_adjust_inc: f64,
}

impl Default for LearningStrategy {
    fn default() -> Self {
        LearningStrategy {
            min_learnts_lim: 0,
            size_factor: 1.0 / 3.0,
            size_inc: 1.1,
            size_adjust_start_confl: 100,
            size_adjust_inc: 1.5,
        }
    }
}


struct LearningGuard {
    settings: LearningStrategy,
    max_learnts: f64,
    size_adjust_confl: f64,
    size_adjust_cnt: i32,
}

impl LearningGuard {
    pub fn new(settings: LearningStrategy) -> Self {
        LearningGuard {
            settings,
            max_learnts: 0.0,
            size_adjust_confl: 0.0,
            size_adjust_cnt: 0,
        }
    }

    pub fn reset(&mut self, clauses: usize) {
        self.max_learnts = ((clauses as f64) * self.settings.size_factor)
            .max(self.settings.min_learnts_lim as f64);
        self.size_adjust_confl = self.settings.size_adjust_start_confl as f64;
        self.size_adjust_cnt = self.settings.size_adjust_start_confl;
    }

    pub fn bump(&mut self) -> bool {
        self.size_adjust_cnt -= 1;
        if self.size_adjust_cnt == 0 {
            self.size_adjust_confl *= self.settings.size_adjust_inc;
            self.size_adjust_cnt = self.size_adjust_confl as i32;
            self.max_learnts *= self.settings.size_inc;
            true
        } else {
            false
        }
    }

    pub fn border(&self) -> f64 {
        self.max_learnts
    }
}


struct SimplifyGuard {
    simp_db_assigns: Option<usize>, // Number of top-level assignments since last execution of 'simplify()'.
    simp_db_props: u64,
}

impl SimplifyGuard {
    pub fn new() -> Self {
        SimplifyGuard {
            simp_db_assigns: None,
            simp_db_props: 0,
        }
    }

    pub fn skip(&self, assigns: usize, propagations: u64) -> bool {
        Some(assigns) == self.simp_db_assigns || propagations < self.simp_db_props
    }

    pub fn set_next(&mut self, assigns: usize, propagations: u64, prop_limit: u64) {
        self.simp_db_assigns = Some(assigns);
        self.simp_db_props = propagations + prop_limit;
    }
}


#[derive(Default)]
struct Stats {
    solves: u64,
    starts: u64,
    decisions: u64,
    conflicts: u64,
}


#[derive(Clone, Copy, Default, Debug)]
pub struct SearchSettings {
    pub restart: RestartStrategy,
    pub learn: LearningStrategy,
}


pub enum AddClauseRes {
    UnSAT,
    Consumed,
    Added(ClauseRef),
}


pub enum SearchRes {
    UnSAT(sat::Stats),
    SAT(sat::Stats),
    Interrupted(f64),
}


pub struct SearcherSettings {
    pub garbage_frac: f64, // The fraction of wasted memory allowed before a garbage collection is triggered.
    pub use_rcheck: bool, // Check if a clause is already implied. Pretty costly, and subsumes subsumptions :)
}

impl Default for SearcherSettings {
    fn default() -> Self {
        SearcherSettings {
            garbage_frac: 0.20,
            use_rcheck: false,
        }
    }
}


/// The outcome of `SearchCtx::decide`: either a user assumption still being
/// pushed, a heuristic branching decision, or "every variable assigned" (a
/// model has been found).
enum Decision {
    Assuming(Lit),
    Branch(Lit),
    Satisfied,
}

enum ModelOutcome {
    Done,
    Blocked,
    Contradiction,
}

enum LoopRes {
    Restart,
    UnSAT,
    SAT,
    Interrupted(f64),
    AssumpsConfl(LitMap<()>),
}


pub struct SearchCtx {
    stats: Stats,
    db: clause_db::ClauseDB,
    heur: DecisionHeuristic,
    analyze: AnalyzeContext,
    simp: SimplifyGuard,
    last_model: Option<VarMap<bool>>,
    last_decisions: Vec<Lit>,
    unsat_explanation: Option<LitMap<()>>,
    last_status: SolveStatus,
}

impl SearchCtx {
    pub fn new(db_set: clause_db::ClauseDBSettings, heur_set: DecisionHeuristicSettings, ccmin_mode: CCMinMode) -> Self {
        SearchCtx {
            stats: Stats::default(),
            db: clause_db::ClauseDB::new(db_set),
            heur: DecisionHeuristic::new(heur_set),
            analyze: AnalyzeContext::new(ccmin_mode),
            simp: SimplifyGuard::new(),
            last_model: None,
            last_decisions: Vec::new(),
            unsat_explanation: None,
            last_status: SolveStatus::Undef,
        }
    }

    pub fn init_var(&mut self, v: Var, upol: Option<bool>, dvar: bool) {
        self.heur.init_var(v, upol, dvar);
        self.analyze.init_var(v);
    }

    fn decide(&mut self, assigns: &mut Assignment, ca: &ClauseAllocator, assumptions: &[Lit]) -> Result<Decision, LitMap<()>> {
        while let Some(&p) = assumptions.get(assigns.current_level().as_usize()) {
            // Perform user provided assumption:
            match assigns.value(p) {
                LBool::True => {
                    // Dummy decision level, keeping decision-level bookkeeping
                    // in lock-step with the assumption vector.
                    assigns.new_decision_level();
                }
                LBool::False => {
                    let conflict = self.analyze.analyze_final(ca, assigns, !p);
                    return Err(conflict);
                }
                LBool::Undef => {
                    return Ok(Decision::Assuming(p));
                }
            }
        }

        // New variable decision:
        self.stats.decisions += 1;
        match self.heur.pick_branch_lit(assigns) {
            Some(lit) => Ok(Decision::Branch(lit)),
            None => Ok(Decision::Satisfied),
        }
    }

    fn analyze(&mut self, assigns: &Assignment, ca: &mut ClauseAllocator, confl: ClauseRef) -> conflict::Conflict {
        self.analyze.analyze(assigns, ca,
            confl,
            {
                let heur = &mut self.heur;
                move |v| heur.bump_activity(&v)
            },
            {
                let db = &mut self.db;
                move |ca, c| db.bump_activity(ca, c)
            }
        )
    }

    fn cancel_until(&mut self, assigns: &mut Assignment, target_level: DecisionLevel, listener: &mut dyn SearchListener) {
        let current = assigns.current_level();
        let top_lits: Vec<Lit> = if current > target_level {
            let boundary = DecisionLevel::from_usize(current.as_usize() - 1);
            assigns.trail_above(boundary).to_vec()
        } else {
            Vec::new()
        };

        let heur = &mut self.heur;
        assigns.rewind_until_level(target_level, |lit| {
            heur.cancel(lit, top_lits.contains(&lit));
            listener.on_backtracking(lit);
        });
    }

    fn handle_conflict(
        &mut self,
        learnt: &mut LearningGuard,
        bt: &mut BacktrackableFormula,
        confl: ClauseRef,
        listener: &mut dyn SearchListener,
    ) -> Option<(DecisionLevel, Lit, Option<ClauseRef>, u32)> {
        self.stats.conflicts += 1;
        let conflict_level = bt.assigns.current_level();

        let (level, lit, reason, lbd) = match self.analyze(&bt.assigns, &mut bt.ca, confl) {
            Conflict::Ground => {
                return None;
            }

            Conflict::Unit(level, unit) => {
                self.cancel_until(&mut bt.assigns, level, listener);
                (level, unit, None, 1u32)
            }

            Conflict::Learned(level, lit, clause) => {
                let lbd = self.analyze.compute_lbd(&bt.assigns, &clause[..]);
                self.cancel_until(&mut bt.assigns, level, listener);
                let cr = self.db.learn_clause(&mut bt.ca, &clause[..]);
                self.db.set_lbd(&mut bt.ca, cr, lbd);
                listener.on_learn(&clause[..]);
                (level, lit, Some(cr), lbd)
            }
        };

        listener.on_conflict_found(conflict_level);
        listener.on_backjump(level);

        if log_enabled!(log::Level::Trace) {
            trace!(
                "conflict at level {:?}, learnt size {}, lbd {}",
                conflict_level,
                reason.map_or(1, |cr| bt.ca.view(cr).len()),
                lbd
            );
        }

        self.heur.decay_activity();
        self.db.decay_activity();

        if learnt.bump() {
            info!(
                "| {:9} | {:7} {:8} {:8} | {:8} {:8} {:6.0} | {:6.3} % |",
                self.stats.conflicts,
                self.heur.dec_vars - (bt.assigns.number_of_assigns() - bt.assigns.trail_above(GROUND_LEVEL).len()),
                self.db.stats.num_clauses,
                self.db.stats.clauses_literals,
                learnt.border() as u64,
                self.db.stats.num_learnts,
                (self.db.stats.learnts_literals as f64) / (self.db.stats.num_learnts as f64),
                bt.assigns.progress_estimate() * 100.0
            );
        }

        Some((level, lit, reason, lbd))
    }
}


pub struct Searcher {
    settings: SearcherSettings,
    bt: backtrack::BacktrackableFormula,
    ctx: SearchCtx,
}

impl Searcher {
    pub fn new(
        settings: SearcherSettings,
        db_set: clause_db::ClauseDBSettings,
        heur_set: DecisionHeuristicSettings,
        ccmin_mode: CCMinMode,
    ) -> Self {
        Searcher {
            settings,
            bt: backtrack::BacktrackableFormula::new(),
            ctx: SearchCtx::new(db_set, heur_set, ccmin_mode),
        }
    }

    pub fn number_of_vars(&self) -> usize {
        self.bt.assigns.n_vars()
    }

    pub fn number_of_clauses(&self) -> usize {
        self.ctx.db.stats.num_clauses
    }

    pub fn new_var(&mut self, upol: Option<bool>, dvar: bool) -> Var {
        let v = self.bt.new_var();
        self.ctx.init_var(v, upol, dvar);
        v
    }

    pub fn add_clause(&mut self, clause: &[Lit]) -> AddClauseRes {
        if self.settings.use_rcheck && is_implied(self, clause) {
            return AddClauseRes::Consumed;
        }

        let ps = {
            let mut ps = clause.to_vec();

            // Check if clause is satisfied and remove false/duplicate literals:
            ps.sort();
            ps.dedup();
            ps.retain(|&lit| !self.bt.assigns.is_assigned_neg(lit));

            {
                let mut prev = None;
                for &lit in ps.iter() {
                    if self.bt.assigns.is_assigned_pos(lit) || prev == Some(!lit) {
                        return AddClauseRes::Consumed;
                    }
                    prev = Some(lit);
                }
            }

            ps
        };

        match &ps[..] {
            [] => AddClauseRes::UnSAT,

            [unit] => {
                self.bt.assigns.assign_lit(*unit, None);
                match self.bt.propagate() {
                    None => AddClauseRes::Consumed,
                    Some(_) => AddClauseRes::UnSAT,
                }
            }

            lits => {
                let cr = self.ctx.db.add_clause(&mut self.bt.ca, lits);
                self.bt.attach(cr);
                AddClauseRes::Added(cr)
            }
        }
    }

    pub fn preprocess(&mut self) -> bool {
        if self.bt.propagate().is_none() {
            self.try_simplify(&mut NullListener);
            true
        } else {
            false
        }
    }

    pub fn search(
        &mut self,
        ss: &SearchSettings,
        budget: &Budget,
        assumptions: &[Lit],
        listener: &mut dyn SearchListener,
    ) -> SearchRes {
        listener.on_init();
        listener.on_start();

        info!("============================[ Search Statistics ]==============================");
        info!("| Conflicts |          ORIGINAL         |          LEARNT          | Progress |");
        info!("|           |    Vars  Clauses Literals |    Limit  Clauses Lit/Cl |          |");
        info!("===============================================================================");

        let res = self.search_internal(ss, budget, assumptions, listener);

        info!("===============================================================================");
        res
    }

    fn search_internal(
        &mut self,
        ss: &SearchSettings,
        budget: &Budget,
        assumptions: &[Lit],
        listener: &mut dyn SearchListener,
    ) -> SearchRes {
        self.ctx.stats.solves += 1;
        let mut learnt = LearningGuard::new(ss.learn);
        learnt.reset(self.ctx.db.stats.num_clauses);
        let mut restart = RestartTimer::new(ss.restart);

        loop {
            match self.search_loop(&mut restart, budget, &mut learnt, assumptions, listener) {
                LoopRes::Restart => {
                    restart.on_restart();
                    listener.on_restarting();
                }

                LoopRes::SAT => {
                    self.ctx.last_status = SolveStatus::Sat;
                    listener.on_end(SolveStatus::Sat);
                    return SearchRes::SAT(self.stats());
                }

                LoopRes::UnSAT => {
                    self.ctx.unsat_explanation = Some(LitMap::new());
                    self.ctx.last_status = SolveStatus::Unsat;
                    listener.on_end(SolveStatus::Unsat);
                    return SearchRes::UnSAT(self.stats());
                }

                LoopRes::AssumpsConfl(confl) => {
                    self.ctx.unsat_explanation = Some(confl);
                    self.cancel_until(GROUND_LEVEL, listener);
                    self.ctx.last_status = SolveStatus::Unsat;
                    listener.on_end(SolveStatus::Unsat);
                    return SearchRes::UnSAT(self.stats());
                }

                LoopRes::Interrupted(c) => {
                    self.ctx.last_status = SolveStatus::Undef;
                    listener.on_end(SolveStatus::Undef);
                    return SearchRes::Interrupted(c);
                }
            }
        }
    }

    // Description:
    //   Search for a model within one restart epoch.
    //
    // Output:
    //   `LoopRes::SAT` if a complete, consistent assignment was found, `LoopRes::UnSAT` if the clause
    //   set is unsatisfiable, `LoopRes::Restart` if the restart policy fired first, `LoopRes::Interrupted`
    //   if the budget ran out.
    fn search_loop(
        &mut self,
        restart: &mut RestartTimer,
        budget: &Budget,
        learnt: &mut LearningGuard,
        assumptions: &[Lit],
        listener: &mut dyn SearchListener,
    ) -> LoopRes {
        self.ctx.stats.starts += 1;
        listener.on_begin_loop();

        loop {
            if !self.propagate_learn_backtrack(learnt, restart, listener) {
                return LoopRes::UnSAT;
            }

            if !budget.within(self.ctx.stats.conflicts, self.bt.propagations()) {
                let progress_estimate = self.bt.assigns.progress_estimate();
                self.cancel_until(GROUND_LEVEL, listener);
                return LoopRes::Interrupted(progress_estimate);
            }

            if restart.should_restart() {
                self.cancel_until(GROUND_LEVEL, listener);
                return LoopRes::Restart;
            }

            // Simplify the set of problem clauses:
            self.try_simplify(listener);

            let learnt_grown = (self.ctx.db.number_of_learnts() as f64)
                >= learnt.border() + (self.bt.assigns.number_of_assigns() as f64);
            if learnt_grown || self.ctx.db.should_reduce(&self.bt.ca, self.ctx.stats.conflicts) {
                listener.on_cleaning();
                self.reduce_db();
                self.try_garbage_collect(listener);
            }

            match self.ctx.decide(&mut self.bt.assigns, &self.bt.ca, assumptions) {
                Err(confl) => return LoopRes::AssumpsConfl(confl),

                Ok(Decision::Assuming(p)) => {
                    listener.on_assuming(p);
                    self.bt.push_decision(p);
                }

                Ok(Decision::Branch(p)) => {
                    self.bt.push_decision(p);
                }

                Ok(Decision::Satisfied) => match self.model_found(listener) {
                    ModelOutcome::Done => return LoopRes::SAT,
                    ModelOutcome::Contradiction => return LoopRes::UnSAT,
                    ModelOutcome::Blocked => {}
                },
            }
        }
    }

    fn propagate_learn_backtrack(
        &mut self,
        learnt: &mut LearningGuard,
        restart: &mut RestartTimer,
        listener: &mut dyn SearchListener,
    ) -> bool {
        while let Some(confl) = self.bt.propagate() {
            match self.ctx.handle_conflict(learnt, &mut self.bt, confl, listener) {
                None => {
                    return false;
                }
                Some((_, lit, reason, lbd)) => {
                    restart.new_conflict(lbd);
                    self.bt.assigns.assign_lit(lit, reason);
                    for &cr in reason.iter() {
                        self.bt.attach(cr);
                    }
                }
            }
        }
        true
    }

    /// A complete, consistent assignment was just reached. Snapshot it,
    /// offer a listener the chance to force a blocking clause (model
    /// enumeration), and cancel back to the ground level either way.
    fn model_found(&mut self, listener: &mut dyn SearchListener) -> ModelOutcome {
        let model = extract_model(&self.bt.assigns);
        let decisions: Vec<Lit> = self.bt.assigns.trail()
            .iter()
            .cloned()
            .filter(|&lit| {
                let vd = self.bt.assigns.vardata(lit);
                vd.reason.is_none() && !vd.level.is_ground()
            })
            .collect();

        let blocking = listener.on_solution_found(self.bt.assigns.trail());

        self.ctx.last_model = Some(model);
        self.ctx.last_decisions = decisions;

        self.cancel_until(GROUND_LEVEL, listener);

        match blocking {
            None => ModelOutcome::Done,
            Some(clause) => {
                for &lit in &clause {
                    listener.on_adding(lit);
                }
                match self.add_clause(&clause) {
                    AddClauseRes::UnSAT => ModelOutcome::Contradiction,
                    AddClauseRes::Consumed | AddClauseRes::Added(_) => ModelOutcome::Blocked,
                }
            }
        }
    }

    // Description:
    //   Simplify the clause database according to the current top-level assigment. Currently, the only
    //   thing done here is the removal of satisfied clauses, but more things can be put here.
    fn try_simplify(&mut self, listener: &mut dyn SearchListener) {
        if !self.bt.assigns.is_ground_level()
            || self.ctx.simp.skip(self.bt.assigns.number_of_assigns(), self.bt.propagations())
        {
            return;
        }

        let mut detach = Vec::new();
        self.ctx.db.remove_satisfied(&mut self.bt.ca, &self.bt.assigns, |c| {
            detach.push(c.head_pair());
        });
        for (c0, c1) in detach {
            self.bt.lazy_detach(c0, c1);
        }

        self.try_garbage_collect(listener);

        self.ctx.heur.rebuild_order_heap(&self.bt.assigns);
        self.ctx.simp.set_next(
            self.bt.assigns.number_of_assigns(),
            self.bt.propagations(),
            self.ctx.db.stats.clauses_literals + self.ctx.db.stats.learnts_literals,
        ); // (shouldn't depend on stats really, but it will do for now)
    }

    fn reduce_db(&mut self) {
        let mut detach = Vec::new();
        self.ctx.db.reduce(&mut self.bt.ca, &self.bt.assigns, |c| {
            detach.push(c.head_pair());
        });
        for (c0, c1) in detach {
            self.bt.lazy_detach(c0, c1);
        }
    }

    // Revert to the state at given level (keeping all assignment at 'level' but not beyond).
    fn cancel_until(&mut self, target_level: DecisionLevel, listener: &mut dyn SearchListener) {
        self.ctx.cancel_until(&mut self.bt.assigns, target_level, listener);
    }

    fn try_garbage_collect(&mut self, listener: &mut dyn SearchListener) {
        if self.bt.ca.check_garbage(self.settings.garbage_frac) {
            listener.on_cleaning();
            self.garbage_collect();
        }
    }

    fn garbage_collect(&mut self) {
        let before = self.bt.ca.size();
        let mut gc = self.bt.reloc_gc();
        self.ctx.db.gc(&mut gc);

        debug!(
            "|  Garbage collection:   {:12} clauses => {:12} clauses             |",
            before,
            self.bt.ca.size()
        );
    }

    /// The model from the most recent `SAT` result, external-indexed
    /// (`VarMap<bool>` keyed by every known variable).
    pub fn model(&self) -> Option<&VarMap<bool>> {
        self.ctx.last_model.as_ref()
    }

    /// The assumption subset responsible for the most recent `UnSAT`
    /// result, valid until the next `search` call.
    pub fn unsat_explanation(&self) -> Option<&LitMap<()>> {
        self.ctx.unsat_explanation.as_ref()
    }

    pub fn last_status(&self) -> SolveStatus {
        self.ctx.last_status
    }

    /// Starting from the decisions behind the last model, drop every
    /// decision literal that is entailed by the rest: a literal is
    /// redundant exactly when the remaining literals together with its
    /// negation are unsatisfiable (dropping an assumption can never turn a
    /// satisfiable formula unsatisfiable, so testing plain satisfiability of
    /// the shrunk set would never keep anything). Internal solves use an
    /// unbounded budget; should they fail to settle, that is an internal
    /// error, not a legitimate timeout (the formula is already known
    /// satisfiable).
    pub fn prime_implicant(&mut self, ss: &SearchSettings) -> Vec<Lit> {
        if self.ctx.last_model.is_none() {
            return Vec::new();
        }

        let mut kept: Vec<Lit> = self.ctx.last_decisions.clone();
        let mut i = 0;
        while i < kept.len() {
            let lit = kept[i];
            let mut trial = kept.clone();
            trial.remove(i);
            trial.push(!lit);

            let budget = Budget::new();
            match self.search(ss, &budget, &trial, &mut NullListener) {
                SearchRes::UnSAT(_) => {
                    // The rest of `kept` already forces `lit`; redundant.
                    kept.remove(i);
                }
                SearchRes::SAT(_) => {
                    // `lit` is not implied by the rest; keep it.
                    i += 1;
                }
                SearchRes::Interrupted(_) => {
                    panic!("prime_implicant: internal solve under an unbounded budget timed out");
                }
            }
        }

        kept
    }

    pub fn stats(&self) -> sat::Stats {
        sat::Stats {
            solves: self.ctx.stats.solves,
            restarts: self.ctx.stats.starts,
            decisions: self.ctx.stats.decisions,
            rnd_decisions: self.ctx.heur.rnd_decisions,
            conflicts: self.ctx.stats.conflicts,
            propagations: self.bt.propagations(),
            tot_literals: self.ctx.analyze.tot_literals,
            del_literals: self.ctx.analyze.max_literals - self.ctx.analyze.tot_literals,
        }
    }
}


fn is_implied(search: &mut Searcher, c: &[Lit]) -> bool {
    assert!(search.bt.assigns.is_ground_level());

    search.bt.assigns.new_decision_level();
    for &lit in c.iter() {
        match search.bt.assigns.value(lit) {
            LBool::True => {
                search.cancel_until(GROUND_LEVEL, &mut NullListener);
                return true;
            }
            LBool::Undef => {
                search.bt.assigns.assign_lit(!lit, None);
            }
            LBool::False => {}
        }
    }

    let result = search.bt.propagate().is_some();
    search.cancel_until(GROUND_LEVEL, &mut NullListener);
    result
}
