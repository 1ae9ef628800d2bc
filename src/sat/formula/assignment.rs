use super::clause::ClauseRef;
use super::{LBool, Lit, Var, VarMap};


/// Decision level `0` is the ground level: facts assigned there hold under
/// every assumption and survive `rewind_until_level`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash)]
pub struct DecisionLevel(u32);

pub const GROUND_LEVEL: DecisionLevel = DecisionLevel(0);

impl DecisionLevel {
    #[inline]
    pub fn is_ground(self) -> bool {
        self == GROUND_LEVEL
    }

    #[inline]
    fn offset(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn from_usize(n: usize) -> DecisionLevel {
        DecisionLevel(n as u32)
    }
}


#[derive(Clone, Copy, Debug)]
pub struct VarData {
    pub level: DecisionLevel,
    pub reason: Option<ClauseRef>,
}


/// The trail: every literal assigned so far, in assignment order, together
/// with the decision-level boundaries and the propagation queue cursor.
pub struct Assignment {
    assigns: VarMap<LBool>,
    vardata: VarMap<VarData>,
    trail: Vec<Lit>,
    lim: Vec<usize>, // lim[i] = trail index at which decision level i+1 begins
    qhead: usize,
    n_vars: usize,
}

impl Assignment {
    pub fn new() -> Self {
        Assignment {
            assigns: VarMap::new(),
            vardata: VarMap::new(),
            trail: Vec::new(),
            lim: Vec::new(),
            qhead: 0,
            n_vars: 0,
        }
    }

    pub fn new_var(&mut self) -> Var {
        let v = Var::from_index(self.n_vars);
        self.n_vars += 1;
        self.assigns.insert(&v, LBool::Undef);
        self.vardata.insert(
            &v,
            VarData {
                level: GROUND_LEVEL,
                reason: None,
            },
        );
        v
    }

    #[inline]
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    #[inline]
    pub fn is_undef(&self, v: Var) -> bool {
        self.assigns[&v].is_undef()
    }

    #[inline]
    pub fn value(&self, lit: Lit) -> LBool {
        lit.apply_sign(self.assigns[&lit.var()])
    }

    #[inline]
    pub fn is_assigned_pos(&self, lit: Lit) -> bool {
        self.value(lit) == LBool::True
    }

    #[inline]
    pub fn is_assigned_neg(&self, lit: Lit) -> bool {
        self.value(lit) == LBool::False
    }

    #[inline]
    pub fn vardata(&self, lit: Lit) -> &VarData {
        &self.vardata[&lit.var()]
    }

    #[inline]
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Every literal assigned strictly above `level`, oldest first.
    pub fn trail_above(&self, level: DecisionLevel) -> &[Lit] {
        let from = self.lim.get(level.offset()).copied().unwrap_or(self.trail.len());
        &self.trail[from..]
    }

    #[inline]
    pub fn current_level(&self) -> DecisionLevel {
        DecisionLevel(self.lim.len() as u32)
    }

    #[inline]
    pub fn is_ground_level(&self) -> bool {
        self.lim.is_empty()
    }

    #[inline]
    pub fn number_of_assigns(&self) -> usize {
        self.trail.len()
    }

    pub fn new_decision_level(&mut self) {
        self.lim.push(self.trail.len());
    }

    /// Assign `lit` true, recording `reason` (`None` for a decision).
    pub fn assign_lit(&mut self, lit: Lit, reason: Option<ClauseRef>) {
        let v = lit.var();
        debug_assert!(self.is_undef(v));
        self.assigns[&v] = lit.pos_assignment();
        self.vardata[&v] = VarData {
            level: self.current_level(),
            reason,
        };
        self.trail.push(lit);
    }

    /// Next fact to propagate, advancing the queue cursor.
    pub fn dequeue(&mut self) -> Option<Lit> {
        if self.qhead < self.trail.len() {
            let lit = self.trail[self.qhead];
            self.qhead += 1;
            Some(lit)
        } else {
            None
        }
    }

    /// Drop every remaining fact from the propagation queue without
    /// unassigning it; used when a conflict is found mid-propagation.
    pub fn dequeue_all(&mut self) {
        self.qhead = self.trail.len();
    }

    /// True if `cr` is currently the reason clause for `lit`'s assignment,
    /// meaning it may not be deleted from the clause database.
    pub fn is_reason_for(&self, cr: ClauseRef, lit: Lit) -> bool {
        self.is_assigned_pos(lit) && self.vardata(lit).reason == Some(cr)
    }

    /// Undo every assignment made at a decision level above `target`,
    /// invoking `undo` once per unassigned literal (most recent first) so
    /// the caller can restore heuristic state (phase saving, VSIDS heap).
    pub fn rewind_until_level<F: FnMut(Lit)>(&mut self, target: DecisionLevel, mut undo: F) {
        if self.current_level() <= target {
            return;
        }

        let bound = self.lim[target.offset()];
        for i in (bound..self.trail.len()).rev() {
            let lit = self.trail[i];
            self.assigns[&lit.var()] = LBool::Undef;
            undo(lit);
        }

        self.trail.truncate(bound);
        self.lim.truncate(target.offset());
        self.qhead = bound;
    }

    /// Remap every reason `ClauseRef` still referenced from the trail
    /// through a `reloc_gc` pass, dropping references into now-deleted
    /// clauses (that can only happen for already-satisfied root-level
    /// facts, whose reason no longer matters).
    pub fn reloc_gc(&mut self, gc: &super::clause::ClauseGC) {
        for &lit in self.trail.iter() {
            let v = lit.var();
            if let Some(cr) = self.vardata[&v].reason {
                self.vardata[&v].reason = gc.relocate(cr);
            }
        }
    }

    /// A rough [0, 1) estimate of how much of the search space has been
    /// explored, used only for the periodic progress log line.
    pub fn progress_estimate(&self) -> f64 {
        if self.n_vars == 0 {
            return 0.0;
        }

        let mut progress = 0.0;
        let levels = self.lim.len();
        for i in 0..=levels {
            let lo = if i == 0 { 0 } else { self.lim[i - 1] };
            let hi = if i == levels { self.trail.len() } else { self.lim[i] };
            progress += (hi - lo) as f64 / (1u64 << i.min(63)) as f64;
        }
        progress / self.n_vars as f64
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_and_rewind() {
        let mut a = Assignment::new();
        let v0 = a.new_var();
        let v1 = a.new_var();

        a.assign_lit(v0.pos_lit(), None);
        assert!(a.is_ground_level());

        a.new_decision_level();
        a.assign_lit(v1.neg_lit(), None);
        assert_eq!(a.current_level(), DecisionLevel(1));
        assert!(a.is_assigned_pos(v0.pos_lit()));
        assert!(a.is_assigned_neg(v1.pos_lit()));

        let mut undone = Vec::new();
        a.rewind_until_level(GROUND_LEVEL, |lit| undone.push(lit));
        assert_eq!(undone, vec![v1.neg_lit()]);
        assert!(a.is_undef(v1));
        assert!(a.is_assigned_pos(v0.pos_lit()));
        assert!(a.is_ground_level());
    }

    #[test]
    fn test_dequeue() {
        let mut a = Assignment::new();
        let v0 = a.new_var();
        a.assign_lit(v0.pos_lit(), None);
        assert_eq!(a.dequeue(), Some(v0.pos_lit()));
        assert_eq!(a.dequeue(), None);
    }
}
