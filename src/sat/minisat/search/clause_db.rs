use std::cmp::Ordering;
use crate::sat::formula::{assignment::Assignment, clause::*, util::*, Lit};


#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ReduceStrategy {
    /// Classic MiniSat policy: once the learnt set exceeds a slowly growing
    /// cap, drop the lower (by size, then activity) half that isn't locked.
    FixedSize { base: u32, growth: f64 },
    /// Trigger a reduction whenever the allocator's footprint crosses
    /// `watermark_bytes`, sized the same way as `FixedSize` otherwise.
    Memory { watermark_bytes: usize },
    /// Glucose-style: sort surviving clauses by literal block distance
    /// instead of activity, keeping clauses with small LBD indefinitely.
    Lbd { keep_lbd_at_most: u32 },
}

impl Default for ReduceStrategy {
    fn default() -> Self {
        ReduceStrategy::FixedSize { base: 2000, growth: 1.05 }
    }
}


pub struct ClauseDBSettings {
    pub remove_satisfied: bool, // Indicates whether possibly inefficient linear scan for satisfied clauses should be performed in 'simplify'.
    pub clause_decay: f64,
    pub reduce_strategy: ReduceStrategy,
}

impl Default for ClauseDBSettings {
    fn default() -> ClauseDBSettings {
        ClauseDBSettings {
            remove_satisfied: true,
            clause_decay: 0.999,
            reduce_strategy: ReduceStrategy::default(),
        }
    }
}


#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub num_clauses: usize,
    pub num_learnts: usize,
    pub clauses_literals: u64,
    pub learnts_literals: u64,
}

impl Stats {
    fn add(&mut self, clause: &Clause) {
        match clause.header {
            ClauseHeader::Learnt { .. } => {
                self.num_learnts += 1;
                self.learnts_literals += clause.len() as u64;
            }

            ClauseHeader::Clause { .. } => {
                self.num_clauses += 1;
                self.clauses_literals += clause.len() as u64;
            }
        }
    }

    fn del(&mut self, clause: &Clause) {
        match clause.header {
            ClauseHeader::Learnt { .. } => {
                self.num_learnts -= 1;
                self.learnts_literals -= clause.len() as u64;
            }

            ClauseHeader::Clause { .. } => {
                self.num_clauses -= 1;
                self.clauses_literals -= clause.len() as u64;
            }
        }
    }
}


pub struct ClauseDB {
    pub settings: ClauseDBSettings,
    cla_inc: f64,            // Amount to bump next clause with.
    clauses: Vec<ClauseRef>, // List of problem clauses.
    learnts: Vec<ClauseRef>, // List of learnt clauses.
    pub stats: Stats,
    next_reduce: u64, // Conflict count at which the next Lbd-strategy reduce fires.
}

impl ClauseDB {
    pub fn new(settings: ClauseDBSettings) -> ClauseDB {
        ClauseDB {
            settings,
            cla_inc: 1.0,
            clauses: Vec::new(),
            learnts: Vec::new(),
            stats: Stats::default(),
            next_reduce: 5000,
        }
    }

    pub fn add_clause<'c>(&mut self, ca: &'c mut ClauseAllocator, literals: &[Lit]) -> ClauseRef {
        let header = ClauseHeader::Clause {
            abstraction:
                if ca.extra_clause_field {
                    Some(calc_abstraction(literals))
                } else {
                    None
                }
        };
        let (c, cr) = ca.alloc(literals, header);
        self.stats.add(c);
        self.clauses.push(cr);
        cr
    }

    pub fn learn_clause<'c>(&mut self, ca: &mut ClauseAllocator, literals: &[Lit]) -> ClauseRef {
        let header = ClauseHeader::Learnt { activity: 0.0, lbd: u32::MAX };
        let (c, cr) = ca.alloc(literals, header);
        self.stats.add(c);
        self.learnts.push(cr);
        self.bump_activity(ca, cr);
        cr
    }

    /// Record the literal block distance computed by conflict analysis for
    /// a freshly learnt clause. A no-op for non-learnt clauses.
    pub fn set_lbd(&self, ca: &mut ClauseAllocator, cr: ClauseRef, lbd: u32) {
        ca.edit(cr).header.set_lbd(lbd);
    }

    pub fn remove_clause(&mut self, ca: &mut ClauseAllocator, cr: ClauseRef) {
        self.stats.del(ca.view(cr));
        ca.free(cr);
    }

    pub fn edit_clause<F: FnOnce(&mut Clause) -> ()>(
        &mut self,
        ca: &mut ClauseAllocator,
        cr: ClauseRef,
        f: F,
    ) {
        let c = ca.edit(cr);
        self.stats.del(c);
        f(c);
        self.stats.add(c);
    }

    pub fn bump_activity(&mut self, ca: &mut ClauseAllocator, cr: ClauseRef) {
        let new = {
            let c = ca.edit(cr);
            if let ClauseHeader::Learnt { ref mut activity, .. } = c.header {
                let new = *activity as f64 + self.cla_inc;
                *activity = new as f32;
                new
            } else {
                return;
            }
        };

        if new > 1e20 {
            self.cla_inc *= 1e-20;
            for &cri in self.learnts.iter() {
                let c = ca.edit(cri);
                if let ClauseHeader::Learnt { ref mut activity, .. } = c.header {
                    let scaled = (*activity as f64) * 1e-20;
                    *activity = scaled as f32;
                } else {
                    panic!("Expected learnt");
                }
            }
        }
    }

    pub fn decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.settings.clause_decay;
    }

    pub fn number_of_learnts(&self) -> usize {
        self.learnts.len()
    }

    /// How many learnt clauses should survive the next `reduce`, per the
    /// configured strategy and the number of conflicts seen so far. Not
    /// meaningful under `Lbd`, which is driven by `next_reduce` instead of a
    /// clause-count cap.
    pub fn reduce_limit(&self, conflicts: u64) -> usize {
        match self.settings.reduce_strategy {
            ReduceStrategy::FixedSize { base, growth } => {
                (base as f64 * growth.powf((conflicts as f64).sqrt())) as usize
            }
            ReduceStrategy::Memory { .. } => self.learnts.len() / 2,
            ReduceStrategy::Lbd { .. } => self.learnts.len(),
        }
    }

    pub fn should_reduce(&self, ca: &ClauseAllocator, conflicts: u64) -> bool {
        match self.settings.reduce_strategy {
            ReduceStrategy::FixedSize { .. } => self.learnts.len() > self.reduce_limit(conflicts),
            ReduceStrategy::Memory { watermark_bytes } => {
                ca.len() * std::mem::size_of::<Lit>() > watermark_bytes
            }
            ReduceStrategy::Lbd { .. } => conflicts >= self.next_reduce,
        }
    }

    // Description:
    //   Remove half of the learnt clauses, minus the clauses locked by the current assignment. Locked
    //   clauses are clauses that are reason to some assignment. Binary clauses are never removed.
    pub fn reduce<F: FnMut(&Clause) -> ()>(
        &mut self,
        ca: &mut ClauseAllocator,
        assigns: &Assignment,
        mut notify: F,
    ) {
        let use_lbd = matches!(self.settings.reduce_strategy, ReduceStrategy::Lbd { .. });
        if use_lbd {
            self.next_reduce += 1000;
        }

        self.learnts.sort_by(|&rx, &ry| {
            let x = ca.view(rx);
            let y = ca.view(ry);

            if x.len() == 2 && y.len() == 2 {
                Ordering::Equal
            } else if x.len() == 2 {
                Ordering::Greater
            } else if y.len() == 2 {
                Ordering::Less
            } else if use_lbd {
                y.header.lbd().cmp(&x.header.lbd())
            } else {
                let x_activity = x.header.activity();
                let y_activity = y.header.activity();
                x_activity.partial_cmp(&y_activity).unwrap()
            }
        });

        // Don't delete binary or locked clauses. From the rest, delete clauses from the first half
        // and clauses with activity smaller than 'extra_lim' (or, under the LBD strategy, clauses
        // whose LBD exceeds the configured watermark):
        let lbd_watermark = if let ReduceStrategy::Lbd { keep_lbd_at_most } = self.settings.reduce_strategy {
            Some(keep_lbd_at_most)
        } else {
            None
        };

        {
            let index_lim = self.learnts.len() / 2;
            let extra_lim = self.cla_inc / self.learnts.len() as f64; // Remove any clause below this activity
            let stats = &mut self.stats;

            let mut i = 0;
            self.learnts.retain(move |&cr| {
                if ca.is_deleted(cr) {
                    i += 1;
                    return false;
                }

                let remove = {
                    let c = ca.view(cr);
                    let locked = assigns.is_reason_for(cr, c.head_pair().0);
                    let below_watermark = match lbd_watermark {
                        Some(max_lbd) => c.header.lbd() > max_lbd,
                        None => i < index_lim || (c.header.activity() as f64) < extra_lim,
                    };
                    let remove = c.len() > 2 && !locked && below_watermark;

                    if remove {
                        notify(c);
                        stats.del(c);
                    }

                    remove
                };

                i += 1;
                if remove {
                    ca.free(cr);
                    false
                } else {
                    true
                }
            });
        }
    }

    fn retain_clause<F: FnMut(&Clause) -> ()>(
        stats: &mut Stats,
        ca: &mut ClauseAllocator,
        assigns: &Assignment,
        notify: &mut F,
        cr: ClauseRef,
    ) -> bool {
        if ca.is_deleted(cr) {
            false
        } else if satisfied_with_assignment(ca.view(cr).lits(), assigns) {
            notify(ca.view(cr));
            stats.del(ca.view(cr));
            ca.free(cr);
            false
        } else {
            let clause = ca.edit(cr);
            retain_clause(clause, assigns);
            true
        }
    }

    pub fn remove_satisfied<F>(&mut self, ca: &mut ClauseAllocator, assigns: &Assignment, mut notify: F)
        where F: FnMut(&Clause) -> ()
    {
        // Remove satisfied clauses:
        let stats = &mut self.stats;
        self.learnts.retain(|&cr| {
            Self::retain_clause(stats, ca, assigns, &mut notify, cr)
        });

        if self.settings.remove_satisfied {
            // Can be turned off.
            self.clauses.retain(|&cr| {
                Self::retain_clause(stats, ca, assigns, &mut notify, cr)
            });
        }
    }

    pub fn gc(&mut self, gc: &mut ClauseGC) {
        // All learnt:
        {
            let mut j = 0;
            for i in 0..self.learnts.len() {
                if let Some(cr) = gc.relocate(self.learnts[i]) {
                    self.learnts[j] = cr;
                    j += 1;
                }
            }
            self.learnts.truncate(j);
        }

        // All original:
        {
            let mut j = 0;
            for i in 0..self.clauses.len() {
                if let Some(cr) = gc.relocate(self.clauses[i]) {
                    self.clauses[j] = cr;
                    j += 1;
                }
            }
            self.clauses.truncate(j);
        }
    }
}

// Drop every root-level-falsified literal past the watched pair. Safe to
// call only while both watched literals are still unassigned.
fn retain_clause(clause: &mut Clause, assigns: &Assignment) {
    assert!({
        let (c0, c1) = clause.head_pair();
        assigns.is_undef(c0.var()) && assigns.is_undef(c1.var())
    });

    clause.retain_suffix(2, |l| !assigns.is_assigned_neg(l));
}
