use std::num;
use super::Lit;


/// Handle into a `ClauseAllocator`. Stable across `reduce`/`remove_satisfied`
/// but invalidated across a `reloc_gc()` pass — callers must remap every
/// `ClauseRef` they hold through the returned `ClauseGC`.
pub type ClauseRef = usize;


#[derive(Clone, Copy)]
pub enum ClauseHeader {
    Clause { abstraction: Option<num::NonZeroU32> },
    /// `lbd` (literal block distance) is filled in lazily by conflict
    /// analysis; clauses that never had it computed carry `u32::MAX`, which
    /// sorts last under `ReduceStrategy::Lbd`.
    Learnt { activity: f32, lbd: u32 },
}

impl ClauseHeader {
    pub fn activity(&self) -> f32 {
        if let ClauseHeader::Learnt { activity, .. } = self {
            *activity
        } else {
            panic!("Learnt expected");
        }
    }

    pub fn lbd(&self) -> u32 {
        if let ClauseHeader::Learnt { lbd, .. } = self {
            *lbd
        } else {
            panic!("Learnt expected");
        }
    }

    pub fn set_lbd(&mut self, new_lbd: u32) {
        if let ClauseHeader::Learnt { lbd, .. } = self {
            *lbd = new_lbd;
        }
    }

    pub fn is_learnt(&self) -> bool {
        matches!(self, ClauseHeader::Learnt { .. })
    }
}


/// A clause's literals, plus header metadata (abstraction for subsumption-
/// style checks, or activity for learnt clauses). The first two literals are
/// always the pair currently watched by `watches`.
pub struct Clause {
    pub header: ClauseHeader,
    data: Vec<Lit>,
}

impl Clause {
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn lits(&self) -> &[Lit] {
        &self.data
    }

    #[inline]
    pub fn learnt(&self) -> bool {
        self.header.is_learnt()
    }

    /// The literal currently watched in slot 0.
    #[inline]
    pub fn head(&self) -> Lit {
        self.data[0]
    }

    #[inline]
    pub fn head_pair(&self) -> (Lit, Lit) {
        (self.data[0], self.data[1])
    }

    #[inline]
    pub fn swap(&mut self, i: usize, j: usize) {
        self.data.swap(i, j);
    }

    /// Search `data[from + 1 ..]` for a literal satisfying `pred`, swap it
    /// into slot `from` and return it. Used to find a fresh watch when the
    /// current one at `from` has just become false.
    pub fn pull_literal<F: Fn(Lit) -> bool>(&mut self, from: usize, pred: F) -> Option<Lit> {
        for i in (from + 1)..self.data.len() {
            if pred(self.data[i]) {
                self.data.swap(from, i);
                return Some(self.data[from]);
            }
        }
        None
    }

    /// Drop literal `p` from the clause. Only safe to call before the clause
    /// is attached to the watch lists.
    pub fn strengthen(&mut self, p: Lit) {
        if let Some(pos) = self.data.iter().position(|&l| l == p) {
            self.data.remove(pos);
        }
    }

    /// Remove every literal at index `from` or later for which `keep`
    /// returns false, preserving the relative order of the rest.
    pub fn retain_suffix<F: FnMut(Lit) -> bool>(&mut self, from: usize, mut keep: F) {
        let mut write = from;
        for read in from..self.data.len() {
            if keep(self.data[read]) {
                self.data.swap(write, read);
                write += 1;
            }
        }
        self.data.truncate(write);
    }

    pub fn calc_abstraction(&mut self) {
        if let ClauseHeader::Clause { abstraction } = &mut self.header {
            let mut a: u32 = 0;
            for &lit in &self.data {
                a |= lit.abstraction();
            }
            *abstraction = num::NonZeroU32::new(a);
        }
    }
}


/// Owns every live clause. Clauses are addressed by opaque `ClauseRef`s so
/// that `reloc_gc` can compact storage without the search driver needing to
/// know how clauses are laid out in memory.
pub struct ClauseAllocator {
    pub extra_clause_field: bool,
    slab: Vec<Option<Clause>>,
    free_count: usize,
}

impl ClauseAllocator {
    pub fn new_empty() -> Self {
        ClauseAllocator {
            extra_clause_field: false,
            slab: Vec::new(),
            free_count: 0,
        }
    }

    pub fn alloc(&mut self, lits: &[Lit], header: ClauseHeader) -> (&mut Clause, ClauseRef) {
        let cr = self.slab.len();
        let mut clause = Clause {
            header,
            data: lits.to_vec(),
        };
        if self.extra_clause_field {
            clause.calc_abstraction();
        }
        self.slab.push(Some(clause));
        (self.slab[cr].as_mut().unwrap(), cr)
    }

    #[inline]
    pub fn view(&self, cr: ClauseRef) -> &Clause {
        self.slab[cr].as_ref().expect("dereferencing a freed clause")
    }

    #[inline]
    pub fn edit(&mut self, cr: ClauseRef) -> &mut Clause {
        self.slab[cr].as_mut().expect("dereferencing a freed clause")
    }

    #[inline]
    pub fn is_deleted(&self, cr: ClauseRef) -> bool {
        match self.slab.get(cr) {
            Some(slot) => slot.is_none(),
            None => true,
        }
    }

    pub fn free(&mut self, cr: ClauseRef) {
        if self.slab[cr].take().is_some() {
            self.free_count += 1;
        }
    }

    /// Total clause count, including ones pending removal by GC.
    pub fn len(&self) -> usize {
        self.slab.len()
    }

    pub fn size(&self) -> usize {
        self.slab.len() - self.free_count
    }

    pub fn set_extra_clause_field(&mut self, extra: bool) {
        self.extra_clause_field = extra;
    }

    /// Fraction of slots that are garbage; callers use this to decide when
    /// a `reloc_gc` pass is worth its cost.
    pub fn check_garbage(&self, threshold: f64) -> bool {
        if self.slab.is_empty() {
            false
        } else {
            (self.free_count as f64) > (self.slab.len() as f64) * threshold
        }
    }

    /// Compact storage, dropping every freed clause. Returns the mapping
    /// needed to relocate any `ClauseRef`s held outside the allocator.
    pub fn reloc_gc(&mut self) -> ClauseGC {
        let mut mapping = vec![None; self.slab.len()];
        let mut new_slab = Vec::with_capacity(self.size());

        for (old_ref, slot) in self.slab.drain(..).enumerate() {
            if let Some(clause) = slot {
                let new_ref = new_slab.len();
                mapping[old_ref] = Some(new_ref);
                new_slab.push(Some(clause));
            }
        }

        self.slab = new_slab;
        self.free_count = 0;
        ClauseGC { mapping }
    }
}


pub struct ClauseGC {
    mapping: Vec<Option<ClauseRef>>,
}

impl ClauseGC {
    pub fn relocate(&self, cr: ClauseRef) -> Option<ClauseRef> {
        self.mapping.get(cr).copied().flatten()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::formula::Var;

    fn lit(i: usize, sign: bool) -> Lit {
        Var::from_index(i).sign_lit(sign)
    }

    #[test]
    fn test_alloc_and_view() {
        let mut ca = ClauseAllocator::new_empty();
        let (_, cr) = ca.alloc(&[lit(0, false), lit(1, false), lit(2, true)], ClauseHeader::Learnt { activity: 0.0, lbd: u32::MAX });
        assert_eq!(ca.view(cr).len(), 3);
        assert_eq!(ca.view(cr).head_pair(), (lit(0, false), lit(1, false)));
    }

    #[test]
    fn test_free_and_gc() {
        let mut ca = ClauseAllocator::new_empty();
        let (_, cr0) = ca.alloc(&[lit(0, false), lit(1, false)], ClauseHeader::Learnt { activity: 0.0, lbd: u32::MAX });
        let (_, cr1) = ca.alloc(&[lit(2, false), lit(3, false)], ClauseHeader::Learnt { activity: 0.0, lbd: u32::MAX });
        ca.free(cr0);
        assert!(ca.is_deleted(cr0));
        assert!(!ca.is_deleted(cr1));

        let gc = ca.reloc_gc();
        assert_eq!(gc.relocate(cr0), None);
        let new_cr1 = gc.relocate(cr1).unwrap();
        assert_eq!(ca.view(new_cr1).len(), 2);
    }

    #[test]
    fn test_pull_literal() {
        let mut ca = ClauseAllocator::new_empty();
        let (_, cr) = ca.alloc(
            &[lit(0, false), lit(1, true), lit(2, false), lit(3, false)],
            ClauseHeader::Learnt { activity: 0.0, lbd: u32::MAX },
        );
        let found = ca.edit(cr).pull_literal(1, |l| l == lit(3, false));
        assert_eq!(found, Some(lit(3, false)));
        assert_eq!(ca.view(cr).lits()[1], lit(3, false));
    }

    #[test]
    fn test_retain_suffix() {
        let mut ca = ClauseAllocator::new_empty();
        let (_, cr) = ca.alloc(
            &[lit(0, false), lit(1, false), lit(2, false), lit(3, true)],
            ClauseHeader::Clause { abstraction: None },
        );
        ca.edit(cr).retain_suffix(2, |l| l != lit(2, false));
        assert_eq!(ca.view(cr).lits(), &[lit(0, false), lit(1, false), lit(3, true)]);
    }
}
