use std::sync::atomic;
use std::time::Duration;


/// The two deadline flavors `isSatisfiable` can be armed with; never both at
/// once (arming one clears the other).
#[derive(Clone, Copy, Debug)]
pub enum TimeoutMode {
    None,
    Conflicts(u64),
    Time(Duration),
}

impl Default for TimeoutMode {
    fn default() -> Self {
        TimeoutMode::None
    }
}


// Resource contraints:
pub struct Budget {
    conflict_budget: i64,    // -1 means no budget.
    propagation_budget: i64, // -1 means no budget.
    deadline_s: Option<f64>, // wall-clock deadline, from time::precise_time_s()
    asynch_interrupt: atomic::AtomicBool,
}

impl Budget {
    pub fn new() -> Budget {
        Budget {
            conflict_budget: -1,
            propagation_budget: -1,
            deadline_s: None,
            asynch_interrupt: atomic::AtomicBool::new(false),
        }
    }

    /// Arm the timeout mode for the upcoming solve call. `Conflicts` and
    /// `Time` are mutually exclusive; setting one clears the other.
    pub fn set_timeout(&mut self, mode: TimeoutMode) {
        self.conflict_budget = -1;
        self.deadline_s = None;
        match mode {
            TimeoutMode::None => {}
            TimeoutMode::Conflicts(n) => {
                self.conflict_budget = n as i64;
            }
            TimeoutMode::Time(d) => {
                self.deadline_s = Some(time::precise_time_s() + d.as_secs_f64());
            }
        }
    }

    pub fn within(&self, conflicts: u64, propagations: u64) -> bool {
        !self.asynch_interrupt.load(atomic::Ordering::Relaxed)
            && (self.conflict_budget < 0 || conflicts < self.conflict_budget as u64)
            && (self.propagation_budget < 0 || propagations < self.propagation_budget as u64)
            && self.deadline_s.map_or(true, |deadline| time::precise_time_s() < deadline)
    }

    pub fn interrupted(&self) -> bool {
        self.asynch_interrupt.load(atomic::Ordering::Relaxed)
    }

    pub fn off(&mut self) {
        self.conflict_budget = -1;
        self.propagation_budget = -1;
        self.deadline_s = None;
    }
}
