// Pluggable restart policy. The search driver asks `should_restart()` once
// per propagation-settled step and feeds every learnt clause's LBD through
// `new_conflict` so the dynamic strategy has something to compare against.

use super::luby;

#[derive(Clone, Copy, Debug)]
pub enum RestartStrategy {
    /// Classic MiniSat: conflicts-to-go grows as `restart_first * luby(restart_inc, n)`.
    Luby { restart_first: f64, restart_inc: f64 },
    /// PicoSAT-style geometric growth: `restart_first * restart_inc.powi(n)`.
    Geometric { restart_first: f64, restart_inc: f64 },
    /// Glucose-style: restart whenever the recent average LBD of learnt
    /// clauses exceeds `margin` times the all-time average, once at least
    /// `window` conflicts have been seen since the last restart.
    Dynamic { window: usize, margin: f64 },
}

impl Default for RestartStrategy {
    fn default() -> Self {
        RestartStrategy::Luby { restart_first: 100.0, restart_inc: 2.0 }
    }
}

pub struct RestartTimer {
    strategy: RestartStrategy,
    restarts: u32,
    conflicts_since_restart: u64,
    recent_lbd_sum: f64,
    recent_lbd_count: u64,
    global_lbd_sum: f64,
    global_lbd_count: u64,
}

impl RestartTimer {
    pub fn new(strategy: RestartStrategy) -> Self {
        RestartTimer {
            strategy,
            restarts: 0,
            conflicts_since_restart: 0,
            recent_lbd_sum: 0.0,
            recent_lbd_count: 0,
            global_lbd_sum: 0.0,
            global_lbd_count: 0,
        }
    }

    fn conflicts_to_go(&self) -> u64 {
        match self.strategy {
            RestartStrategy::Luby { restart_first, restart_inc } => {
                (restart_first * luby::luby(restart_inc, self.restarts)) as u64
            }
            RestartStrategy::Geometric { restart_first, restart_inc } => {
                (restart_first * restart_inc.powi(self.restarts as i32)) as u64
            }
            RestartStrategy::Dynamic { .. } => u64::MAX,
        }
    }

    /// Feed the LBD of the clause just learnt. A no-op for the non-dynamic
    /// strategies, which only count conflicts.
    pub fn new_conflict(&mut self, lbd: u32) {
        self.conflicts_since_restart += 1;

        if let RestartStrategy::Dynamic { .. } = self.strategy {
            self.recent_lbd_sum += lbd as f64;
            self.recent_lbd_count += 1;
            self.global_lbd_sum += lbd as f64;
            self.global_lbd_count += 1;
        }
    }

    pub fn should_restart(&self) -> bool {
        match self.strategy {
            RestartStrategy::Dynamic { window, margin } => {
                self.recent_lbd_count >= window as u64
                    && self.global_lbd_count > 0
                    && self.recent_average() > margin * self.global_average()
            }
            _ => self.conflicts_since_restart >= self.conflicts_to_go(),
        }
    }

    fn recent_average(&self) -> f64 {
        self.recent_lbd_sum / self.recent_lbd_count as f64
    }

    fn global_average(&self) -> f64 {
        self.global_lbd_sum / self.global_lbd_count as f64
    }

    pub fn on_restart(&mut self) {
        self.restarts += 1;
        self.conflicts_since_restart = 0;
        self.recent_lbd_sum = 0.0;
        self.recent_lbd_count = 0;
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luby_grows() {
        let mut t = RestartTimer::new(RestartStrategy::Luby { restart_first: 2.0, restart_inc: 2.0 });
        assert!(!t.should_restart());
        for _ in 0..2 {
            t.new_conflict(0);
        }
        assert!(t.should_restart());
        t.on_restart();
        assert!(!t.should_restart());
    }

    #[test]
    fn test_dynamic_restarts_on_rising_lbd() {
        let mut t = RestartTimer::new(RestartStrategy::Dynamic { window: 4, margin: 1.2 });
        for _ in 0..4 {
            t.new_conflict(2);
        }
        assert!(!t.should_restart());
        for _ in 0..4 {
            t.new_conflict(10);
        }
        assert!(t.should_restart());
    }
}
