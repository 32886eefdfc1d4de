//! Level-of-detail selection with hysteresis.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::coord::DetailLevel;

/// Zoom at which overview upgrades to detailed.
pub const DETAILED_THRESHOLD: f64 = 3.0;

/// Zoom at which detailed upgrades to ultra.
pub const ULTRA_THRESHOLD: f64 = 6.0;

/// Hysteresis margin: added to the upgrade threshold and subtracted from
/// the downgrade threshold currently in effect, so a zoom value
/// oscillating narrowly around a boundary does not flap the tier.
pub const HYSTERESIS_MARGIN: f64 = 0.2;

/// Map a zoom value to a detail tier, given the tier currently shown.
///
/// Pure and stateless per call; the current tier parameter is what makes
/// the thresholds asymmetric. Upgrading past a boundary requires
/// `threshold + margin`, downgrading requires dropping below
/// `threshold - margin`.
pub fn select_level(zoom: f64, current: DetailLevel) -> DetailLevel {
    match current {
        DetailLevel::Overview => {
            if zoom >= ULTRA_THRESHOLD + HYSTERESIS_MARGIN {
                DetailLevel::Ultra
            } else if zoom >= DETAILED_THRESHOLD + HYSTERESIS_MARGIN {
                DetailLevel::Detailed
            } else {
                DetailLevel::Overview
            }
        }
        DetailLevel::Detailed => {
            if zoom >= ULTRA_THRESHOLD + HYSTERESIS_MARGIN {
                DetailLevel::Ultra
            } else if zoom < DETAILED_THRESHOLD - HYSTERESIS_MARGIN {
                DetailLevel::Overview
            } else {
                DetailLevel::Detailed
            }
        }
        DetailLevel::Ultra => {
            if zoom < DETAILED_THRESHOLD - HYSTERESIS_MARGIN {
                DetailLevel::Overview
            } else if zoom < ULTRA_THRESHOLD - HYSTERESIS_MARGIN {
                DetailLevel::Detailed
            } else {
                DetailLevel::Ultra
            }
        }
    }
}

/// Debouncing policy for tier switches.
#[derive(Debug, Clone)]
pub struct LevelGateConfig {
    /// Minimum time between committed tier changes (default: 4 s)
    pub min_dwell: Duration,
    /// How long the new tier must be continuously indicated before a
    /// switch commits (default: 2 s)
    pub stability: Duration,
}

impl Default for LevelGateConfig {
    fn default() -> Self {
        Self {
            min_dwell: Duration::from_secs(4),
            stability: Duration::from_secs(2),
        }
    }
}

/// Commits tier changes only after dwell and stability requirements.
///
/// [`select_level`] is the pure threshold function; this gate is the
/// caller-level debouncing layered on top of it by whoever orchestrates
/// repeated calls. The clock is passed in, keeping the gate testable
/// without sleeping.
#[derive(Debug)]
pub struct LevelGate {
    config: LevelGateConfig,
    committed: DetailLevel,
    candidate: Option<(DetailLevel, Instant)>,
    last_switch: Option<Instant>,
}

impl LevelGate {
    /// Create a gate committed to an initial tier.
    pub fn new(initial: DetailLevel, config: LevelGateConfig) -> Self {
        Self {
            config,
            committed: initial,
            candidate: None,
            last_switch: None,
        }
    }

    /// The currently committed tier.
    pub fn current(&self) -> DetailLevel {
        self.committed
    }

    /// Feed one zoom observation; returns the committed tier.
    pub fn observe(&mut self, zoom: f64, now: Instant) -> DetailLevel {
        let indicated = select_level(zoom, self.committed);

        if indicated == self.committed {
            self.candidate = None;
            return self.committed;
        }

        let since = match self.candidate {
            Some((level, since)) if level == indicated => since,
            _ => {
                self.candidate = Some((indicated, now));
                now
            }
        };

        let stable = now.duration_since(since) >= self.config.stability;
        let dwell_ok = self
            .last_switch
            .map_or(true, |t| now.duration_since(t) >= self.config.min_dwell);

        if stable && dwell_ok {
            debug!(from = %self.committed, to = %indicated, zoom, "Committing detail tier switch");
            self.committed = indicated;
            self.last_switch = Some(now);
            self.candidate = None;
        }

        self.committed
    }
}
