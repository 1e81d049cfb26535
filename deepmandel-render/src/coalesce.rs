/// Where the build pipeline currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildState {
    /// No build running; the next request starts immediately.
    #[default]
    Idle,
    /// A build is running and nothing is waiting behind it.
    InFlight,
    /// A build is running and exactly one follow-up is queued.
    InFlightPending,
}

/// Collapses build requests so at most one follow-up is ever queued.
///
/// An in-flight build always runs to completion; there is no cancellation.
/// Any number of requests arriving while one is in flight coalesce into a
/// single pending marker, which fires exactly one rebuild when the current
/// build finishes.
#[derive(Debug, Default)]
pub struct Coalescer {
    state: BuildState,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == BuildState::Idle
    }

    /// Record a build request. Returns `true` when the build should start
    /// now; `false` when it was deferred behind the in-flight build.
    pub fn request(&mut self) -> bool {
        match self.state {
            BuildState::Idle => {
                self.state = BuildState::InFlight;
                true
            }
            BuildState::InFlight | BuildState::InFlightPending => {
                self.state = BuildState::InFlightPending;
                false
            }
        }
    }

    /// Record that the in-flight build completed. Returns `true` when the
    /// single deferred follow-up should start now.
    pub fn finish(&mut self) -> bool {
        match self.state {
            BuildState::InFlightPending => {
                self.state = BuildState::InFlight;
                true
            }
            BuildState::InFlight => {
                self.state = BuildState::Idle;
                false
            }
            // A completion with nothing in flight is a caller bug, but is
            // harmless to absorb.
            BuildState::Idle => false,
        }
    }
}
