//! Process-wide pipeline state

use capture::Rect;
use std::sync::atomic::{AtomicBool, Ordering};

/// Where the first result window opens before the user moves it
pub const DEFAULT_RESULT_BOUNDS: Rect = Rect {
    x: 500,
    y: 360,
    width: 1000,
    height: 200,
};

/// Pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    /// Ready for a trigger
    Idle,
    /// A capture/recognize/translate cycle is in flight
    Running,
}

/// Region and window placement shared across cycles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    /// Capture region, fixed after the startup selection
    region: Rect,
    /// Bounds the next result window opens at
    pub last_bounds: Rect,
}

impl PipelineState {
    pub fn new(region: Rect) -> Self {
        Self {
            region,
            last_bounds: DEFAULT_RESULT_BOUNDS,
        }
    }

    pub fn region(&self) -> Rect {
        self.region
    }
}

/// Single-flight gate: at most one cycle holds a [`RunGuard`] at a time
#[derive(Debug, Default)]
pub struct RunGate {
    busy: AtomicBool,
}

impl RunGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle → Running, or `None` if a cycle is already running
    pub fn try_begin(&self) -> Option<RunGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard { busy: &self.busy })
    }

    pub fn phase(&self) -> PipelinePhase {
        if self.busy.load(Ordering::Acquire) {
            PipelinePhase::Running
        } else {
            PipelinePhase::Idle
        }
    }
}

/// Returns the gate to Idle when dropped, whatever way the cycle ended
#[derive(Debug)]
pub struct RunGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_guard_drops() {
        let gate = RunGate::new();
        assert_eq!(gate.phase(), PipelinePhase::Idle);

        let guard = gate.try_begin();
        assert!(guard.is_some());
        assert_eq!(gate.phase(), PipelinePhase::Running);
        assert!(gate.try_begin().is_none());

        drop(guard);
        assert_eq!(gate.phase(), PipelinePhase::Idle);
        assert!(gate.try_begin().is_some());
    }

    #[test]
    fn new_state_uses_default_bounds() {
        let state = PipelineState::new(Rect::new(1, 2, 3, 4));
        assert_eq!(state.region(), Rect::new(1, 2, 3, 4));
        assert_eq!(state.last_bounds, DEFAULT_RESULT_BOUNDS);
    }
}
