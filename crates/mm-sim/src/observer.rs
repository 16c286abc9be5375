//! Simulation observer trait for progress reporting and metrics collection.

use mm_core::Tick;
use mm_demand::User;
use mm_flow::{Fleet, FlowMotor, UserFlow};

/// Callbacks invoked by [`Supervisor::run`][crate::Supervisor::run] at key
/// points in the tick loop.
///
/// All methods have default no-op implementations, and none returns a
/// result: metrics are fire-and-forget and must never block or fail the
/// simulation.  Sinks that can fail should buffer their first error for
/// inspection after the run.
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick.  `released` is the number of
    /// travelers whose demand was released this tick.
    fn on_tick_end(&mut self, _tick: Tick, _released: usize) {}

    /// Called once per traveler right after the decision model binds their
    /// chosen path.
    fn on_path_chosen(&mut self, _user: &User) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with read-only access to the flow and traveler state.
    fn on_snapshot(&mut self, _tick: Tick, _flow: &FlowMotor, _users: &UserFlow, _fleet: &Fleet) {}

    /// Called once after the loop for demand whose departure exceeded the
    /// end time.  Dropped demand is reported, never silently lost.
    fn on_dropped(&mut self, _users: &[User]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run`
/// but don't want callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
