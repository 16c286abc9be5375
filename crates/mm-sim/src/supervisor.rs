//! The `Supervisor` struct and its tick loop.

use rustc_hash::FxHashMap;

use mm_core::{NodeId, SimClock, SimConfig, Tick, UserId};
use mm_demand::{DemandManager, User};
use mm_decision::DecisionModel;
use mm_flow::{Fleet, FlowMotor, Services, UserFlow};
use mm_graph::MultiLayerGraph;
use mm_routing::{shortest_path, Path, RoutingError};

use crate::error::SimResult;
use crate::observer::SimObserver;

/// The simulation orchestrator: owns the clock and drives the five-step
/// tick loop over demand, routing, decision, user flow, and the flow motor.
///
/// Create via [`SupervisorBuilder`][crate::SupervisorBuilder].
pub struct Supervisor<D: DemandManager, M: DecisionModel> {
    /// Global configuration (total ticks, seed, tick duration, …).
    pub config: SimConfig,

    /// Simulation clock — advanced exclusively here, once per tick.
    pub clock: SimClock,

    /// The composite graph.  Read-only during the loop.
    pub graph: MultiLayerGraph,

    /// Zone reservoirs and vehicle advancement.
    pub flow: FlowMotor,

    /// Traveler state machine.
    pub user_flow: UserFlow,

    /// All vehicles.  Mutated by user flow (step ③) and the motor (step ④).
    pub fleet: Fleet,

    /// Per-layer mobility services.
    pub services: Services,

    /// The demand source.
    pub demand: D,

    /// The mode/path choice model.
    pub decision: M,

    /// Cost name used for all routing queries.
    pub cost_name: String,

    /// Per-traveler OD access nodes, wired by the builder before tick 0.
    pub(crate) od_nodes: FxHashMap<UserId, (NodeId, NodeId)>,

    /// Demand reported dropped after the loop (departure ≥ end time).
    pub(crate) dropped: Vec<User>,
}

impl<D: DemandManager, M: DecisionModel> Supervisor<D, M> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            let released = self.process_tick(now, observer)?;
            observer.on_tick_end(now, released);
            if self.config.output_interval_ticks > 0
                && now.0.is_multiple_of(self.config.output_interval_ticks)
            {
                observer.on_snapshot(now, &self.flow, &self.user_flow, &self.fleet);
            }
            self.clock.advance();
        }

        // Demand past the end time is dropped and reported, never released.
        let dropped = self.demand.next_departures(self.config.end_tick(), Tick(u64::MAX));
        if !dropped.is_empty() {
            log::warn!(
                "{} travelers depart at or after the end time; dropping",
                dropped.len()
            );
            observer.on_dropped(&dropped);
            self.dropped = dropped;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            let released = self.process_tick(now, observer)?;
            observer.on_tick_end(now, released);
            self.clock.advance();
        }
        Ok(())
    }

    /// Demand reported dropped at the end of [`run`](Self::run).
    pub fn dropped(&self) -> &[User] {
        &self.dropped
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<usize> {
        // ── ① Release newly due demand ────────────────────────────────────
        let mut released = self.demand.next_departures(now, now + 1);
        released.sort_by_key(|u| u.id);
        let released_count = released.len();

        // ── ② Route and decide ────────────────────────────────────────────
        //
        // Candidate computation is read-only over the graph and fans out per
        // traveler with the `parallel` feature; binding runs sequentially in
        // ascending user id order either way, so results never depend on
        // completion order.
        let routed = self.route_released(released)?;
        let mut bound = Vec::with_capacity(routed.len());
        for (mut user, candidates) in routed {
            if candidates.is_empty() {
                log::warn!("traveler {}: no feasible route; will be stuck", user.label);
                bound.push(user);
                continue;
            }
            match self.decision.choose(&user, &candidates) {
                Ok(index) => {
                    let path = candidates
                        .into_iter()
                        .nth(index)
                        .expect("decision index in range");
                    user.set_path(path);
                    observer.on_path_chosen(&user);
                }
                Err(e) => {
                    log::warn!("traveler {}: {e}; will be stuck", user.label);
                }
            }
            bound.push(user);
        }

        // ── ③ User flow ───────────────────────────────────────────────────
        let dt = self.clock.dt_secs();
        self.user_flow
            .step(dt, bound, &self.graph, &self.services, &mut self.fleet, now);

        // ── ④ Flow motor ──────────────────────────────────────────────────
        self.flow.update(dt, &mut self.fleet, &self.graph);

        Ok(released_count)
    }

    /// Compute candidate paths for every released traveler.
    fn route_released(&self, released: Vec<User>) -> SimResult<Vec<(User, Vec<Path>)>> {
        #[cfg(not(feature = "parallel"))]
        {
            released
                .into_iter()
                .map(|user| {
                    let candidates = self.candidates_for(&user)?;
                    Ok((user, candidates))
                })
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            released
                .into_par_iter()
                .map(|user| {
                    let candidates = self.candidates_for(&user)?;
                    Ok((user, candidates))
                })
                .collect()
        }
    }

    /// One shortest path per mobility option of `user`; unreachable options
    /// drop out, invalid cost data aborts the run.
    fn candidates_for(&self, user: &User) -> SimResult<Vec<Path>> {
        let Some(&(origin, destination)) = self.od_nodes.get(&user.id) else {
            return Ok(Vec::new());
        };

        let all = self.graph.all_layers();
        let options = if user.options.is_empty() {
            std::slice::from_ref(&all)
        } else {
            user.options.as_slice()
        };

        let mut candidates = Vec::with_capacity(options.len());
        for &layers in options {
            let view = self.graph.available_subgraph(layers);
            match shortest_path(&view, origin, destination, &self.cost_name) {
                Ok(path) => candidates.push(path),
                Err(RoutingError::Unreachable { .. }) => {}
                Err(e @ RoutingError::InvalidCost { .. }) => return Err(e.into()),
            }
        }
        Ok(candidates)
    }
}
