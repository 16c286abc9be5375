//! Fluent builder for constructing a [`Supervisor`].

use rustc_hash::FxHashMap;

use mm_core::{Mode, NodeId, SimConfig, UserId};
use mm_demand::DemandManager;
use mm_decision::DecisionModel;
use mm_flow::{Fleet, FlowMotor, Services, UserFlow};
use mm_graph::{MultiLayerGraph, COST_TIME};

use crate::error::SimResult;
use crate::supervisor::Supervisor;

/// Fluent builder for [`Supervisor<D, M>`].
///
/// # Required inputs
///
/// - [`SimConfig`] — total ticks, seed, tick duration, …
/// - [`MultiLayerGraph`] — fully assembled layers and transfers
/// - [`FlowMotor`] — with reservoirs registered for the graph's zones
/// - `D: DemandManager`, `M: DecisionModel`
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                   |
/// |------------------|---------------------------|
/// | `.services(s)`   | empty registry            |
/// | `.walk_speed(v)` | 1.42 m/s                  |
/// | `.cost_name(n)`  | `"time"`                  |
///
/// `build()` wires every demand endpoint into the graph's OD access layer,
/// so the graph stays read-only for the whole tick loop.
pub struct SupervisorBuilder<D: DemandManager, M: DecisionModel> {
    config: SimConfig,
    graph: MultiLayerGraph,
    flow: FlowMotor,
    demand: D,
    decision: M,
    services: Services,
    walk_speed: f64,
    cost_name: String,
}

impl<D: DemandManager, M: DecisionModel> SupervisorBuilder<D, M> {
    /// Create a builder with all required inputs.
    pub fn new(
        config: SimConfig,
        graph: MultiLayerGraph,
        flow: FlowMotor,
        demand: D,
        decision: M,
    ) -> Self {
        Self {
            config,
            graph,
            flow,
            demand,
            decision,
            services: Services::new(),
            walk_speed: 1.42,
            cost_name: COST_TIME.to_owned(),
        }
    }

    /// Register the per-layer mobility services.  Vehicular layers without a
    /// service leave their riders stuck, which `build()` warns about.
    pub fn services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    /// Walking speed (m/s) for access and walk legs.
    pub fn walk_speed(mut self, walk_speed: f64) -> Self {
        self.walk_speed = walk_speed;
        self
    }

    /// Cost name used for every routing query (default `"time"`).
    pub fn cost_name(mut self, cost_name: &str) -> Self {
        self.cost_name = cost_name.to_owned();
        self
    }

    /// Wire OD access for the whole demand set and assemble the supervisor.
    pub fn build(self) -> SimResult<Supervisor<D, M>> {
        let Self {
            config,
            mut graph,
            flow,
            demand,
            decision,
            services,
            walk_speed,
            cost_name,
        } = self;

        for layer in graph.layers() {
            if layer.mode != Mode::Walk && !services.contains(layer.id) {
                log::warn!(
                    "layer {:?} ({}) has no mobility service; its riders will be stuck",
                    layer.label,
                    layer.mode
                );
            }
        }

        // ── Materialize the OD access layer ───────────────────────────────
        //
        // One origin and one destination node per traveler, wired before the
        // loop so the graph never mutates inside a tick.
        let index = graph.roads.spatial_index();
        let mut od_nodes: FxHashMap<UserId, (NodeId, NodeId)> = FxHashMap::default();
        for (user, origin, destination) in demand.endpoints() {
            let origin_pos = origin.pos(&graph.roads);
            let destination_pos = destination.pos(&graph.roads);
            let o = graph.add_origin(&index, &format!("o{}", user.0), origin_pos)?;
            let d = graph.add_destination(&index, &format!("d{}", user.0), destination_pos)?;
            od_nodes.insert(user, (o, d));
        }
        log::info!(
            "supervisor ready: {} layers, {} composite links, {} travelers",
            graph.layers().len(),
            graph.link_count(),
            od_nodes.len()
        );

        #[cfg(feature = "parallel")]
        if let Some(threads) = config.num_threads {
            // Ignore failure: the global pool may already be initialized.
            let _ = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global();
        }

        Ok(Supervisor {
            clock: config.make_clock(),
            config,
            graph,
            flow,
            user_flow: UserFlow::new(walk_speed),
            fleet: Fleet::new(),
            services,
            demand,
            decision,
            cost_name,
            od_nodes,
            dropped: Vec::new(),
        })
    }
}
