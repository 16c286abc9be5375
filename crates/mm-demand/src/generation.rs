//! Seeded synthetic demand, for examples and benchmarks.

use mm_core::{SimClock, SimRng, UserId};
use mm_graph::RoadNetwork;

use crate::user::{Endpoint, User};

/// Generate `count` travelers with uniformly random origin/destination road
/// nodes at least `min_separation` metres apart (Euclidean), departing
/// uniformly in `[window_start_secs, window_end_secs)`.
///
/// Deterministic for a given `seed`.  Labels are `"U{index}"`.
pub fn random_demand(
    roads: &RoadNetwork,
    clock: &SimClock,
    count: usize,
    window_start_secs: u64,
    window_end_secs: u64,
    min_separation: f64,
    seed: u64,
) -> Vec<User> {
    assert!(roads.node_count() >= 2, "need at least two road nodes");
    let mut rng = SimRng::new(seed);
    let mut users = Vec::with_capacity(count);

    for index in 0..count {
        // Rejection-sample an OD pair far enough apart.  Bounded retries so a
        // degenerate network (all nodes clustered) cannot hang generation.
        let mut pair = None;
        for _ in 0..1_000 {
            let o = rng.gen_range(0..roads.node_count());
            let d = rng.gen_range(0..roads.node_count());
            if o == d {
                continue;
            }
            let origin = roads.nodes()[o].id;
            let destination = roads.nodes()[d].id;
            if roads.node(origin).pos.distance(roads.node(destination).pos) >= min_separation {
                pair = Some((origin, destination));
                break;
            }
        }
        let Some((origin, destination)) = pair else {
            log::warn!("random_demand: no OD pair {min_separation} m apart; stopping at {index} travelers");
            break;
        };

        let secs = rng.gen_range(window_start_secs..window_end_secs);
        users.push(User::new(
            UserId(index as u32),
            &format!("U{index}"),
            Endpoint::Node(origin),
            Endpoint::Node(destination),
            clock.tick_at_secs(secs),
        ));
    }
    users
}
