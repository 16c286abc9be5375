//! Shortest-path searches over a restricted graph view.
//!
//! All four entry points share the same relaxation core: a label-setting
//! search with a `BinaryHeap<Reverse<(cost, node)>>` frontier, stale-entry
//! skipping, and predecessor-link reconstruction.
//!
//! # Determinism
//!
//! - Adjacency lists are iterated in ascending link id.
//! - Relaxation is strict (`new < old`), so among equal-cost paths the
//!   first-discovered predecessor is kept.
//! - Heap entries carry the node id as a secondary key, so equal-cost pops
//!   settle the smaller node id first.
//!
//! The same convention applies in both directions of the bidirectional
//! search, which must (and does — tested) return cost-identical results to
//! the unidirectional search.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};

use mm_core::{LinkId, NodeId};
use mm_graph::{LinkKind, SubgraphView};

use crate::error::{RoutingError, RoutingResult};
use crate::path::Path;

// ── Cost ordering ─────────────────────────────────────────────────────────────

/// `f64` cost with a total order, so it can key the frontier heap.  Costs are
/// validated non-negative before entering the heap, so NaN never appears.
#[derive(Copy, Clone, PartialEq)]
struct OrderedCost(f64);

impl Eq for OrderedCost {}

impl PartialOrd for OrderedCost {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedCost {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Look up the named cost of a link, enforcing the non-negativity contract.
///
/// OD access links default missing names to 0 (their `length`/`time` costs
/// are populated deterministically at construction; any other name is a free
/// traversal).  Every other link fails loudly on missing or negative values.
fn link_cost(view: &SubgraphView<'_>, link: LinkId, cost_name: &str) -> RoutingResult<f64> {
    let l = view.link(link);
    match l.costs.get(cost_name) {
        Some(v) if v >= 0.0 => Ok(v),
        Some(_) => Err(RoutingError::InvalidCost {
            link,
            name: cost_name.to_owned(),
        }),
        None if matches!(l.kind, LinkKind::Access) => Ok(0.0),
        None => Err(RoutingError::InvalidCost {
            link,
            name: cost_name.to_owned(),
        }),
    }
}

// ── Shared relaxation state ───────────────────────────────────────────────────

struct SearchState {
    /// Best known cost to reach each node.
    dist: Vec<f64>,
    /// Link that reached each node; `LinkId::INVALID` for unreached nodes.
    prev: Vec<LinkId>,
    heap: BinaryHeap<Reverse<(OrderedCost, NodeId)>>,
}

impl SearchState {
    fn new(node_count: usize, start: NodeId) -> Self {
        let mut dist = vec![f64::INFINITY; node_count];
        dist[start.index()] = 0.0;
        let mut heap = BinaryHeap::new();
        heap.push(Reverse((OrderedCost(0.0), start)));
        Self {
            dist,
            prev: vec![LinkId::INVALID; node_count],
            heap,
        }
    }
}

fn reconstruct(view: &SubgraphView<'_>, prev: &[LinkId], to: NodeId, cost: f64) -> Path {
    let mut links = Vec::new();
    let mut cur = to;
    loop {
        let link = prev[cur.index()];
        if link == LinkId::INVALID {
            break;
        }
        links.push(link);
        cur = view.link(link).upstream;
    }
    links.reverse();
    Path { links, cost }
}

// ── Single destination ────────────────────────────────────────────────────────

/// Dijkstra's algorithm from `from` to `to` under `cost_name`.
pub fn shortest_path(
    view: &SubgraphView<'_>,
    from: NodeId,
    to: NodeId,
    cost_name: &str,
) -> RoutingResult<Path> {
    shortest_path_astar(view, from, to, cost_name, |_| 0.0)
}

/// A* from `from` to `to`.  With an admissible, consistent `heuristic` (a
/// lower bound on the remaining cost to `to`), returns the same cost as
/// plain Dijkstra while expanding fewer nodes.  `|_| 0.0` degenerates to
/// Dijkstra.
pub fn shortest_path_astar(
    view: &SubgraphView<'_>,
    from: NodeId,
    to: NodeId,
    cost_name: &str,
    heuristic: impl Fn(NodeId) -> f64,
) -> RoutingResult<Path> {
    if from == to {
        return Ok(Path {
            links: vec![],
            cost: 0.0,
        });
    }

    let n = view.node_count();
    let mut state = SearchState::new(n, from);
    // Heap entries are ordered by f = g + h; `dist` holds g.  A settled flag
    // replaces the usual stale-entry cost comparison, which would be fragile
    // under floating-point heuristics.
    let mut settled = vec![false; n];
    state.heap.clear();
    state.heap.push(Reverse((OrderedCost(heuristic(from)), from)));

    while let Some(Reverse((_, node))) = state.heap.pop() {
        if settled[node.index()] {
            continue;
        }
        settled[node.index()] = true;
        if node == to {
            return Ok(reconstruct(view, &state.prev, to, state.dist[to.index()]));
        }

        let cost = state.dist[node.index()];
        for link in view.out_links(node) {
            let neighbor = view.link(link).downstream;
            if settled[neighbor.index()] {
                continue;
            }
            let new_cost = cost + link_cost(view, link, cost_name)?;
            if new_cost < state.dist[neighbor.index()] {
                state.dist[neighbor.index()] = new_cost;
                state.prev[neighbor.index()] = link;
                state
                    .heap
                    .push(Reverse((OrderedCost(new_cost + heuristic(neighbor)), neighbor)));
            }
        }
    }

    Err(RoutingError::Unreachable { from, to })
}

// ── Multi-destination ─────────────────────────────────────────────────────────

/// One relaxation pass from `from` producing shortest paths to every
/// *reachable* node of `targets`.
///
/// Cost is O(one search), not O(|targets|) searches: the pass runs until all
/// targets are settled or the frontier is exhausted.  Unreachable targets
/// are simply absent from the result map.
pub fn shortest_paths_to_set(
    view: &SubgraphView<'_>,
    from: NodeId,
    targets: &[NodeId],
    cost_name: &str,
) -> RoutingResult<FxHashMap<NodeId, Path>> {
    let mut pending: FxHashSet<NodeId> = targets.iter().copied().collect();
    let mut state = SearchState::new(view.node_count(), from);
    let mut settled: Vec<NodeId> = Vec::with_capacity(pending.len());

    while let Some(Reverse((OrderedCost(cost), node))) = state.heap.pop() {
        if cost > state.dist[node.index()] {
            continue;
        }
        if pending.remove(&node) {
            settled.push(node);
            if pending.is_empty() {
                break;
            }
        }

        for link in view.out_links(node) {
            let neighbor = view.link(link).downstream;
            let new_cost = cost + link_cost(view, link, cost_name)?;
            if new_cost < state.dist[neighbor.index()] {
                state.dist[neighbor.index()] = new_cost;
                state.prev[neighbor.index()] = link;
                state.heap.push(Reverse((OrderedCost(new_cost), neighbor)));
            }
        }
    }

    Ok(settled
        .into_iter()
        .map(|t| (t, reconstruct(view, &state.prev, t, state.dist[t.index()])))
        .collect())
}

// ── Bidirectional ─────────────────────────────────────────────────────────────

/// Bidirectional Dijkstra: forward search from `from`, backward search from
/// `to` over the same restricted view, meeting in the middle.
///
/// Produces cost-identical results to [`shortest_path`] for the same inputs.
pub fn bidirectional_shortest_path(
    view: &SubgraphView<'_>,
    from: NodeId,
    to: NodeId,
    cost_name: &str,
) -> RoutingResult<Path> {
    if from == to {
        return Ok(Path {
            links: vec![],
            cost: 0.0,
        });
    }

    let n = view.node_count();
    let mut fwd = SearchState::new(n, from);
    // Backward state: dist from each node *to* `to`; prev holds the link
    // leaving the node toward `to`.
    let mut bwd = SearchState::new(n, to);

    let mut best_cost = f64::INFINITY;
    let mut meeting: Option<NodeId> = None;

    loop {
        let top_f = fwd.heap.peek().map(|Reverse((OrderedCost(c), _))| *c);
        let top_b = bwd.heap.peek().map(|Reverse((OrderedCost(c), _))| *c);

        // Stop once no remaining frontier entry can improve the best meeting.
        match (top_f, top_b) {
            (None, None) => break,
            (Some(f), Some(b)) if f + b >= best_cost => break,
            (Some(f), None) if f >= best_cost => break,
            (None, Some(b)) if b >= best_cost => break,
            _ => {}
        }

        // Expand the side with the smaller frontier head; a drained side
        // yields to the other.
        let expand_forward = match (top_f, top_b) {
            (Some(f), Some(b)) => f <= b,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if expand_forward {
            let Some(Reverse((OrderedCost(cost), node))) = fwd.heap.pop() else {
                break;
            };
            if cost > fwd.dist[node.index()] {
                continue;
            }
            if bwd.dist[node.index()].is_finite() {
                let through = cost + bwd.dist[node.index()];
                if through < best_cost {
                    best_cost = through;
                    meeting = Some(node);
                }
            }
            for link in view.out_links(node) {
                let neighbor = view.link(link).downstream;
                let new_cost = cost + link_cost(view, link, cost_name)?;
                if new_cost < fwd.dist[neighbor.index()] {
                    fwd.dist[neighbor.index()] = new_cost;
                    fwd.prev[neighbor.index()] = link;
                    fwd.heap.push(Reverse((OrderedCost(new_cost), neighbor)));
                }
                // Frontier crossing: the best meeting may be found while
                // relaxing, before either side settles the node.
                let reached = fwd.dist[neighbor.index()];
                if bwd.dist[neighbor.index()].is_finite() {
                    let through = reached + bwd.dist[neighbor.index()];
                    if through < best_cost {
                        best_cost = through;
                        meeting = Some(neighbor);
                    }
                }
            }
        } else {
            let Some(Reverse((OrderedCost(cost), node))) = bwd.heap.pop() else {
                break;
            };
            if cost > bwd.dist[node.index()] {
                continue;
            }
            if fwd.dist[node.index()].is_finite() {
                let through = cost + fwd.dist[node.index()];
                if through < best_cost {
                    best_cost = through;
                    meeting = Some(node);
                }
            }
            for link in view.in_links(node) {
                let neighbor = view.link(link).upstream;
                let new_cost = cost + link_cost(view, link, cost_name)?;
                if new_cost < bwd.dist[neighbor.index()] {
                    bwd.dist[neighbor.index()] = new_cost;
                    bwd.prev[neighbor.index()] = link;
                    bwd.heap.push(Reverse((OrderedCost(new_cost), neighbor)));
                }
                let reached = bwd.dist[neighbor.index()];
                if fwd.dist[neighbor.index()].is_finite() {
                    let through = reached + fwd.dist[neighbor.index()];
                    if through < best_cost {
                        best_cost = through;
                        meeting = Some(neighbor);
                    }
                }
            }
        }
    }

    let Some(meet) = meeting else {
        return Err(RoutingError::Unreachable { from, to });
    };

    // Forward half: origin → meeting node.
    let mut path = reconstruct(view, &fwd.prev, meet, best_cost);
    // Backward half: follow the outgoing links recorded toward `to`.
    let mut cur = meet;
    loop {
        let link = bwd.prev[cur.index()];
        if link == LinkId::INVALID {
            break;
        }
        path.links.push(link);
        cur = view.link(link).downstream;
    }
    debug_assert_eq!(cur, to);
    Ok(path)
}
