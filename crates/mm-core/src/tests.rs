//! Unit tests for mm-core.

use crate::{LinkId, Mode, NodeId, Point, SimClock, SimConfig, SimRng, Tick};

// ── Ids ───────────────────────────────────────────────────────────────────────

#[test]
fn id_invalid_sentinel_and_index() {
    assert_eq!(NodeId::INVALID.0, u32::MAX);
    assert_eq!(NodeId::default(), NodeId::INVALID);
    assert_eq!(NodeId(7).index(), 7);
    assert_eq!(usize::from(LinkId(3)), 3);
}

#[test]
fn id_try_from_usize() {
    assert_eq!(NodeId::try_from(12usize).unwrap(), NodeId(12));
    assert!(NodeId::try_from(usize::MAX).is_err());
}

#[test]
fn ids_order_and_display() {
    assert!(NodeId(1) < NodeId(2));
    assert_eq!(NodeId(5).to_string(), "NodeId(5)");
}

// ── Point ─────────────────────────────────────────────────────────────────────

#[test]
fn euclidean_distance() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);
    assert!((a.distance(b) - 5.0).abs() < 1e-12);
    assert_eq!(a.distance(a), 0.0);
}

// ── Tick / SimClock ───────────────────────────────────────────────────────────

#[test]
fn tick_arithmetic() {
    let t = Tick(10);
    assert_eq!(t.offset(5), Tick(15));
    assert_eq!(t + 3, Tick(13));
    assert_eq!(Tick(15) - t, 5);
    assert_eq!(Tick(15).since(t), 5);
}

#[test]
fn clock_advance_and_elapsed() {
    let mut clock = SimClock::new(60);
    assert_eq!(clock.current_tick, Tick::ZERO);
    for _ in 0..90 {
        clock.advance();
    }
    assert_eq!(clock.current_tick, Tick(90));
    assert_eq!(clock.elapsed_secs(), 5_400);
    assert_eq!(clock.elapsed_hms(), (1, 30, 0));
    assert_eq!(clock.dt_secs(), 60.0);
}

#[test]
fn clock_tick_bucketing() {
    let clock = SimClock::new(60);
    assert_eq!(clock.ticks_for_secs(61), 2); // rounds up
    assert_eq!(clock.ticks_for_secs(60), 1);
    assert_eq!(clock.tick_at_secs(61), Tick(1)); // rounds down
    assert_eq!(clock.tick_at_secs(59), Tick(0));
}

#[test]
fn config_end_tick_and_clock() {
    let config = SimConfig {
        tick_secs: 30,
        total_ticks: 100,
        seed: 1,
        num_threads: None,
        output_interval_ticks: 10,
    };
    assert_eq!(config.end_tick(), Tick(100));
    assert_eq!(config.make_clock().tick_secs, 30);
}

// ── Mode ──────────────────────────────────────────────────────────────────────

#[test]
fn mode_round_trips_through_labels() {
    for mode in Mode::ALL {
        assert_eq!(Mode::parse(mode.as_str()), Some(mode));
    }
    assert_eq!(Mode::parse("zeppelin"), None);
}

#[test]
fn walk_is_not_vehicular() {
    assert!(!Mode::Walk.is_vehicular());
    assert!(Mode::Car.is_vehicular());
    assert!(Mode::Bus.is_vehicular());
}

// ── SimRng ────────────────────────────────────────────────────────────────────

#[test]
fn same_seed_same_draws() {
    let mut a = SimRng::new(42);
    let mut b = SimRng::new(42);
    for _ in 0..10 {
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }
}

#[test]
fn streams_are_independent_and_reproducible() {
    let mut s0 = SimRng::stream(42, 0);
    let mut s1 = SimRng::stream(42, 1);
    assert_ne!(s0.random::<u64>(), s1.random::<u64>());

    let mut s0_again = SimRng::stream(42, 0);
    let mut s0_fresh = SimRng::stream(42, 0);
    assert_eq!(s0_again.random::<u64>(), s0_fresh.random::<u64>());
}

#[test]
fn gen_range_stays_in_bounds() {
    let mut rng = SimRng::new(7);
    for _ in 0..100 {
        let v = rng.gen_range(0..10u32);
        assert!(v < 10);
    }
}

#[test]
fn choose_on_empty_slice_is_none() {
    let mut rng = SimRng::new(7);
    let empty: [u8; 0] = [];
    assert!(rng.choose(&empty).is_none());
    assert!(rng.choose(&[1, 2, 3]).is_some());
}
