//! Air start, offmap clipping and formation integration tests

use glam::DVec3;
use proptest::prelude::*;

use sortie::activity::ActivityKind;
use sortie::core::MissionRng;
use sortie::flight::{element_states, make_formation, FlightState, GroundState};
use sortie::map::{clip_route, is_offmap, BorderPush, MapBounds, RouteEnd};
use sortie::mission::{FlightRequest, Mission};
use sortie::plan::TaskKind;

#[test]
fn test_air_start_skips_takeoff() {
    let mut mission = Mission::sample(42).unwrap();
    let id = mission
        .make_flight(
            FlightRequest::new("iap29", TaskKind::Free)
                .with_planes(1)
                .with_state(FlightState::Air(0.0)),
        )
        .unwrap();
    let flight = &mission.flights[id];
    let graph = &mission.graph;

    assert_eq!(graph.count_kind(flight.group, "TakeOff"), 0);
    assert!(flight
        .plan
        .iter()
        .filter(|a| a.kind() == ActivityKind::Takeoff)
        .all(|a| a.time().is_none()));

    // Start feeds the wait timer through the pass-through Form
    let on_start = flight.plan.start().unwrap().on_start.unwrap();
    let targets = &graph.get(on_start).unwrap().targets;
    assert_eq!(targets.len(), 1);
    let wait = graph.get(targets[0]).unwrap();
    let planned = flight
        .plan
        .iter()
        .find(|a| a.kind() == ActivityKind::Wait)
        .and_then(|a| a.time());
    assert_eq!(wait.time(), planned);
}

#[test]
fn test_offmap_unit_enters_at_border() {
    for seed in 0..10 {
        let mut mission = Mission::sample(seed).unwrap();
        let id = mission
            .make_flight(FlightRequest::new("jg52_rear", TaskKind::Sweep))
            .unwrap();
        let flight = &mission.flights[id];

        assert!(flight.is_airborne());
        assert!(!is_offmap(&mission.map, flight.position));
        assert!(flight.plan.start().unwrap().delay() > 0.0);
        assert_eq!(flight.plan.kinds().last(), Some(&ActivityKind::End));

        // The approach was flown offmap
        let fuel = flight.fuel(&mission.graph);
        assert!(fuel.iter().all(|&f| f < 1.0));
    }
}

#[test]
fn test_offmap_player_start_is_pushed_inside() {
    let mut mission = Mission::sample(5).unwrap();
    let id = mission
        .make_flight(FlightRequest::new("jg52_rear", TaskKind::Patrol).with_player())
        .unwrap();
    let flight = &mission.flights[id];
    let map = mission.map;

    let border = [
        flight.position.x - map.min().x,
        map.max().x - flight.position.x,
        flight.position.z - map.min().y,
        map.max().y - flight.position.z,
    ]
    .into_iter()
    .fold(f64::INFINITY, f64::min);
    assert!(border >= mission.config.min_border_distance - 1.0);
    assert!(!flight.virtual_flight);
}

fn map() -> MapBounds {
    MapBounds::new(100_000.0, 100_000.0, 5_000.0)
}

fn point() -> impl Strategy<Value = DVec3> {
    (-30_000.0..130_000.0f64, 500.0..4_000.0f64, -30_000.0..130_000.0f64)
        .prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

proptest! {
    #[test]
    fn prop_clipping_is_idempotent(
        route in prop::collection::vec(point(), 2..6),
        end in prop_oneof![Just(RouteEnd::Start), Just(RouteEnd::End)],
    ) {
        let map = map();
        let mut clipped = route;
        clip_route(&mut clipped, &map, end, None);

        let once = clipped.clone();
        let again = clip_route(&mut clipped, &map, end, None);
        prop_assert!(!again.is_clipped());
        prop_assert_eq!(clipped, once);
    }

    #[test]
    fn prop_pushed_start_is_a_fixed_point(
        route in prop::collection::vec(point(), 2..6),
        distance in 3_000.0..4_000.0f64,
    ) {
        let map = map();
        let push = Some(BorderPush { distance, min_border_distance: 3_000.0 });
        let mut clipped = route;
        let first = clip_route(&mut clipped, &map, RouteEnd::Start, push);
        if let (Some(point), Some(&start)) = (first.point, clipped.first()) {
            prop_assert_eq!(point, start);
            prop_assert!(!is_offmap(&map, start));
        }

        let once = clipped.clone();
        let again = clip_route(&mut clipped, &map, RouteEnd::Start, push);
        prop_assert!(!again.is_clipped());
        prop_assert_eq!(clipped, once);
    }

    #[test]
    fn prop_clipped_end_is_onmap(route in prop::collection::vec(point(), 2..6)) {
        let map = map();
        let mut clipped = route;
        clip_route(&mut clipped, &map, RouteEnd::Start, None);
        if let Some(&first) = clipped.first() {
            prop_assert!(!is_offmap(&map, first));
        }
    }

    #[test]
    fn prop_formation_sums_to_planes(planes in 1usize..=8, seed in any::<u64>()) {
        let mut rng = MissionRng::new(seed);
        let sizes = make_formation(planes, &mut rng).unwrap();
        prop_assert_eq!(sizes.iter().sum::<usize>(), planes);

        let states = element_states(sizes.len(), FlightState::Ground(GroundState::Runway), true);
        prop_assert_eq!(states.len(), sizes.len());
        prop_assert_eq!(states[0], FlightState::Ground(GroundState::Runway));
    }
}
