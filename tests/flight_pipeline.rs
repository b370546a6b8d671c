//! Flight pipeline integration tests

use std::collections::{HashMap, HashSet, VecDeque};

use sortie::activity::{Activity, ActivityKind};
use sortie::flight::{FlightState, GroundState};
use sortie::graph::{NodeId, NodeKind, TriggerGraph};
use sortie::mission::{FlightRequest, Mission};
use sortie::plan::TaskKind;

/// Nodes reachable through targets and command reports
fn reachable(graph: &TriggerGraph, from: NodeId) -> HashSet<NodeId> {
    let mut reports: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for node in graph.iter() {
        for link in node.reports.iter().flatten() {
            reports.entry(link.command).or_default().push(link.target);
        }
    }

    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([from]);
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        if let Some(node) = graph.node(id) {
            queue.extend(node.targets.iter().copied());
        }
        if let Some(targets) = reports.get(&id) {
            queue.extend(targets.iter().copied());
        }
    }
    seen
}

fn nodes_of_kind(graph: &TriggerGraph, root: NodeId, kind: &str) -> Vec<NodeId> {
    graph
        .walk(root)
        .into_iter()
        .filter(|&id| graph.node(id).is_some_and(|n| n.kind.name() == kind))
        .collect()
}

#[test]
fn test_free_flight_from_ground_start() {
    let mut mission = Mission::sample(42).unwrap();
    let id = mission
        .make_flight(
            FlightRequest::new("iap29", TaskKind::Free)
                .with_planes(1)
                .with_state(FlightState::Ground(GroundState::Start)),
        )
        .unwrap();
    let flight = &mission.flights[id];
    let graph = &mission.graph;

    assert_eq!(
        flight.plan.kinds(),
        vec![
            ActivityKind::Start,
            ActivityKind::Takeoff,
            ActivityKind::Form,
            ActivityKind::Wait,
            ActivityKind::Land
        ]
    );
    let wait = flight
        .plan
        .iter()
        .find(|a| a.kind() == ActivityKind::Wait)
        .and_then(|a| a.time())
        .unwrap();
    assert!((900.0..=1800.0).contains(&wait));

    let begins = nodes_of_kind(graph, flight.group, "MissionBegin");
    let takeoffs = nodes_of_kind(graph, flight.group, "TakeOff");
    let lands = nodes_of_kind(graph, flight.group, "Land");
    assert_eq!((begins.len(), takeoffs.len(), lands.len()), (1, 1, 1));

    let from_begin = reachable(graph, begins[0]);
    assert!(from_begin.contains(&takeoffs[0]));
    assert!(from_begin.contains(&lands[0]));

    // The wait timer sits between takeoff and landing
    let wait_timer = nodes_of_kind(graph, flight.group, "Timer")
        .into_iter()
        .find(|&id| graph.node(id).and_then(|n| n.time()) == Some(wait))
        .unwrap();
    assert!(reachable(graph, takeoffs[0]).contains(&wait_timer));
    assert!(reachable(graph, wait_timer).contains(&lands[0]));
    assert!(!reachable(graph, lands[0]).contains(&takeoffs[0]));
}

#[test]
fn test_takeoff_reports_on_leader() {
    let mut mission = Mission::sample(3).unwrap();
    let id = mission
        .make_flight(FlightRequest::new("jg51", TaskKind::Patrol).with_planes(2))
        .unwrap();
    let flight = &mission.flights[id];
    let leader = flight.leader().unwrap().item;
    let entity = mission.graph.entity_of(leader).unwrap();

    let reports = mission.graph.get(entity).unwrap().reports.clone().unwrap();
    assert_eq!(reports.len(), 1);
    let takeoff = mission.graph.get(reports[0].command).unwrap();
    assert_eq!(takeoff.kind, NodeKind::TakeOff);
    assert_eq!(takeoff.objects, vec![entity]);
}

#[test]
fn test_every_plan_starts_and_terminates() {
    let requests = [
        ("jg51", TaskKind::Free),
        ("jg51", TaskKind::Patrol),
        ("jg51", TaskKind::Cover),
        ("jg51", TaskKind::Sweep),
        ("iap180", TaskKind::Patrol),
        ("jg52_rear", TaskKind::Sweep),
    ];
    for seed in 0..5 {
        let mut mission = Mission::sample(seed).unwrap();
        for (unit, task) in requests {
            let id = mission.make_flight(FlightRequest::new(unit, task)).unwrap();
            let plan = &mission.flights[id].plan;
            assert_eq!(plan.kinds().first(), Some(&ActivityKind::Start), "{unit} {task}");
            assert!(plan.is_terminated(), "{unit} {task}");
            assert_eq!(
                plan.iter().filter(|a| a.is_terminal()).count(),
                1,
                "{unit} {task}"
            );
        }
    }
}

#[test]
fn test_flight_time_is_sum_of_activities() {
    let mut mission = Mission::sample(11).unwrap();
    let id = mission
        .make_flight(FlightRequest::new("iap29", TaskKind::Sweep))
        .unwrap();
    let flight = &mission.flights[id];
    let sum: f64 = flight.plan.iter().filter_map(|a| a.time()).sum();
    assert!((flight.time - sum).abs() < 1e-6);
    assert!(flight.time > 0.0);
}

#[test]
fn test_instant_activities_have_no_virtual_points() {
    let mut mission = Mission::sample(8).unwrap();
    let id = mission
        .make_flight(FlightRequest::new("jg51", TaskKind::Patrol))
        .unwrap();
    let flight = &mission.flights[id];
    for activity in flight.plan.iter() {
        if matches!(
            activity,
            Activity::Start(_) | Activity::Takeoff(_) | Activity::Form(_) | Activity::Land(_)
        ) {
            assert_eq!(activity.make_virtual_points(&mission.config), 0);
        }
    }
}

#[test]
fn test_multi_element_ground_start_joins() {
    let mut mission = Mission::sample(21).unwrap();
    let id = mission
        .make_flight(
            FlightRequest::new("jg51", TaskKind::Sweep)
                .with_planes(6)
                .with_state(FlightState::Ground(GroundState::Runway)),
        )
        .unwrap();
    let flight = &mission.flights[id];
    assert!(flight.elements.len() >= 2);

    // Trailing elements cover the leader
    let covers = nodes_of_kind(&mission.graph, flight.group, "Cover");
    assert_eq!(covers.len(), flight.elements.len() - 1);

    // Join timer within the configured window
    let form = flight
        .plan
        .iter()
        .find_map(|a| match a {
            Activity::Form(form) => Some(form),
            _ => None,
        })
        .unwrap();
    let gate = mission.graph.get(form.gate().unwrap()).unwrap();
    let join = gate.time().unwrap();
    assert!((40.0..=60.0).contains(&join));
}

#[test]
fn test_fast_forwarded_flight_starts_midway() {
    let request = FlightRequest::new("iap29", TaskKind::Patrol);

    let mut mission = Mission::sample(4).unwrap();
    let full = mission
        .prepare_flight(&request.clone().with_state(FlightState::Air(0.0)))
        .unwrap();

    let mut mission = Mission::sample(4).unwrap();
    let id = mission
        .make_flight(request.with_state(FlightState::Air(0.5)))
        .unwrap();
    let flight = &mission.flights[id];

    assert!((flight.time - full.time / 2.0).abs() < 1.0);
    assert!(flight.is_airborne());
    assert_ne!(flight.position, full.position);
    // No takeoff for a flight that is already airborne
    assert!(nodes_of_kind(&mission.graph, flight.group, "TakeOff").is_empty());
    assert_eq!(flight.plan.kinds().last(), Some(&ActivityKind::Land));
}
