use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use medusa::{ForceOptions, Graph, Link, Node, Simulation, SimulationPhase, Viewport};

fn linked_pair() -> Graph {
    Graph::new(
        vec![Node::new("hub"), Node::new("leaf").with_parent("hub")],
        vec![Link::new("hub", "leaf")],
    )
}

fn simulation(graph: &Graph) -> Simulation {
    Simulation::new(graph, &ForceOptions::default(), Viewport::new(800.0, 600.0)).unwrap()
}

#[test]
fn a_fresh_simulation_runs_at_full_energy() {
    let sim = simulation(&linked_pair());
    assert_eq!(sim.phase(), SimulationPhase::Running);
    assert_eq!(sim.alpha(), 1.0);
    assert_eq!(sim.alpha_target(), 0.0);
}

#[test]
fn the_simulation_settles_once_alpha_decays_under_the_minimum() {
    let mut sim = simulation(&linked_pair());
    let mut ticks = 0;
    for _ in 0..2_000 {
        ticks += 1;
        if sim.tick() == SimulationPhase::Settled {
            break;
        }
    }
    assert_eq!(sim.phase(), SimulationPhase::Settled);
    // Geometric decay reaches the floor after roughly 300 unassisted ticks.
    assert!(ticks > 100, "settled suspiciously early at tick {ticks}");
    assert!(ticks < 2_000, "never settled");

    // Settled simulations ignore further ticks.
    let frozen = sim.positions();
    assert_eq!(sim.tick(), SimulationPhase::Settled);
    assert_eq!(sim.positions(), frozen);
}

#[test]
fn the_safety_timeout_settles_a_simulation_on_wall_clock() {
    let opts = ForceOptions {
        safety_timeout: Duration::ZERO,
        ..ForceOptions::default()
    };
    let mut sim =
        Simulation::new(&linked_pair(), &opts, Viewport::new(800.0, 600.0)).unwrap();
    let seeded = sim.positions();
    assert_eq!(sim.tick(), SimulationPhase::Settled);
    // The timeout fires before integration, so nothing moved.
    assert_eq!(sim.positions(), seeded);
}

#[test]
fn stop_suspends_and_restart_resumes() {
    let mut sim = simulation(&linked_pair());
    sim.tick();
    sim.stop();
    assert_eq!(sim.phase(), SimulationPhase::Idle);

    let held = sim.positions();
    assert_eq!(sim.tick(), SimulationPhase::Idle);
    assert_eq!(sim.positions(), held);

    sim.restart();
    assert_eq!(sim.phase(), SimulationPhase::Running);
    sim.tick();
    assert_ne!(sim.positions(), held);
}

#[test]
fn dragging_pins_the_node_and_reheats_the_system() {
    let mut sim = simulation(&linked_pair());
    for _ in 0..40 {
        sim.tick();
    }

    sim.drag_start("leaf");
    assert_eq!(sim.alpha_target(), Simulation::DRAG_ALPHA_TARGET);
    let grabbed = sim.node("leaf").unwrap();
    assert_eq!(grabbed.fx, Some(grabbed.x));
    assert_eq!(grabbed.fy, Some(grabbed.y));

    sim.drag("leaf", 240.0, 180.0);
    sim.tick();
    let dragged = sim.node("leaf").unwrap();
    // The pin overrides integration exactly.
    assert_eq!(dragged.x, 240.0);
    assert_eq!(dragged.y, 180.0);
    assert_eq!(dragged.vx, 0.0);
    assert_eq!(dragged.vy, 0.0);

    sim.drag_end("leaf");
    let released = sim.node("leaf").unwrap();
    assert_eq!(released.fx, None);
    assert_eq!(released.fy, None);
    assert_eq!(sim.alpha_target(), 0.0);
}

#[test]
fn drag_events_for_unknown_ids_are_ignored() {
    let mut sim = simulation(&linked_pair());
    sim.drag_start("ghost");
    sim.drag("ghost", 1.0, 2.0);
    sim.drag_end("ghost");
    assert_eq!(sim.alpha_target(), 0.0);
    assert!(sim.node("ghost").is_none());
}

#[test]
fn a_pinned_node_never_moves_while_forces_act_on_the_rest() {
    let mut anchor = Node::new("anchor").at(120.0, 90.0);
    anchor.pin(120.0, 90.0);
    let g = Graph::new(
        vec![anchor, Node::new("free").with_parent("anchor")],
        vec![Link::new("anchor", "free")],
    );
    let mut sim = simulation(&g);
    let free_before = sim.positions()["free"];

    for _ in 0..50 {
        sim.tick();
    }
    let pos = sim.positions();
    assert_eq!(pos["anchor"].x, 120.0);
    assert_eq!(pos["anchor"].y, 90.0);
    assert_ne!(pos["free"], free_before);
}

#[test]
fn linked_nodes_are_drawn_toward_their_resting_distance() {
    let g = Graph::new(
        vec![Node::new("l").at(100.0, 300.0), Node::new("r").at(700.0, 300.0)],
        vec![Link::new("l", "r")],
    );
    let opts = ForceOptions {
        link_distance: Some(60.0),
        ..ForceOptions::default()
    };
    let mut sim = Simulation::new(&g, &opts, Viewport::new(800.0, 600.0)).unwrap();
    while sim.tick() == SimulationPhase::Running {}

    let pos = sim.positions();
    let dist = (pos["l"].x - pos["r"].x).hypot(pos["l"].y - pos["r"].y);
    // The spring pulls them far inside the initial 600; collision keeps them
    // from collapsing onto each other.
    assert!(dist < 450.0, "still {dist} apart");
    assert!(dist > 10.0, "collapsed to {dist}");
}

#[test]
fn same_seed_and_dataset_replay_identically() {
    let g = linked_pair();
    let opts = ForceOptions::default();
    let vp = Viewport::new(800.0, 600.0);
    let mut a = Simulation::new(&g, &opts, vp).unwrap();
    let mut b = Simulation::new(&g, &opts, vp).unwrap();
    for _ in 0..50 {
        a.tick();
        b.tick();
    }
    assert_eq!(a.positions(), b.positions());
}

#[test]
fn subscribers_see_every_tick_until_they_unsubscribe() {
    let mut sim = simulation(&linked_pair());
    let seen = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&seen);
    let sub = sim.on_tick(move |positions| {
        assert_eq!(positions.len(), 2);
        counter.set(counter.get() + 1);
    });

    for _ in 0..3 {
        sim.tick();
    }
    assert_eq!(seen.get(), 3);

    sim.unsubscribe(sub);
    for _ in 0..2 {
        sim.tick();
    }
    assert_eq!(seen.get(), 3);
}

#[test]
fn replacing_nodes_keeps_simulated_state_and_reheats() {
    let mut sim = simulation(&linked_pair());
    for _ in 0..50 {
        sim.tick();
    }
    assert!(sim.alpha() < 1.0);
    let kept = sim.positions()["hub"];

    let next = vec![
        Node::new("hub"),
        Node::new("leaf").with_parent("hub"),
        Node::new("extra").with_parent("hub"),
    ];
    sim.update_nodes(&next, true);

    assert_eq!(sim.alpha(), 1.0);
    assert_eq!(sim.phase(), SimulationPhase::Running);
    let pos = sim.positions();
    assert_eq!(pos["hub"], kept);
    assert!(pos.contains_key("extra"));
}

#[test]
fn suppressing_the_reheat_keeps_the_current_energy() {
    let mut sim = simulation(&linked_pair());
    for _ in 0..50 {
        sim.tick();
    }
    let alpha = sim.alpha();
    sim.update_links(vec![Link::new("leaf", "hub")], false);
    assert_eq!(sim.alpha(), alpha);
}

#[test]
fn dangling_links_are_dropped_instead_of_failing() {
    let mut sim = simulation(&linked_pair());
    sim.update_links(vec![Link::new("hub", "nobody"), Link::new("hub", "leaf")], true);
    assert_eq!(sim.tick(), SimulationPhase::Running);
}

#[test]
fn an_empty_graph_simulates_to_an_empty_position_map() {
    let mut sim = simulation(&Graph::new(Vec::new(), Vec::new()));
    assert!(sim.positions().is_empty());
    sim.tick();
    assert!(sim.positions().is_empty());
}
