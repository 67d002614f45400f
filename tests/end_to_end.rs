use std::thread;
use std::time::{Duration, Instant};

use dvnet::sim::{Simulation, TopologySpec};

fn split_path_spec() -> TopologySpec {
    serde_json::from_str(
        r#"{
            "queue_capacity": 0,
            "hosts": ["H1", "H3"],
            "routers": [
                { "name": "RA", "costs": { "H1": { "0": 1 }, "RB": { "1": 5 }, "RC": { "2": 1 } } },
                { "name": "RB", "costs": { "RA": { "0": 5 }, "RD": { "1": 1 } } },
                { "name": "RC", "costs": { "RA": { "0": 1 }, "RD": { "1": 1 } } },
                { "name": "RD", "costs": { "RB": { "0": 1 }, "RC": { "1": 1 }, "H3": { "2": 3 } } }
            ],
            "links": [
                { "a": "H1", "a_interface": 0, "b": "RA", "b_interface": 0 },
                { "a": "RA", "a_interface": 1, "b": "RB", "b_interface": 0 },
                { "a": "RA", "a_interface": 2, "b": "RC", "b_interface": 0 },
                { "a": "RB", "a_interface": 1, "b": "RD", "b_interface": 0 },
                { "a": "RC", "a_interface": 1, "b": "RD", "b_interface": 1 },
                { "a": "RD", "a_interface": 2, "b": "H3", "b_interface": 0 }
            ],
            "seeds": [
                { "router": "RA", "interface": 1 },
                { "router": "RA", "interface": 2 }
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn message_crosses_the_converged_network() {
    let mut sim = Simulation::build(&split_path_spec()).unwrap();
    sim.start().unwrap();

    // let the triggered-update cascade settle
    thread::sleep(Duration::from_millis(500));

    let h1 = sim.host("H1").unwrap().clone();
    let h3 = sim.host("H3").unwrap().clone();

    // resend until delivery in case convergence needed longer than the sleep
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut delivered = None;
    'send: while Instant::now() < deadline {
        h1.send("H3", "MESSAGE");
        let wait = Instant::now() + Duration::from_millis(250);
        while Instant::now() < wait {
            if let Some(pkt) = h3.poll_delivered() {
                delivered = Some(pkt);
                break 'send;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    let pkt = delivered.expect("H3 never received the message");
    assert_eq!(pkt.payload, "MESSAGE");

    let routers = sim.shutdown();
    let ra = routers.iter().find(|r| r.name() == "RA").unwrap();
    // the cheaper RA -> RC -> RD -> H3 branch won
    assert_eq!(ra.routes().cost_to("H3"), Some(5));
    assert_eq!(ra.routes().next_hop("H3").map(String::as_str), Some("RC"));

    let rd = routers.iter().find(|r| r.name() == "RD").unwrap();
    assert_eq!(rd.routes().cost_to("H1"), Some(3));
}

#[test]
fn shutdown_joins_every_thread_and_returns_the_routers() {
    let mut sim = Simulation::build(&split_path_spec()).unwrap();
    sim.start().unwrap();
    thread::sleep(Duration::from_millis(500));

    let routers = sim.shutdown();
    assert_eq!(routers.len(), 4);
    for router in &routers {
        // every router learned a route to both hosts
        assert!(router.routes().cost_to("H1").is_some());
        assert!(router.routes().cost_to("H3").is_some());
    }
}
