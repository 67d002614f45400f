use std::thread;
use std::time::Duration;

use anyhow::Context;
use log::{info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use dvnet::sim::{ScenarioSpec, Simulation};

fn main() -> anyhow::Result<()> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let path = std::env::args()
        .nth(1)
        .context("usage: dvnet <scenario.json>")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let scenario: ScenarioSpec =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;

    let mut sim = Simulation::build(&scenario.topology)?;
    sim.start()?;

    info!("letting routing tables converge for {}ms", scenario.settle_ms);
    thread::sleep(Duration::from_millis(scenario.settle_ms));

    let hosts: Vec<_> = scenario
        .topology
        .hosts
        .iter()
        .filter_map(|name| sim.host(name).cloned())
        .collect();

    for msg in &scenario.messages {
        let host = sim
            .host(&msg.from)
            .with_context(|| format!("message from unknown host {}", msg.from))?;
        host.send(&msg.to, &msg.payload);
        thread::sleep(Duration::from_millis(scenario.drain_ms));
    }

    let routers = sim.shutdown();
    info!("all simulation threads joined");

    for router in &routers {
        info!("{}: routing table\n{}", router.name(), router.routes());
    }
    for host in &hosts {
        while let Some(pkt) = host.poll_delivered() {
            info!("{}: delivered {:?}", host.address(), pkt.payload);
        }
    }
    Ok(())
}
