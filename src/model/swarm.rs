//! Seeded synthetic swarm used by the headless host.
//!
//! Drones fly towards a waypoint that circles the origin. A few stragglers
//! ignore the waypoint and drift, so the main group is never the whole swarm.
//! Every fifth drone has no stable id and relies on run-local identities.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use swarmtrail_core::{AgentProvider, AgentSample, ConnectivitySource, LinkGraph};
use swarmtrail_data::{AgentId, Position};

const CRUISE_SPEED: f32 = 4.0;
const WAYPOINT_RADIUS: f32 = 40.0;
const WAYPOINT_RATE: f32 = 0.05;
const JITTER: f32 = 0.5;

#[derive(Debug, Clone)]
struct Drone {
    stable_id: Option<AgentId>,
    instance: u64,
    position: Position,
    heading: (f32, f32),
    straggler: bool,
}

pub struct SyntheticSwarm {
    drones: Vec<Drone>,
    rng: ChaCha8Rng,
    elapsed: f32,
    link_range: f32,
    links: LinkGraph,
}

impl SyntheticSwarm {
    /// Spawns `count` drones around the origin. `link_range` is the radio
    /// range used for the connectivity graph.
    pub fn new(count: usize, seed: u64, link_range: f32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let drones = (0..count)
            .map(|i| Drone {
                stable_id: (i % 5 != 4).then_some(AgentId(i as i64)),
                instance: 1000 + i as u64,
                position: Position::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(2.0..4.0),
                    rng.gen_range(-10.0..10.0),
                ),
                heading: (0.0, 0.0),
                straggler: i % 7 == 6,
            })
            .collect();

        let mut swarm = Self {
            drones,
            rng,
            elapsed: 0.0,
            link_range,
            links: LinkGraph::new(),
        };
        swarm.relink();
        swarm
    }

    pub fn len(&self) -> usize {
        self.drones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    /// Moves every drone by `dt` seconds and rebuilds the link graph.
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.elapsed += dt;
        let angle = self.elapsed * WAYPOINT_RATE;
        let waypoint = (WAYPOINT_RADIUS * angle.cos(), WAYPOINT_RADIUS * angle.sin());

        for drone in &mut self.drones {
            let jitter = (
                self.rng.gen_range(-JITTER..JITTER),
                self.rng.gen_range(-JITTER..JITTER),
            );
            if drone.straggler {
                drone.heading.0 += jitter.0 * dt;
                drone.heading.1 += jitter.1 * dt;
            } else {
                let to = (waypoint.0 - drone.position.x, waypoint.1 - drone.position.z);
                let len = (to.0 * to.0 + to.1 * to.1).sqrt().max(1e-3);
                drone.heading = (
                    to.0 / len * CRUISE_SPEED + jitter.0,
                    to.1 / len * CRUISE_SPEED + jitter.1,
                );
            }
            drone.position.x += drone.heading.0 * dt;
            drone.position.z += drone.heading.1 * dt;
        }
        self.relink();
    }

    /// Only drones with a stable id take part in the radio network; the
    /// others are classified by the recorder's own clustering fallback.
    fn relink(&mut self) {
        self.links.clear();
        let range_sq = self.link_range * self.link_range;
        let networked: Vec<(AgentId, Position)> = self
            .drones
            .iter()
            .filter_map(|d| d.stable_id.map(|id| (id, d.position)))
            .collect();
        for (i, (a, pa)) in networked.iter().enumerate() {
            self.links.add_agent(*a);
            for (b, pb) in &networked[i + 1..] {
                if pa.horizontal_distance_sq(pb) <= range_sq {
                    self.links.link(*a, *b);
                }
            }
        }
        self.links.rebuild();
    }
}

impl AgentProvider for SyntheticSwarm {
    fn list(&mut self) -> anyhow::Result<Vec<AgentSample>> {
        Ok(self
            .drones
            .iter()
            .map(|d| {
                let name = match d.stable_id {
                    Some(id) => format!("Drone {id}"),
                    None => format!("Drone #{}", d.instance),
                };
                AgentSample::new(d.stable_id, d.instance, name, d.position)
            })
            .collect())
    }

    fn connectivity(&self) -> Option<&dyn ConnectivitySource> {
        Some(&self.links)
    }
}
