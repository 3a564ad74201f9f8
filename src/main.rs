use std::time::Instant;

use bumper_royale::{Action, Simulation, SimulationConfig};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn main() -> Result<(), bumper_royale::Error> {
    env_logger::init();

    let config = SimulationConfig {
        seed: Some(0),
        ..Default::default()
    };
    let n_agents = config.n_agents;
    let mut sim = Simulation::new(config)?;
    let mut rng = StdRng::seed_from_u64(1);

    println!("Simulating...");
    const NUM_EPISODES: usize = 20;
    let mut total_frames: u32 = 0;
    let start = Instant::now();
    for episode in 0..NUM_EPISODES {
        sim.reset()?;
        loop {
            let actions = (0..n_agents)
                .map(|_| Action::new(rng.gen_range(0..Action::COUNT)))
                .collect::<Result<Vec<_>, _>>()?;
            let result = sim.step(&actions)?;
            total_frames += 1;
            if result.done {
                info!("episode {} ended on frame {}", episode, sim.frame());
                break;
            }
        }
    }

    let frame = start.elapsed() / total_frames;
    println!(
        "Avg. frame: {:?} --> {:.0}x realtime ({} frames, {} vehs)",
        frame,
        sim.config().dt() / frame.as_secs_f64(),
        total_frames,
        n_agents,
    );
    Ok(())
}
