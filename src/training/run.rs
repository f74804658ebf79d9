use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai::linear::LinearQ;
use crate::ai::network::QNetwork;
use crate::config::AppConfig;
use crate::error::{ApproximatorError, RunError};
use crate::sim::pawn::PawnKind;
use crate::sim::world::World;
use crate::training::metrics::{MatchResult, TrainingMetrics};

/// Heroes learn on their own network; all minions pool into a shared one.
pub const HERO_NET: usize = 0;
pub const MINION_NET: usize = 1;

const HERO_WEIGHTS: &str = "hero.json";
const MINION_WEIGHTS: &str = "minion.json";

/// Run the full training loop: matches back to back until the tick budget
/// is spent, with periodic gradient steps and status lines.
pub fn train(config: &AppConfig) -> Result<(), RunError> {
    let mut rng = match config.training.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut nets = vec![
        QNetwork::new(
            &config.dqn,
            Box::new(LinearQ::new(config.dqn.learning_rate, &mut rng)),
        ),
        QNetwork::new(
            &config.dqn,
            Box::new(LinearQ::new(config.dqn.learning_rate, &mut rng)),
        ),
    ];

    if let Some(dir) = &config.training.weights_dir {
        load_weights(&mut nets, dir)?;
    }

    let mut metrics = TrainingMetrics::new();
    let mut clock: u64 = 0;
    let mut epoch: u64 = 0;

    println!("Starting training for {} ticks...", config.training.iterations);
    println!("-------------------------------------------");

    while clock < config.training.iterations {
        let mut world = new_match(config, &mut rng)?;

        while !world.quit && clock < config.training.iterations {
            world.tick(&mut nets, &mut rng)?;
            clock += 1;

            if clock % config.training.train_interval == 0 {
                for net in nets.iter_mut() {
                    net.train(&mut rng)?;
                }
            }
            if clock % config.training.log_interval == 0 {
                let hero = &nets[HERO_NET];
                let scores = metrics.scores();
                println!(
                    "Tick {}/{} | epoch {} | eps: {:.3} | age: {} | replay: {} | score: {} : {} | avg_len: {:.1}",
                    clock,
                    config.training.iterations,
                    epoch,
                    hero.epsilon().get(),
                    hero.epsilon().age(),
                    hero.replay().len(),
                    scores[0],
                    scores[1],
                    metrics.average_match_length(100),
                );
            }
        }

        // Tick budget ran out mid-match; score it as a draw.
        if !world.quit {
            world.finish(&mut nets, &mut rng)?;
        }
        metrics.record_match(MatchResult {
            winner: world.winner,
            length: world.clock,
        });
        epoch += 1;
    }

    if let Some(dir) = &config.training.weights_dir {
        save_weights(&nets, dir)?;
    }

    println!("-------------------------------------------");
    let scores = metrics.scores();
    println!(
        "Training complete. Matches: {} | score: {} : {} | draws: {:.1}%",
        metrics.total_matches(),
        scores[0],
        scores[1],
        metrics.draw_rate(metrics.total_matches()) * 100.0,
    );
    Ok(())
}

fn new_match(config: &AppConfig, rng: &mut StdRng) -> Result<World, RunError> {
    let mut world = World::new(&config.world);
    for team in 0..2 {
        for _ in 0..config.world.minions_per_team {
            world.spawn(PawnKind::Minion, team, MINION_NET, rng)?;
            world.spawn(PawnKind::RangeMinion, team, MINION_NET, rng)?;
        }
    }
    for team in 0..2 {
        world.spawn(PawnKind::Hero, team, HERO_NET, rng)?;
    }
    Ok(world)
}

fn load_weights(nets: &mut [QNetwork], dir: &Path) -> Result<(), RunError> {
    for (net, file) in nets.iter_mut().zip([HERO_WEIGHTS, MINION_WEIGHTS]) {
        let path = dir.join(file);
        if path.exists() {
            net.load_weights(&path)?;
            println!("Loaded weights from {}", path.display());
        }
    }
    Ok(())
}

fn save_weights(nets: &[QNetwork], dir: &Path) -> Result<(), RunError> {
    std::fs::create_dir_all(dir).map_err(|e| ApproximatorError::WeightsWrite {
        path: dir.to_path_buf(),
        source: e,
    })?;
    for (net, file) in nets.iter().zip([HERO_WEIGHTS, MINION_WEIGHTS]) {
        let path = dir.join(file);
        net.save_weights(&path)?;
        println!("Saved weights to {}", path.display());
    }
    Ok(())
}
