use anyhow::Context;
use clap::{Parser, Subcommand};
use lcsevo::config::ConfigManager;
use lcsevo::simulation::{ConsoleProgressCallback, Simulation};
use std::path::PathBuf;

/// Evolve classifier populations across exchanging peers
#[derive(Parser, Debug)]
#[command(name = "lcsevo")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the multi-peer simulation
    Run {
        /// Configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of peers
        #[arg(short, long)]
        peers: Option<usize>,

        /// Number of epochs
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Random seed (default: from config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Directory to write final population snapshots into
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Write the default configuration as TOML
    InitConfig {
        /// Output file
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    match Args::parse().command {
        Commands::Run {
            config,
            peers,
            epochs,
            seed,
            snapshot,
        } => {
            let manager = ConfigManager::new();
            if let Some(path) = &config {
                manager
                    .load_from_file(path)
                    .with_context(|| format!("loading {}", path.display()))?;
            }
            manager.update(|app| {
                if let Some(peers) = peers {
                    app.simulation.peers = peers;
                }
                if let Some(epochs) = epochs {
                    app.simulation.epochs = epochs;
                }
                if seed.is_some() {
                    app.simulation.seed = seed;
                }
            })?;

            let mut simulation = Simulation::new(manager.get())?;
            simulation.run(&mut ConsoleProgressCallback)?;

            for summary in simulation.finalize()? {
                log::info!(
                    "Final [{}]: {} rules ({} individuals), best {:.3}, mean {:.3}",
                    summary.name,
                    summary.stats.macroclassifiers,
                    summary.stats.numerosity,
                    summary.stats.best_fitness,
                    summary.stats.mean_fitness
                );
            }

            if let Some(dir) = snapshot {
                let written = simulation
                    .save_snapshots(&dir)
                    .with_context(|| format!("writing snapshots to {}", dir.display()))?;
                log::info!("Wrote {} snapshots to {}", written.len(), dir.display());
            }
        }
        Commands::InitConfig { file } => {
            ConfigManager::new()
                .save_to_file(&file)
                .with_context(|| format!("writing {}", file.display()))?;
            log::info!("Default configuration written to {}", file.display());
        }
    }

    Ok(())
}
