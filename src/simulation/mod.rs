//! Multi-peer training loop over a toy target-matching task

pub mod peer;
pub mod progress;
pub mod task;

pub use peer::{Peer, PeerSummary};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, ProgressCallback, ProgressMessage};
pub use task::TargetTask;

use crate::config::AppConfig;
use crate::error::Result;
use crate::exchange::{InProcessSocket, RuleSocket};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Peers sharing one in-process socket and one task
pub struct Simulation {
    config: AppConfig,
    task: Arc<TargetTask>,
    socket: Arc<dyn RuleSocket>,
    peers: Vec<Peer>,
}

impl Simulation {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;

        let base_seed = config.simulation.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(base_seed);
        let task = Arc::new(TargetTask::random(
            config.simulation.chromosome_size,
            config.simulation.match_radius,
            &mut rng,
        ));

        let socket: Arc<dyn RuleSocket> =
            InProcessSocket::new(config.exchange.collision_policy, config.exchange.allow_router_aliases);

        let peers = (0..config.simulation.peers)
            .map(|index| {
                // Each peer draws from its own stream
                let seed = base_seed.wrapping_add((index as u64 + 1) * 1_000);
                Peer::new(format!("peer-{}", index), Arc::clone(&task), &config, &socket, seed)
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "Simulation ready: {} peers, target {}, seed {}",
            peers.len(),
            task.target(),
            base_seed
        );

        Ok(Self {
            config,
            task,
            socket,
            peers,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn task(&self) -> &TargetTask {
        &self.task
    }

    pub fn socket(&self) -> &Arc<dyn RuleSocket> {
        &self.socket
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Train every peer for one epoch in parallel
    pub fn train_epoch(&mut self) -> Result<Vec<PeerSummary>> {
        let iterations = self.config.simulation.iterations_per_epoch;
        self.peers
            .par_iter_mut()
            .map(|peer| peer.train_epoch(iterations))
            .collect()
    }

    /// Every peer broadcasts once, in order; returns the total number of
    /// deliveries. A peer whose fan-out fails is logged and skipped.
    pub fn exchange(&self) -> Result<usize> {
        let mut deliveries = 0;
        for peer in &self.peers {
            match peer.send_rules() {
                Ok(delivered) => deliveries += delivered,
                Err(e) => log::warn!("Exchange from '{}' incomplete: {}", peer.name(), e),
            }
        }
        Ok(deliveries)
    }

    pub fn run<C: ProgressCallback>(&mut self, callback: &mut C) -> Result<Vec<PeerSummary>> {
        let interval = self.config.exchange.exchange_interval;
        let mut summaries = Vec::new();

        for epoch in 0..self.config.simulation.epochs {
            callback.on_epoch_start(epoch);
            summaries = self.train_epoch()?;
            callback.on_epoch_complete(epoch, &summaries);

            if self.peers.len() > 1 && (epoch + 1) % interval == 0 {
                let deliveries = self.exchange()?;
                callback.on_exchange(epoch, deliveries);
            }
        }
        Ok(summaries)
    }

    /// Post-process and sort every population
    pub fn finalize(&self) -> Result<Vec<PeerSummary>> {
        self.peers.iter().map(|peer| peer.finalize(&self.config)).collect()
    }

    /// Write one JSON snapshot per peer into `dir`
    pub fn save_snapshots<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        self.peers
            .iter()
            .map(|peer| {
                let path = dir.join(format!("{}.json", peer.name()));
                peer.snapshot().save_to_file(&path)?;
                Ok(path)
            })
            .collect()
    }
}
