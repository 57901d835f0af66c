use super::task::TargetTask;
use crate::classifiers::{
    BitStringRepresentation, ClassifierSet, PopulationSnapshot, PopulationStats, SharedPopulation,
};
use crate::config::AppConfig;
use crate::engines::control::{ControlPipeline, PopulationControlStrategy};
use crate::engines::generation::{EvolutionOutcome, GeneticAlgorithmStrategy, SteadyStateGeneticAlgorithm};
use crate::error::Result;
use crate::exchange::{PeerRouter, RuleDistributer, RuleRouter, RuleSocket};
use crate::types::ComparisonMode;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Noise applied to training instances drawn around the target
const INSTANCE_NOISE: f64 = 0.2;

/// What one peer did during an epoch
#[derive(Debug, Clone)]
pub struct PeerSummary {
    pub name: String,
    pub stats: PopulationStats,
    pub reproductions: usize,
    pub removed: usize,
}

/// One independently evolving population with its own GA, control pipeline,
/// exchange endpoint and random stream
pub struct Peer {
    name: String,
    population: SharedPopulation,
    genetic_algorithm: SteadyStateGeneticAlgorithm,
    control: ControlPipeline,
    distributer: Arc<RuleDistributer>,
    task: Arc<TargetTask>,
    rng: StdRng,
}

impl Peer {
    /// Build a peer and register its router on `socket` under `name`
    pub fn new(
        name: impl Into<String>,
        task: Arc<TargetTask>,
        config: &AppConfig,
        socket: &Arc<dyn RuleSocket>,
        seed: u64,
    ) -> Result<Self> {
        let name = name.into();
        let representation = Arc::new(BitStringRepresentation::new(task.target().size()));
        let population: SharedPopulation = Arc::new(Mutex::new(ClassifierSet::new(representation)));

        let mut genetic = config.genetic.clone();
        genetic.seed = Some(seed);
        let genetic_algorithm = SteadyStateGeneticAlgorithm::from_config(&genetic)?;
        let control = ControlPipeline::from_config(&config.population, StdRng::seed_from_u64(seed.wrapping_add(1)));

        let router: Arc<dyn RuleRouter> = Arc::new(PeerRouter::all_to_all());
        let distributer = RuleDistributer::from_config(
            Arc::clone(&population),
            Arc::clone(&router),
            &config.exchange,
            StdRng::seed_from_u64(seed.wrapping_add(2)),
        )
        .connect();
        socket.set_rule_router(router, &name)?;

        Ok(Self {
            name,
            population,
            genetic_algorithm,
            control,
            distributer,
            task,
            rng: StdRng::seed_from_u64(seed.wrapping_add(3)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn population(&self) -> &SharedPopulation {
        &self.population
    }

    pub fn distributer(&self) -> &Arc<RuleDistributer> {
        &self.distributer
    }

    fn lock_population(&self) -> MutexGuard<'_, ClassifierSet> {
        self.population.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Present one instance, run the GA on its niche and hold the population in bounds.
    /// Returns the GA outcome and the number of individuals deleted.
    pub fn train_iteration(&mut self) -> Result<(EvolutionOutcome, usize)> {
        let instance = self.task.sample_instance(INSTANCE_NOISE, &mut self.rng);
        let mut population = self.population.lock().unwrap_or_else(PoisonError::into_inner);

        let niche = self
            .task
            .present(&instance, &mut population, self.genetic_algorithm.timestamp())?;
        let outcome = self.genetic_algorithm.evolve_set(&niche, &mut population)?;
        let removed = self.control.control_population(&mut population)?;
        Ok((outcome, removed))
    }

    pub fn train_epoch(&mut self, iterations: usize) -> Result<PeerSummary> {
        let mut reproductions = 0;
        let mut removed = 0;
        for _ in 0..iterations {
            let (outcome, deleted) = self.train_iteration()?;
            if matches!(outcome, EvolutionOutcome::Reproduced { .. }) {
                reproductions += 1;
            }
            removed += deleted;
        }
        Ok(self.summary(reproductions, removed))
    }

    fn summary(&self, reproductions: usize, removed: usize) -> PeerSummary {
        PeerSummary {
            name: self.name.clone(),
            stats: self.stats(),
            reproductions,
            removed,
        }
    }

    pub fn stats(&self) -> PopulationStats {
        self.lock_population().stats(ComparisonMode::Exploitation)
    }

    /// Broadcast selected rules to every other peer; returns peers reached
    pub fn send_rules(&self) -> Result<usize> {
        self.distributer.send_rules()
    }

    /// Post-process then sort the population in place
    pub fn finalize(&self, config: &AppConfig) -> Result<PeerSummary> {
        let removed = {
            let mut population = self.lock_population();
            let removed = config.population.post_process_control().control_population(&mut population)?;
            config.population.sort_control().control_population(&mut population)?;
            removed
        };
        Ok(self.summary(0, removed))
    }

    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot::capture(&self.lock_population(), self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollisionPolicy;
    use crate::exchange::InProcessSocket;

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.genetic.theta_ga = 5.0;
        config.population.max_population = 30;
        config
    }

    #[test]
    fn test_epoch_respects_population_bound() {
        let socket: Arc<dyn RuleSocket> = InProcessSocket::new(CollisionPolicy::FirstWriterWins, false);
        let task = Arc::new(TargetTask::new("1111000011110000".parse().unwrap(), 4));
        let mut peer = Peer::new("A", task, &config(), &socket, 11).unwrap();

        let summary = peer.train_epoch(200).unwrap();
        assert_eq!(summary.name, "A");
        assert!(summary.reproductions > 0);
        assert!(summary.stats.numerosity <= 30);
        assert!(summary.stats.numerosity > 0);
        assert_eq!(socket.addresses(), vec!["A".to_string()]);
    }

    #[test]
    fn test_same_seed_same_population() {
        let task = Arc::new(TargetTask::new("1010101010101010".parse().unwrap(), 4));
        let run = |seed| {
            let socket: Arc<dyn RuleSocket> = InProcessSocket::new(CollisionPolicy::FirstWriterWins, false);
            let mut peer = Peer::new("A", Arc::clone(&task), &config(), &socket, seed).unwrap();
            peer.train_epoch(100).unwrap();
            peer.snapshot()
                .records
                .iter()
                .map(|record| (record.chromosome.to_string(), record.numerosity))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(3), run(3));
    }
}
