use super::traits::ConfigSection;
use crate::error::LcsError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub peers: usize,
    pub epochs: usize,
    pub iterations_per_epoch: usize,
    pub chromosome_size: usize,
    /// Hamming distance within which a rule joins an instance's niche
    pub match_radius: usize,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            peers: 4,
            epochs: 20,
            iterations_per_epoch: 50,
            chromosome_size: 16,
            match_radius: 4,
            seed: Some(42),
        }
    }
}

impl ConfigSection for SimulationConfig {
    fn section_name() -> &'static str {
        "simulation"
    }

    fn validate(&self) -> Result<(), LcsError> {
        if self.peers == 0 {
            return Err(LcsError::Configuration("simulation.peers must be at least 1".to_string()));
        }
        if self.chromosome_size == 0 {
            return Err(LcsError::Configuration(
                "simulation.chromosome_size must be at least 1".to_string(),
            ));
        }
        if self.match_radius > self.chromosome_size {
            return Err(LcsError::Configuration(format!(
                "simulation.match_radius {} exceeds chromosome_size {}",
                self.match_radius, self.chromosome_size
            )));
        }
        Ok(())
    }
}
