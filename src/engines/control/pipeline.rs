use super::{
    FixedSizeSetWorstFitnessDeletion, InadequateClassifierDeletion, PopulationControlStrategy,
};
use crate::classifiers::ClassifierSet;
use crate::config::PopulationConfig;
use crate::error::Result;
use rand::rngs::StdRng;

/// Runs several control strategies in order
#[derive(Default)]
pub struct ControlPipeline {
    stages: Vec<Box<dyn PopulationControlStrategy>>,
}

impl ControlPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: Box<dyn PopulationControlStrategy>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn push(&mut self, stage: Box<dyn PopulationControlStrategy>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Training-time pipeline: inadequate-rule deletion (when configured) then
    /// fixed-size deletion
    pub fn from_config(config: &PopulationConfig, rng: StdRng) -> Self {
        let mut pipeline = Self::new();
        if let Some(min_instances) = config.inadequate_min_instances {
            pipeline.push(Box::new(InadequateClassifierDeletion::new(min_instances)));
        }
        pipeline.push(Box::new(FixedSizeSetWorstFitnessDeletion::new(
            config.max_population,
            config.deletion_selector(),
            rng,
        )));
        pipeline
    }
}

impl PopulationControlStrategy for ControlPipeline {
    fn control_population(&mut self, population: &mut ClassifierSet) -> Result<usize> {
        let mut removed = 0;
        for stage in &mut self.stages {
            removed += stage.control_population(population)?;
        }
        Ok(removed)
    }
}
