pub mod fixed_size;
pub mod inadequate;
pub mod pipeline;
pub mod post_process;
pub mod sort;

pub use fixed_size::FixedSizeSetWorstFitnessDeletion;
pub use inadequate::InadequateClassifierDeletion;
pub use pipeline::ControlPipeline;
pub use post_process::PostProcessPopulationControl;
pub use sort::SortPopulationControl;

use crate::classifiers::ClassifierSet;
use crate::error::Result;

/// Post-hoc pruning or reordering policy over a whole population
///
/// Invoked by the training loop between or after update cycles. Returns the
/// number of individuals removed.
pub trait PopulationControlStrategy: Send {
    fn control_population(&mut self, population: &mut ClassifierSet) -> Result<usize>;
}
