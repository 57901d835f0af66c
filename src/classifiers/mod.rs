pub mod chromosome;
pub mod classifier;
pub mod macroclassifier;
pub mod representation;
pub mod set;
pub mod snapshot;

pub use chromosome::Chromosome;
pub use classifier::{Classifier, UpdateData};
pub use macroclassifier::Macroclassifier;
pub use representation::{BitStringRepresentation, ClassifierRepresentation};
pub use set::{ClassifierSet, PopulationStats, SharedPopulation};
pub use snapshot::{ClassifierRecord, PopulationSnapshot};
