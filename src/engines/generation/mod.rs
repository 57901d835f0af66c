pub mod operators;
pub mod selection;
pub mod steady_state;

pub use operators::{
    splice_at, BinaryGeneticOperator, SinglePointCrossover, UnaryGeneticOperator, UniformBitMutation,
};
pub use selection::{
    AllSelector, BestClassifierSelector, NaturalSelector, RouletteWheelSelector, SelectionCount,
    ThresholdSelector, TournamentSelector, TournamentSize,
};
pub use steady_state::{EvolutionOutcome, GeneticAlgorithmStrategy, SteadyStateGeneticAlgorithm};
