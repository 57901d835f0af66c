pub mod control;
pub mod generation;
