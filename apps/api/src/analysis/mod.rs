// Analysis pipeline: provider cascade over the normalizer, with the heuristic scorer as floor.

pub mod cascade;
pub mod heuristic;
pub mod normalizer;
pub mod prompts;
