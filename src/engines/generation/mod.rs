pub mod genome;
pub mod operators;
pub mod statistics;
pub mod progress;
pub mod optimizer;

pub use genome::{Genome, BITS_PER_SLOT};
pub use operators::{roulette_selection_gated, select_parent, SelectionMiss};
pub use optimizer::{run_optimization, GeneticOptimizer, OptimizerState};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, ProgressCallback, ProgressMessage};
pub use statistics::{BestEver, GenerationStatistics};
