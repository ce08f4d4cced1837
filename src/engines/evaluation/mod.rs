pub mod evaluator;
pub mod workflow;
pub mod strategy_file;

pub use evaluator::{fitness_from_time, Evaluation, Evaluator, InfeasiblePenalty, TierMapping};
pub use workflow::{preprocess, FileSpec, SlotGroup, SlotLayout, TaskSpec, Workflow, WorkflowEvaluator};
