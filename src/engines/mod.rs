pub mod storage;
pub mod generation;
pub mod evaluation;
