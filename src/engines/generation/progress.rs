use super::statistics::GenerationStatistics;
use log::{debug, info};
use std::sync::mpsc::Sender;

pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(
        &mut self,
        generation: usize,
        stats: &GenerationStatistics,
        best_ever_fitness: f64,
    );
    fn on_genome_evaluated(&mut self, genome_num: usize, total: usize);
}

/// Reports progress through the `log` facade.
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        debug!("Generation {} starting...", generation);
    }

    fn on_generation_complete(
        &mut self,
        generation: usize,
        stats: &GenerationStatistics,
        best_ever_fitness: f64,
    ) {
        info!(
            "Generation {} complete. best {:.6} worst {:.6} avg {:.6} total {:.4} | best ever {:.6}",
            generation, stats.best, stats.worst, stats.average, stats.total, best_ever_fitness
        );
    }

    fn on_genome_evaluated(&mut self, genome_num: usize, total: usize) {
        if genome_num % 50 == 0 || genome_num == total {
            debug!("  Evaluated {}/{} genomes", genome_num, total);
        }
    }
}

// For consumers on another thread
pub struct ChannelProgressCallback {
    sender: Sender<ProgressMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressMessage {
    GenerationStart(usize),
    GenerationComplete {
        generation: usize,
        stats: GenerationStatistics,
        best_ever_fitness: f64,
    },
    GenomeEvaluated { current: usize, total: usize },
}

impl ChannelProgressCallback {
    pub fn new(sender: Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        let _ = self.sender.send(ProgressMessage::GenerationStart(generation));
    }

    fn on_generation_complete(
        &mut self,
        generation: usize,
        stats: &GenerationStatistics,
        best_ever_fitness: f64,
    ) {
        let _ = self.sender.send(ProgressMessage::GenerationComplete {
            generation,
            stats: *stats,
            best_ever_fitness,
        });
    }

    fn on_genome_evaluated(&mut self, genome_num: usize, total: usize) {
        let _ = self.sender.send(ProgressMessage::GenomeEvaluated {
            current: genome_num,
            total,
        });
    }
}
