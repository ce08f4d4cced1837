use super::evaluator::{Evaluation, Evaluator, TierMapping};
use crate::config::{ConfigSection, StorageConfig};
use crate::engines::storage::StorageManager;
use crate::error::{Result, TierbiasError};
use crate::types::{Assignment, TierIndex};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSpec {
    pub name: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    pub task_type: String,
    /// Compute time in seconds, excluding I/O
    #[serde(default)]
    pub runtime: f64,
    #[serde(default)]
    pub inputs: Vec<FileSpec>,
    #[serde(default)]
    pub outputs: Vec<FileSpec>,
}

impl TaskSpec {
    /// Tasks of one type with the same input count share tier decisions.
    ///
    /// The separator keeps `x1` with no inputs apart from `x` with ten.
    pub fn signature(&self) -> String {
        format!("{}#{}", self.task_type, self.inputs.len())
    }

    fn files(&self) -> impl Iterator<Item = &FileSpec> {
        self.inputs.iter().chain(&self.outputs)
    }
}

/// A workflow as an ordered list of tasks. Tasks run in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub name: String,
    pub tasks: Vec<TaskSpec>,
}

impl Workflow {
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let workflow: Workflow = serde_json::from_str(contents)?;
        workflow.validate()?;
        Ok(workflow)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            TierbiasError::DataLoading(format!(
                "Failed to read workflow {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(TierbiasError::DataLoading(
                "Workflow has no tasks".to_string(),
            ));
        }
        for task in &self.tasks {
            if task.runtime < 0.0 {
                return Err(TierbiasError::DataLoading(format!(
                    "Task {} has negative runtime",
                    task.id
                )));
            }
            if let Some(file) = task
                .files()
                .find(|file| file.size < 0.0 || !file.size.is_finite())
            {
                return Err(TierbiasError::DataLoading(format!(
                    "File {} of task {} has invalid size {}",
                    file.name, task.id, file.size
                )));
            }
        }
        Ok(())
    }

    pub fn total_runtime(&self) -> f64 {
        self.tasks.iter().map(|task| task.runtime).sum()
    }

    pub fn total_file_size(&self) -> f64 {
        self.tasks
            .iter()
            .flat_map(|task| task.files())
            .map(|file| file.size)
            .sum()
    }

    fn has_files(&self) -> bool {
        self.tasks.iter().any(|task| task.files().next().is_some())
    }
}

/// Smallest capacity charge for a stored file
pub const MIN_ACCOUNTED_SIZE: f64 = 1.0;

/// Space a file occupies in a tier. Files below one unit still take one.
pub fn accounted_size(size: f64) -> f64 {
    size.max(MIN_ACCOUNTED_SIZE)
}

/// Contiguous run of decision slots owned by one task signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotGroup {
    pub signature: String,
    pub first_slot: usize,
    pub slot_count: usize,
    /// Output file names of the first task seen with this signature
    pub files: Vec<String>,
    pub task_count: usize,
}

/// Mapping from (task signature, output position) to decision slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotLayout {
    groups: BTreeMap<String, SlotGroup>,
    slot_count: usize,
}

/// Row of a slot listing
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub slot: usize,
    pub signature: String,
    pub file: String,
}

impl SlotLayout {
    pub fn decision_slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn groups(&self) -> impl Iterator<Item = &SlotGroup> {
        self.groups.values()
    }

    pub fn group(&self, signature: &str) -> Option<&SlotGroup> {
        self.groups.get(signature)
    }

    /// Slot deciding where `task` writes its output number `output`.
    ///
    /// Tasks with more outputs than the first of their signature reuse that
    /// signature's last slot.
    pub fn slot_for(&self, task: &TaskSpec, output: usize) -> Result<usize> {
        let group = self.groups.get(&task.signature()).ok_or_else(|| {
            TierbiasError::Evaluation(format!("task {} has no slot group", task.id))
        })?;
        Ok(group.first_slot + output.min(group.slot_count - 1))
    }

    pub fn slots(&self) -> Vec<SlotInfo> {
        let mut rows = Vec::with_capacity(self.slot_count);
        for group in self.groups.values() {
            for offset in 0..group.slot_count {
                rows.push(SlotInfo {
                    slot: group.first_slot + offset,
                    signature: group.signature.clone(),
                    file: group
                        .files
                        .get(offset)
                        .cloned()
                        .unwrap_or_else(|| "-".to_string()),
                });
            }
        }
        rows
    }
}

/// One pass over the task list that sizes the decision space.
///
/// Every distinct signature gets one slot per output file of the first task
/// carrying it, and at least one slot. Groups are laid out in signature
/// order so the layout does not depend on task order.
pub fn preprocess(workflow: &Workflow) -> SlotLayout {
    let mut groups: BTreeMap<String, SlotGroup> = BTreeMap::new();

    for task in &workflow.tasks {
        groups
            .entry(task.signature())
            .and_modify(|group| group.task_count += 1)
            .or_insert_with(|| SlotGroup {
                signature: task.signature(),
                first_slot: 0,
                slot_count: task.outputs.len().max(1),
                files: task.outputs.iter().map(|f| f.name.clone()).collect(),
                task_count: 1,
            });
    }

    let mut next = 0;
    for group in groups.values_mut() {
        group.first_slot = next;
        next += group.slot_count;
    }

    debug!(
        "Workflow {} has {} signatures over {} slots",
        workflow.name,
        groups.len(),
        next
    );

    SlotLayout {
        groups,
        slot_count: next,
    }
}

/// In-process workflow simulator driven by the tier cost model.
///
/// Each call builds a fresh `StorageManager`, so capacity used by one
/// candidate never leaks into the next. Tasks run in order: inputs are read
/// from wherever they live (files nobody produced are staged in first), the
/// task computes, then its outputs are written to the tier their slot asks
/// for, falling back to slower tiers when full. A fallback sticks, for
/// staged-in inputs as for outputs: later placements driven by the same slot
/// start from the tier actually used.
///
/// Capacity is charged with `accounted_size`; transfer times use the real
/// size.
pub struct WorkflowEvaluator {
    workflow: Workflow,
    layout: SlotLayout,
    storage: StorageConfig,
    mapping: TierMapping,
}

impl WorkflowEvaluator {
    pub fn new(workflow: Workflow, storage: StorageConfig) -> Result<Self> {
        workflow.validate()?;
        storage.validate()?;
        if !always_takes_time(&workflow, &storage) {
            return Err(TierbiasError::Configuration(format!(
                "Workflow {} has no runtime, no file data and can land on a \
                 zero-latency tier, so a candidate could take no time at all",
                workflow.name
            )));
        }
        let layout = preprocess(&workflow);
        let mapping = TierMapping::new(storage.tiers.len(), storage.decode_policy)?;

        Ok(Self {
            workflow,
            layout,
            storage,
            mapping,
        })
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn decision_slot_count(&self) -> usize {
        self.layout.decision_slot_count()
    }

    fn stage_in(
        &self,
        storage: &mut StorageManager,
        name: &str,
        size: f64,
        preferred: TierIndex,
    ) -> Result<(TierIndex, f64)> {
        let placed = storage.add_file(name, accounted_size(size), preferred)?;
        let write = storage.predict_write_time(size, placed.tier)?;
        Ok((placed.tier, write))
    }
}

impl Evaluator for WorkflowEvaluator {
    fn evaluate(&mut self, assignment: &[usize]) -> Result<Evaluation> {
        if assignment.len() != self.layout.decision_slot_count() {
            return Err(TierbiasError::Evaluation(format!(
                "assignment has {} slots, workflow needs {}",
                assignment.len(),
                self.layout.decision_slot_count()
            )));
        }

        let mut placements: Assignment = self.mapping.map_all(assignment)?;
        let mut storage = StorageManager::from_config(&self.storage)?;
        let mut elapsed = 0.0;

        for task in &self.workflow.tasks {
            for input in &task.inputs {
                let tier = match storage.locate(&input.name) {
                    Some(tier) => tier,
                    None => {
                        let slot = self.layout.slot_for(task, 0)?;
                        let (tier, write) =
                            self.stage_in(&mut storage, &input.name, input.size, placements[slot])?;
                        placements[slot] = tier;
                        elapsed += write;
                        tier
                    }
                };
                elapsed += storage.predict_read_time(input.size, tier)?;
            }

            elapsed += task.runtime;

            for (position, output) in task.outputs.iter().enumerate() {
                if storage.contains(&output.name) {
                    debug!("{} already stored, not written again", output.name);
                    continue;
                }
                let slot = self.layout.slot_for(task, position)?;
                let placed = storage.add_file(
                    &output.name,
                    accounted_size(output.size),
                    placements[slot],
                )?;
                placements[slot] = placed.tier;
                // Charged after the commit so a nearly full tier costs more.
                elapsed += storage.predict_write_time(output.size, placed.tier)?;
            }
        }

        Ok(Evaluation {
            elapsed,
            placements: Some(placements),
        })
    }
}

/// True when every assignment yields a positive elapsed time: some compute,
/// some bytes to move, or at least one file and no free tier to put it on.
fn always_takes_time(workflow: &Workflow, storage: &StorageConfig) -> bool {
    workflow.total_runtime() > 0.0
        || workflow.total_file_size() > 0.0
        || (workflow.has_files() && storage.tiers.iter().all(|tier| tier.latency > 0.0))
}
