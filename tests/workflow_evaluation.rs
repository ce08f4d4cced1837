use tierbias::config::{DecodePolicy, EvolutionConfig, StorageConfig, TierSpec};
use tierbias::engines::evaluation::{
    preprocess, strategy_file, Evaluator, InfeasiblePenalty, Workflow, WorkflowEvaluator,
};
use tierbias::engines::evaluation::workflow::accounted_size;
use tierbias::engines::generation::{run_optimization, ConsoleProgressCallback};
use tierbias::TierbiasError;

const PIPELINE: &str = r#"{
    "name": "pipeline",
    "tasks": [
        {
            "id": "split_1",
            "task_type": "split",
            "runtime": 1.0,
            "inputs": [{ "name": "raw.dat", "size": 40.0 }],
            "outputs": [
                { "name": "part_a.dat", "size": 30.0 },
                { "name": "part_b.dat", "size": 30.0 }
            ]
        },
        {
            "id": "align_1",
            "task_type": "align",
            "runtime": 2.0,
            "inputs": [{ "name": "part_a.dat", "size": 30.0 }],
            "outputs": [{ "name": "aligned_a.dat", "size": 60.0 }]
        },
        {
            "id": "align_2",
            "task_type": "align",
            "runtime": 2.0,
            "inputs": [{ "name": "part_b.dat", "size": 30.0 }],
            "outputs": [{ "name": "aligned_b.dat", "size": 60.0 }]
        },
        {
            "id": "merge_1",
            "task_type": "merge",
            "runtime": 0.5,
            "inputs": [
                { "name": "aligned_a.dat", "size": 60.0 },
                { "name": "aligned_b.dat", "size": 60.0 }
            ]
        }
    ]
}"#;

fn tight_storage() -> StorageConfig {
    StorageConfig {
        tiers: vec![
            TierSpec::new("Ramdisk", 100.0, 0.0, 1200.0),
            TierSpec::new("LocalFS", 200.0, 1e-4, 1000.0),
            TierSpec::new("Lustre", 1_000_000.0, 0.1, 600.0),
        ],
        decode_policy: DecodePolicy::Clamp,
    }
}

fn pipeline() -> Workflow {
    Workflow::from_json_str(PIPELINE).unwrap()
}

#[test]
fn test_preprocess_counts_slots() {
    let layout = preprocess(&pipeline());
    // align#1: 1 output, merge#2: none (still one slot), split#1: 2 outputs
    assert_eq!(layout.decision_slot_count(), 4);

    let align = layout.group("align#1").unwrap();
    assert_eq!(align.first_slot, 0);
    assert_eq!(align.task_count, 2);
    assert_eq!(layout.group("merge#2").unwrap().first_slot, 1);
    assert_eq!(layout.group("split#1").unwrap().first_slot, 2);
    assert_eq!(layout.group("split#1").unwrap().slot_count, 2);

    let files: Vec<String> = layout.slots().into_iter().map(|s| s.file).collect();
    assert_eq!(files, vec!["aligned_a.dat", "-", "part_a.dat", "part_b.dat"]);
}

#[test]
fn test_workflow_validation() {
    assert!(matches!(
        Workflow::from_json_str(r#"{ "tasks": [] }"#),
        Err(TierbiasError::DataLoading(_))
    ));
    assert!(Workflow::from_json_str("not json").is_err());
    let negative = r#"{ "tasks": [{ "id": "t", "task_type": "x",
        "outputs": [{ "name": "o", "size": -1.0 }] }] }"#;
    assert!(Workflow::from_json_str(negative).is_err());
}

#[test]
fn test_all_fast_beats_all_slow() {
    let mut evaluator = WorkflowEvaluator::new(pipeline(), StorageConfig::default()).unwrap();
    let fast = evaluator.evaluate(&[0, 0, 0, 0]).unwrap();
    let slow = evaluator.evaluate(&[2, 2, 2, 2]).unwrap();

    assert!(fast.elapsed < slow.elapsed);
    assert_eq!(fast.placements, Some(vec![0, 0, 0, 0]));
    // Runtimes alone add up to 5.5 s.
    assert!(fast.elapsed > 5.5);
}

#[test]
fn test_fresh_storage_per_evaluation() {
    let mut evaluator = WorkflowEvaluator::new(pipeline(), tight_storage()).unwrap();
    let first = evaluator.evaluate(&[1, 0, 0, 0]).unwrap();
    let second = evaluator.evaluate(&[1, 0, 0, 0]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_fallback_reported_in_placements() {
    let mut evaluator = WorkflowEvaluator::new(pipeline(), tight_storage()).unwrap();
    // Stage-in (40) and both parts (60) fill the 100-unit ramdisk; the
    // aligned outputs (60 each) cannot follow them there.
    let evaluation = evaluator.evaluate(&[0, 0, 0, 0]).unwrap();
    let placements = evaluation.placements.unwrap();
    assert_eq!(placements[2], 0);
    assert_eq!(placements[3], 0);
    assert_eq!(placements[0], 1);
}

#[test]
fn test_decode_policy() {
    let mut clamp = WorkflowEvaluator::new(pipeline(), StorageConfig::default()).unwrap();
    let clamped = clamp.evaluate(&[3, 3, 3, 3]).unwrap();
    let last = clamp.evaluate(&[2, 2, 2, 2]).unwrap();
    assert_eq!(clamped.elapsed, last.elapsed);

    let mut storage = StorageConfig::default();
    storage.decode_policy = DecodePolicy::Reject;
    let mut reject = WorkflowEvaluator::new(pipeline(), storage).unwrap();
    assert!(matches!(
        reject.evaluate(&[3, 0, 0, 0]),
        Err(TierbiasError::UnknownTier(3))
    ));
}

#[test]
fn test_wrong_assignment_length() {
    let mut evaluator = WorkflowEvaluator::new(pipeline(), StorageConfig::default()).unwrap();
    assert!(matches!(
        evaluator.evaluate(&[0, 0]),
        Err(TierbiasError::Evaluation(_))
    ));
}

#[test]
fn test_capacity_failure_and_penalty() {
    let storage = StorageConfig {
        tiers: vec![
            TierSpec::new("tiny", 50.0, 0.0, 100.0),
            TierSpec::new("small", 50.0, 0.0, 50.0),
        ],
        decode_policy: DecodePolicy::Clamp,
    };
    let mut evaluator = WorkflowEvaluator::new(pipeline(), storage.clone()).unwrap();
    let err = evaluator.evaluate(&[0, 0, 0, 0]).unwrap_err();
    assert!(err.is_capacity());

    let inner = WorkflowEvaluator::new(pipeline(), storage).unwrap();
    let mut penalized = InfeasiblePenalty::new(inner, 1e6).unwrap();
    assert_eq!(penalized.evaluate(&[0, 0, 0, 0]).unwrap().elapsed, 1e6);
}

#[test]
fn test_end_to_end_optimization_and_strategy_file() {
    let evaluator = WorkflowEvaluator::new(pipeline(), tight_storage()).unwrap();
    let layout = evaluator.layout().clone();
    let slots = evaluator.decision_slot_count();

    let config = EvolutionConfig {
        population_size: 20,
        num_generations: 10,
        mutation_rate: 0.1,
        max_mutation_count: 3,
        seed: Some(3),
    };
    let result = run_optimization(config, slots, evaluator, &mut ConsoleProgressCallback).unwrap();
    assert_eq!(result.assignment.len(), slots);
    assert!(result.placements.is_some());

    let text = strategy_file::render_strategy(&layout, &result).unwrap();
    let reread = strategy_file::parse_strategy(&text).unwrap();
    assert_eq!(Some(reread), result.placements);

    assert!(result.assignment.iter().all(|&value| value < 4));
    assert!(result.elapsed > 5.5);
    assert_eq!(result.fitness, 1000.0 - result.elapsed.ln());
}

#[test]
fn test_signatures_keep_type_and_input_count_apart() {
    let workflow = Workflow::from_json_str(
        r#"{ "tasks": [
            { "id": "a", "task_type": "x1", "runtime": 1.0,
              "outputs": [{ "name": "a.out", "size": 1.0 }] },
            { "id": "b", "task_type": "x", "runtime": 1.0,
              "inputs": [
                { "name": "i0", "size": 1.0 }, { "name": "i1", "size": 1.0 },
                { "name": "i2", "size": 1.0 }, { "name": "i3", "size": 1.0 },
                { "name": "i4", "size": 1.0 }, { "name": "i5", "size": 1.0 },
                { "name": "i6", "size": 1.0 }, { "name": "i7", "size": 1.0 },
                { "name": "i8", "size": 1.0 }, { "name": "i9", "size": 1.0 }
              ],
              "outputs": [{ "name": "b.out", "size": 1.0 }] }
        ] }"#,
    )
    .unwrap();

    let layout = preprocess(&workflow);
    assert_eq!(layout.groups().count(), 2);
    assert_eq!(layout.decision_slot_count(), 2);
    assert_eq!(layout.group("x1#0").unwrap().task_count, 1);
    assert_eq!(layout.group("x#10").unwrap().task_count, 1);
}

#[test]
fn test_stage_in_fallback_steers_outputs() {
    let storage = StorageConfig {
        tiers: vec![
            TierSpec::new("fast", 50.0, 0.0, 100.0),
            TierSpec::new("slow", 1000.0, 0.0, 10.0),
        ],
        decode_policy: DecodePolicy::Clamp,
    };
    let workflow = Workflow::from_json_str(
        r#"{ "tasks": [{ "id": "t", "task_type": "x",
            "inputs": [{ "name": "in.dat", "size": 60.0 }],
            "outputs": [{ "name": "out.dat", "size": 10.0 }] }] }"#,
    )
    .unwrap();
    let mut evaluator = WorkflowEvaluator::new(workflow, storage).unwrap();

    let evaluation = evaluator.evaluate(&[0]).unwrap();
    assert_eq!(evaluation.placements, Some(vec![1]));
    // Stage-in write 6, read 6, output written on the slow tier 1.
    assert_eq!(evaluation.elapsed, 13.0);
}

#[test]
fn test_small_files_take_one_unit_of_capacity() {
    assert_eq!(accounted_size(0.0), 1.0);
    assert_eq!(accounted_size(0.25), 1.0);
    assert_eq!(accounted_size(7.5), 7.5);

    let storage = StorageConfig {
        tiers: vec![
            TierSpec::new("fast", 2.5, 0.0, 100.0),
            TierSpec::new("slow", 1000.0, 0.0, 10.0),
        ],
        decode_policy: DecodePolicy::Clamp,
    };
    let workflow = Workflow::from_json_str(
        r#"{ "tasks": [{ "id": "t", "task_type": "x", "runtime": 1.0,
            "outputs": [
                { "name": "a", "size": 0.0 },
                { "name": "b", "size": 0.0 },
                { "name": "c", "size": 0.0 }
            ] }] }"#,
    )
    .unwrap();
    let mut evaluator = WorkflowEvaluator::new(workflow, storage).unwrap();

    let evaluation = evaluator.evaluate(&[0, 0, 0]).unwrap();
    assert_eq!(evaluation.placements, Some(vec![0, 0, 1]));
    // Transfer times use the real size, so only the runtime is charged.
    assert_eq!(evaluation.elapsed, 1.0);
}

#[test]
fn test_workflow_that_can_take_no_time_is_rejected() {
    let idle = r#"{ "tasks": [{ "id": "t", "task_type": "x",
        "outputs": [{ "name": "o", "size": 0.0 }] }] }"#;

    let err = WorkflowEvaluator::new(
        Workflow::from_json_str(idle).unwrap(),
        StorageConfig::default(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, TierbiasError::Configuration(_)));

    // Every tier has latency, so each candidate pays for the write.
    let storage = StorageConfig {
        tiers: vec![TierSpec::new("Lustre", 1_000_000.0, 0.01, 600.0)],
        decode_policy: DecodePolicy::Clamp,
    };
    let evaluator = WorkflowEvaluator::new(Workflow::from_json_str(idle).unwrap(), storage).unwrap();
    let config = EvolutionConfig {
        population_size: 4,
        num_generations: 2,
        mutation_rate: 0.1,
        max_mutation_count: 2,
        seed: Some(11),
    };
    let result = run_optimization(config, 1, evaluator, &mut ConsoleProgressCallback).unwrap();
    assert!(result.elapsed > 0.0);
}
