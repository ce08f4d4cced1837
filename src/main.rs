use anyhow::{bail, Context};
use std::path::PathBuf;
use tierbias::config::{AppConfig, ConfigManager};
use tierbias::engines::evaluation::{strategy_file, Evaluator, Workflow, WorkflowEvaluator};
use tierbias::engines::generation::{run_optimization, ConsoleProgressCallback};

const USAGE: &str = "usage: tierbias <workflow.json> [--config config.toml] [--out strategy.tsv] [--evaluate strategy.tsv]";

struct Args {
    workflow: PathBuf,
    config: Option<PathBuf>,
    out: PathBuf,
    evaluate: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut workflow = None;
    let mut config: Option<PathBuf> = None;
    let mut out = PathBuf::from("strategy.tsv");
    let mut evaluate: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(args.next().context(USAGE)?.into()),
            "--out" => out = args.next().context(USAGE)?.into(),
            "--evaluate" => evaluate = Some(args.next().context(USAGE)?.into()),
            "-h" | "--help" => bail!(USAGE),
            _ if workflow.is_none() => workflow = Some(PathBuf::from(&arg)),
            other => bail!("unexpected argument '{}'\n{}", other, USAGE),
        }
    }

    Ok(Args {
        workflow: workflow.context(USAGE)?,
        config,
        out,
        evaluate,
    })
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    let manager = ConfigManager::new();
    if let Some(path) = path {
        manager
            .load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    Ok(manager.get())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = parse_args()?;
    let config = load_config(args.config.as_ref())?;

    let workflow = Workflow::load(&args.workflow)?;
    log::info!("Processing workflow {}", args.workflow.display());

    let mut evaluator = WorkflowEvaluator::new(workflow, config.storage.clone())?;
    let slot_count = evaluator.decision_slot_count();
    log::info!("Workflow needs {} tier decisions", slot_count);

    if let Some(path) = &args.evaluate {
        let assignment = strategy_file::read_strategy(path)?;
        let evaluation = evaluator.evaluate(&assignment)?;
        log::info!("Elapsed time for {}: {:.6} s", path.display(), evaluation.elapsed);
        println!("{}", evaluation.elapsed);
        return Ok(());
    }

    let layout = evaluator.layout().clone();
    let result = run_optimization(
        config.evolution.clone(),
        slot_count,
        evaluator,
        &mut ConsoleProgressCallback,
    )?;

    log::info!(
        "Best elapsed {:.6} s (fitness {:.6}) found at generation {}",
        result.elapsed,
        result.fitness,
        result.generation_found
    );
    strategy_file::write_strategy(&args.out, &layout, &result)
        .with_context(|| format!("writing {}", args.out.display()))?;
    log::info!("Strategy written to {}", args.out.display());

    Ok(())
}
