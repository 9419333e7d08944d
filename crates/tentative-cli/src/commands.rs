use std::cell::RefCell;
use std::rc::Rc;

use colored::Colorize;
use serde_json::Value;
use tentative_ledger::{
    CompositeState, Optimist, OptimistConfig, Record, TransactionId, Warning,
};

use crate::cli::*;
use crate::script;

type PatchOptimist = Optimist<fn(Option<&Record>, &Value) -> Value>;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Replay(args) => cmd_replay(args, &cli.format),
        Command::Check(args) => cmd_check(args, &cli.format),
    }
}

fn optimist(key: &str) -> PatchOptimist {
    Optimist::with_config(
        script::patch as fn(Option<&Record>, &Value) -> Value,
        OptimistConfig::keyed(key),
    )
}

fn cmd_replay(args: ReplayArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let events = script::load(&args.script)?;
    let optimist = optimist(&args.key);

    let mut state: Option<CompositeState<Value>> = None;
    for (step, event) in events.iter().enumerate() {
        let next = optimist.apply(state, event)?;
        if !args.last {
            print_step(&optimist, step + 1, event, &next, format)?;
        }
        state = Some(next);
    }

    match (&state, events.last()) {
        (Some(state), Some(event)) if args.last => {
            print_step(&optimist, events.len(), event, state, format)
        }
        (None, _) => {
            println!("Script {} has no events.", args.script.display());
            Ok(())
        }
        _ => Ok(()),
    }
}

fn print_step(
    optimist: &PatchOptimist,
    step: usize,
    event: &Value,
    state: &CompositeState<Value>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let encoded = optimist.to_value(state)?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "step": step, "state": encoded }));
        }
        OutputFormat::Text => {
            let open = optimist.open_transactions(state);
            let pending = if open.is_empty() {
                "settled".green().to_string()
            } else {
                format!("{} open", open.len()).yellow().to_string()
            };
            println!(
                "{:>4} {:<16} [{}] {}",
                step.to_string().bold(),
                script::label(event).cyan(),
                pending,
                Value::Object(state.inner().clone())
            );
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let events = script::load(&args.script)?;
    let warnings: Rc<RefCell<Vec<Warning>>> = Rc::default();
    let sink = Rc::clone(&warnings);
    let optimist = optimist(&args.key)
        .on_warning(move |warning: &Warning| sink.borrow_mut().push(warning.clone()));

    let state = optimist.apply_all(None, &events)?;
    let open: Vec<TransactionId> = state
        .as_ref()
        .map(|state| optimist.open_transactions(state))
        .unwrap_or_default();
    let warnings = warnings.borrow();

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "events": events.len(),
                "open": open,
                "warnings": warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            });
            println!("{report}");
        }
        OutputFormat::Text => {
            println!("Applied {} event(s).", events.len().to_string().bold());
            for warning in warnings.iter() {
                println!("  {} {}", "warning:".yellow(), warning);
            }
            if open.is_empty() {
                println!("{} All transactions settled.", "✓".green().bold());
            }
        }
    }

    if !open.is_empty() {
        let ids: Vec<&str> = open.iter().map(TransactionId::as_str).collect();
        anyhow::bail!("{} transaction(s) left open: {}", open.len(), ids.join(", "));
    }
    Ok(())
}
