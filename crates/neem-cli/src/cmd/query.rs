use crate::output::print_json;
use clap::Subcommand;
use neem_core::Config;
use rosprolog_client::Reasoner;

use crate::settings;

#[derive(Subcommand)]
pub enum QuerySubcommand {
    /// Print the first solution of a Prolog goal
    Once {
        /// Goal text, e.g. "is_action(Action)"
        goal: String,
    },
    /// Print every solution of a Prolog goal
    All {
        /// Goal text, e.g. "is_action(Action)"
        goal: String,
    },
}

pub fn run(config: &Config, subcmd: QuerySubcommand, json: bool) -> anyhow::Result<()> {
    let reasoner = settings::connect(config)?;
    match subcmd {
        QuerySubcommand::Once { goal } => once(reasoner.as_ref(), &goal, json),
        QuerySubcommand::All { goal } => all(reasoner.as_ref(), &goal, json),
    }
}

fn once(reasoner: &dyn Reasoner, goal: &str, json: bool) -> anyhow::Result<()> {
    let solution = reasoner.once(goal)?;
    if json {
        return print_json(&solution);
    }
    match solution {
        Some(bindings) if bindings.is_empty() => println!("true."),
        Some(bindings) => println!("{}", serde_json::to_string(&bindings)?),
        None => println!("false."),
    }
    Ok(())
}

fn all(reasoner: &dyn Reasoner, goal: &str, json: bool) -> anyhow::Result<()> {
    let solutions = reasoner.all_solutions(goal)?;
    if json {
        return print_json(&solutions);
    }
    if solutions.is_empty() {
        println!("false.");
    }
    for bindings in &solutions {
        println!("{}", serde_json::to_string(bindings)?);
    }
    Ok(())
}
