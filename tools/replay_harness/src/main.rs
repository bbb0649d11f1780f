//! Replay a command script against a deterministic world and report the
//! final state digest. Two runs of the same script must print the same
//! digest; anything else is a determinism bug.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;

use command_engine::{dispatch, parse_line, CommandFlags};
use core_sim::{scenario, state_digest};
use sim_schema::{string_ids, CompanyId, Money};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay a Steelgauge command script", long_about = None)]
struct Args {
    /// Path to the script, one command per line. '#' starts a comment.
    script: PathBuf,

    /// World seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Map edge length in tiles.
    #[arg(long, default_value_t = 64)]
    map_size: u16,

    /// Company issuing the commands.
    #[arg(long, default_value_t = 0)]
    company: u8,

    /// Stop at the first refused command instead of continuing.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script at {}", args.script.display()))?;

    let mut world = scenario::build(args.seed, args.map_size, args.map_size);
    let company = CompanyId(args.company);
    let mut refused = 0usize;

    for (line_no, raw) in script.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let arg = parse_line(line)
            .with_context(|| format!("line {}: cannot parse '{line}'", line_no + 1))?;
        let result = dispatch(&mut world, company, &arg, CommandFlags::APPLY)
            .with_context(|| format!("line {}: dispatch rejected '{line}'", line_no + 1))?;

        match result.outcome {
            Ok(cost) => info!(line = line_no + 1, %cost, "{line}"),
            Err(_) => {
                refused += 1;
                let title = string_ids::lookup(result.context.error_title);
                let text = string_ids::lookup(result.context.error_text);
                eprintln!("line {}: refused: {title}: {text}", line_no + 1);
                if args.strict {
                    bail!("refused command in strict mode");
                }
            }
        }
    }

    let cash = world
        .company(company)
        .map(|c| c.cash)
        .unwrap_or(Money::ZERO);
    println!("digest: {:#018x}", state_digest(&world));
    println!("cash:   {cash}");
    println!("refused: {refused}");
    Ok(())
}
