//! Command-line driver for the lead triage core.
//!
//! # Responsibility
//! - Load the bundled leads through the simulated runner.
//! - Print the filtered table and optionally convert one lead.

use clap::Parser;
use leadtriage_core::{
    default_log_level, init_logging, Lead, LeadConsole, LeadSource, OpportunityStage,
    OutcomePolicy, RandomOutcome, SeededOutcome, SimulationConfig,
};
use log::info;
use std::error::Error;

#[derive(Debug, Parser)]
#[command(name = "leadtriage", version, about = "Triage leads and convert them into opportunities")]
struct Args {
    /// Case-insensitive search over lead name and company.
    #[arg(long, default_value = "")]
    query: String,

    /// Status filter (`new|contacted|qualified|unqualified`); empty shows all.
    #[arg(long, default_value = "")]
    status: String,

    /// Convert the lead with this id into an opportunity.
    #[arg(long)]
    convert: Option<String>,

    /// Stage for the converted opportunity.
    #[arg(long, default_value = "New")]
    stage: String,

    /// Optional amount for the converted opportunity.
    #[arg(long, default_value = "")]
    amount: String,

    /// Seed for reproducible simulated failures.
    #[arg(long)]
    seed: Option<u64>,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<String>,

    /// Log level used with `--log-dir`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(log_dir) = &args.log_dir {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let config = SimulationConfig::from_env()?;
    match args.seed {
        Some(seed) => {
            let policy = SeededOutcome::new(seed);
            run(LeadConsole::with_source(config, policy, LeadSource::Bundled)?, &args).await
        }
        None => {
            let console = LeadConsole::with_source(config, RandomOutcome, LeadSource::Bundled)?;
            run(console, &args).await
        }
    }
}

async fn run<P: OutcomePolicy>(
    mut console: LeadConsole<P>,
    args: &Args,
) -> Result<(), Box<dyn Error>> {
    let count = console.load_leads().await?;
    info!("event=cli_loaded module=cli status=ok count={count}");

    console.set_query(args.query.as_str());
    console.set_status_select(&args.status)?;

    let view = console.view();
    if view.is_empty() {
        println!("No results. Adjust search or filter.");
    }
    for lead in view {
        print_lead(lead);
    }

    if let Some(lead_id) = &args.convert {
        if !console.select_lead(lead_id) {
            return Err(format!("unknown lead id `{lead_id}`").into());
        }
        let stage: OpportunityStage = args.stage.parse()?;
        let session = console.session_mut();
        session.set_stage(stage);
        session.set_amount(args.amount.as_str());
        console.convert_session()?;
        console.close_session();
    }

    let counts = console.counts();
    println!(
        "Leads: {} | Opportunities: {}",
        counts.leads, counts.opportunities
    );
    for opportunity in console.opportunities().opportunities() {
        let amount = opportunity
            .amount
            .map(|value| format!("{value:.2}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} {:<20} {:<24} {:<12} {:>12}",
            opportunity.id, opportunity.name, opportunity.account_name, opportunity.stage, amount
        );
    }
    Ok(())
}

fn print_lead(lead: &Lead) {
    println!(
        "{:<8} {:<20} {:<22} {:<30} {:<10} {:>5} {}",
        lead.id, lead.name, lead.company, lead.email, lead.source, lead.score, lead.status
    );
}
