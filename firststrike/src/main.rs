//! FirstStrike - AI incident command core
//!
//! CLI entry point for working a scenario board from the terminal.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use firststrike::briefing::BriefingPlayer;
use firststrike::capability::{EnvKeySelector, provider_for};
use firststrike::cli::{Cli, Command, get_log_path};
use firststrike::config::Config;
use firststrike::domain::{CommandPlan, IncidentStatus, LatLng, ResourceStatus, Scenario, Severity};
use firststrike::genai::create_client;
use firststrike::prompts::PromptLoader;
use firststrike::session::{BriefingToggle, CommandSession};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    let scenario = match cli.scenario.as_ref() {
        Some(path) => Scenario::load(path)?,
        None => Scenario::demo(),
    };
    info!(
        incidents = scenario.incidents.len(),
        resources = scenario.resources.len(),
        "FirstStrike board ready"
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Incidents => {
            debug!("main: matched Incidents command");
            cmd_incidents(&scenario);
            Ok(())
        }
        Command::Resources => {
            debug!("main: matched Resources command");
            cmd_resources(&scenario);
            Ok(())
        }
        Command::Plan { lat, lng, json } => {
            debug!(?lat, ?lng, json, "main: matched Plan command");
            let location = lat.zip(lng).map(|(lat, lng)| LatLng::new(lat, lng));
            cmd_plan(&config, scenario, location, json).await
        }
        Command::Recon { incident_id, out } => {
            debug!(%incident_id, ?out, "main: matched Recon command");
            cmd_recon(&config, scenario, &incident_id, out.as_deref()).await
        }
        Command::Brief { text } => {
            debug!(has_text = text.is_some(), "main: matched Brief command");
            cmd_brief(&config, scenario, text).await
        }
    }
}

/// Build a session against the configured provider
fn open_session(config: &Config, scenario: Scenario, location: Option<LatLng>) -> Result<CommandSession> {
    debug!(?location, "open_session: called");
    config.validate()?;

    let genai = create_client(&config.genai).context("Failed to create GenAI client")?;
    let root = std::env::current_dir().context("Failed to resolve working directory")?;
    let prompts = Arc::new(PromptLoader::new(root));
    let keys = Arc::new(EnvKeySelector::new(&config.genai.api_key_env));
    let locator = provider_for(location.or(config.location));

    Ok(CommandSession::new(scenario, genai, &config.genai, prompts, keys).with_location_provider(locator))
}

fn severity_label(severity: Severity) -> ColoredString {
    let label = severity.to_string().to_uppercase();
    match severity {
        Severity::Critical => label.red().bold(),
        Severity::High => label.red(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.green(),
    }
}

fn cmd_incidents(scenario: &Scenario) {
    debug!("cmd_incidents: called");
    if scenario.incidents.is_empty() {
        println!("No incidents on the board");
        return;
    }

    for incident in scenario.by_severity() {
        let status = match incident.status {
            IncidentStatus::Resolved => incident.status.to_string().dimmed(),
            _ => incident.status.to_string().normal(),
        };
        println!(
            "{} {:<8} {:<16} {}",
            incident.id.cyan(),
            severity_label(incident.severity),
            incident.category.to_string(),
            status
        );
        println!(
            "    {} ({:.4}, {:.4})",
            incident.location.address,
            incident.location.lat,
            incident.location.lng
        );
        if !incident.description.is_empty() {
            println!("    {}", incident.description.dimmed());
        }
    }
}

fn cmd_resources(scenario: &Scenario) {
    debug!("cmd_resources: called");
    if scenario.resources.is_empty() {
        println!("No resources on the board");
        return;
    }

    for resource in &scenario.resources {
        let status = match resource.status {
            ResourceStatus::Available => resource.status.to_string().green(),
            ResourceStatus::Maintenance => resource.status.to_string().red(),
            _ => resource.status.to_string().yellow(),
        };
        println!(
            "{} {:<12} {:<12} {}",
            resource.id.cyan(),
            resource.name,
            resource.kind.to_string(),
            status
        );
        if !resource.capabilities.is_empty() {
            let capabilities: Vec<&str> = resource.capabilities.iter().map(String::as_str).collect();
            println!("    {}", capabilities.join(", ").dimmed());
        }
    }
}

fn print_plan(plan: &CommandPlan, scenario: &Scenario) {
    if plan.is_quota_limited() {
        println!("{} {}", "✗".red(), plan.summary.red().bold());
    } else {
        println!("{}", plan.summary.bold());
    }

    if !plan.next_steps.is_empty() {
        println!("\n{}", "Next steps".cyan());
        for (i, step) in plan.next_steps.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }

    if !plan.allocations.is_empty() {
        println!("\n{}", "Allocations".cyan());
        for incident in scenario.by_severity() {
            let mut allocations = plan.allocations_for(&incident.id).peekable();
            if allocations.peek().is_none() {
                continue;
            }
            println!("  {} {}", incident.id.yellow(), incident.category.to_string().dimmed());
            for allocation in allocations {
                println!("    {}: {}", allocation.resource_id.yellow(), allocation.task);
            }
        }

        // Allocations naming an incident that is not on the board
        for allocation in plan
            .allocations
            .iter()
            .filter(|a| scenario.incident(&a.incident_id).is_none())
        {
            println!(
                "  {} -> {}: {}",
                allocation.resource_id.yellow(),
                allocation.incident_id.red(),
                allocation.task
            );
        }
    }

    if !plan.risks.is_empty() {
        println!("\n{}", "Risks".cyan());
        for risk in &plan.risks {
            println!("  {} {}", "!".red(), risk);
        }
    }

    if !plan.citations().is_empty() {
        println!("\n{}", "Sources".cyan());
        for chunk in plan.citations() {
            println!("  [{}] {} {}", chunk.source(), chunk.title(), chunk.uri().dimmed());
        }
    }
}

async fn cmd_plan(config: &Config, scenario: Scenario, location: Option<LatLng>, json: bool) -> Result<()> {
    debug!(?location, json, "cmd_plan: called");
    let session = open_session(config, scenario, location)?;

    session.acquire_location().await;
    let plan = session.refresh_plan().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?);
    } else {
        print_plan(&plan, session.scenario());
    }

    if plan.is_quota_limited() {
        warn!("Plan degraded: provider quota exhausted");
        eprintln!(
            "\n{} Public quota exhausted. Supply an API key with remaining quota in {}.",
            "hint:".yellow().bold(),
            config.genai.api_key_env
        );
        session.request_key_selection().await;
    }
    Ok(())
}

async fn cmd_recon(config: &Config, scenario: Scenario, incident_id: &str, out: Option<&Path>) -> Result<()> {
    debug!(%incident_id, ?out, "cmd_recon: called");
    let session = open_session(config, scenario, None)?;

    let Some(image) = session.select_incident(incident_id).await? else {
        println!("{} Recon imagery unavailable for {}", "✗".yellow(), incident_id);
        return Ok(());
    };

    match out {
        Some(path) => {
            let path = if path.extension().is_none() {
                path.with_extension(image.extension())
            } else {
                path.to_path_buf()
            };
            fs::write(&path, image.decode()?).context(format!("Failed to write {}", path.display()))?;
            println!("{} Recon image written: {}", "✓".green(), path.display().to_string().cyan());
        }
        None => println!("{}", image),
    }
    Ok(())
}

async fn cmd_brief(config: &Config, scenario: Scenario, text: Option<String>) -> Result<()> {
    debug!(has_text = text.is_some(), "cmd_brief: called");
    let session = open_session(config, scenario, None)?;

    let outcome = match text {
        Some(text) => session.speak(&text).await,
        None => {
            session.acquire_location().await;
            let plan = session.refresh_plan().await;
            println!("{}", plan.summary.bold());
            session.toggle_briefing().await
        }
    };

    match outcome {
        BriefingToggle::Started => {
            println!("{} Briefing in progress (Ctrl-C to stop)", "▶".green());
            wait_for_briefing(session.player()).await?;
        }
        BriefingToggle::Unavailable => println!("{} Briefing audio unavailable", "✗".yellow()),
        BriefingToggle::NothingToBrief => println!("{} Nothing to brief", "✗".yellow()),
        BriefingToggle::Stopped => {}
    }
    Ok(())
}

/// Block until the briefing ends or the operator interrupts it
async fn wait_for_briefing(player: &BriefingPlayer) -> Result<()> {
    debug!("wait_for_briefing: called");
    let mut speaking = player.subscribe();

    tokio::select! {
        finished = speaking.wait_for(|speaking| !*speaking) => {
            finished.context("Briefing player went away")?;
            println!("{} Briefing complete", "✓".green());
        }
        interrupted = tokio::signal::ctrl_c() => {
            interrupted.context("Failed to listen for Ctrl-C")?;
            player.stop();
            println!("\n{} Briefing stopped", "■".yellow());
        }
    }
    Ok(())
}
