//! hotspot-validate
//!
//! Checks an overlay config against its diagram, and replays scripted
//! pointer sessions through the overlay runtime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use hotspot_core::config::{self, ConfigError};
use hotspot_core::overlay::{OverlayController, Phase, PointerEvent, spawn_overlay};
use hotspot_core::readiness::ReadinessGate;
use hotspot_core::registry::{ElementId, MemoryDiagram};
use hotspot_core::rules::RuleSet;
use hotspot_types::OverlayConfig;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Validate and replay diagram overlay configs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the rules and report ids missing from the diagram
    Check {
        /// Overlay config (defaults to the user config directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Diagram to check against (defaults to the config's resource)
        #[arg(short, long)]
        diagram: Option<PathBuf>,
    },
    /// Replay a pointer script and print where every element settles
    Replay {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        diagram: Option<PathBuf>,
        /// Comma-separated steps: click:ID, enter:ID, leave:ID, wait:MS
        #[arg(short, long)]
        script: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();

    match Cli::parse().command {
        Commands::Check { config, diagram } => check(config, diagram),
        Commands::Replay {
            config,
            diagram,
            script,
        } => replay(config, diagram, &script).await,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn check(config_path: Option<PathBuf>, diagram: Option<PathBuf>) -> Result<(), String> {
    let (config_path, config) = load_config(config_path)?;
    let rules = RuleSet::from_config(&config.interactions).map_err(|e| format!("Invalid rules: {e}"))?;

    let diagram_path = diagram.unwrap_or_else(|| config::resolve_resource(&config_path, &config));
    let diagram = load_diagram(&diagram_path)?;

    println!("Config:   {}", config_path.display());
    println!("Diagram:  {} ({} elements)", diagram_path.display(), diagram.len());
    println!("Rules:    {}", rules.len());
    match rules.default_rule() {
        Some(rule) => println!("Default:  {}", rule.trigger),
        None => println!("Default:  (none)"),
    }

    let unresolved = rules.unresolved_ids(&diagram);
    if unresolved.is_empty() {
        println!("All {} referenced ids resolved", rules.referenced_ids().len());
    } else {
        println!("Unresolved ids ({}), these will be skipped at runtime:", unresolved.len());
        for id in &unresolved {
            println!("  - {id}");
        }
    }
    Ok(())
}

async fn replay(config_path: Option<PathBuf>, diagram: Option<PathBuf>, script: &str) -> Result<(), String> {
    let steps = parse_script(script)?;
    let (config_path, config) = load_config(config_path)?;
    let diagram_path = diagram.unwrap_or_else(|| config::resolve_resource(&config_path, &config));

    let mut controller =
        OverlayController::<MemoryDiagram>::new(&config).map_err(|e| format!("Invalid rules: {e}"))?;
    controller.set_on_interaction(|trigger| tracing::info!(trigger = %trigger, "Interaction"));

    let watched: Vec<ElementId> = controller.rules().referenced_ids().into_iter().cloned().collect();
    let gate = ReadinessGate::from_timing(&config.timing);

    let probe = move || match std::fs::read_to_string(&diagram_path) {
        Ok(markup) => MemoryDiagram::from_svg(&markup)
            .map_err(|e| tracing::warn!(error = %e, "Diagram not usable yet"))
            .ok(),
        Err(e) => {
            tracing::debug!(error = %e, "Diagram not readable yet");
            None
        }
    };
    let overlay = spawn_overlay(controller, gate, probe);

    // Input is ignored until the diagram is ready
    loop {
        let snapshot = overlay
            .snapshot(Vec::new())
            .await
            .ok_or("Overlay task stopped unexpectedly")?;
        match snapshot.phase {
            Phase::Pending => tokio::time::sleep(gate.interval).await,
            Phase::Ready => break,
            phase => {
                overlay.shutdown().await;
                return Err(format!("Overlay did not become ready ({phase:?})"));
            }
        }
    }

    for step in steps {
        match step {
            Step::Pointer(event) => {
                if !overlay.pointer(event).await {
                    return Err("Overlay task stopped unexpectedly".to_string());
                }
            }
            Step::Wait(duration) => tokio::time::sleep(duration).await,
        }
    }

    // Let every pending transition land
    tokio::time::sleep(config.timing.fade() + config.timing.show_delay()).await;

    let snapshot = overlay
        .snapshot(watched)
        .await
        .ok_or("Overlay task stopped unexpectedly")?;
    overlay.shutdown().await;

    println!(
        "Active: {}",
        snapshot.active.as_ref().map_or("(none)", ElementId::as_str)
    );
    println!("{:<24} {:>9} {:>8}", "element", "displayed", "opacity");
    for (id, state) in &snapshot.visibility {
        match state {
            Some(state) => println!("{:<24} {:>9} {:>8.2}", id.as_str(), state.displayed, state.opacity),
            None => println!("{:<24} {:>9} {:>8}", id.as_str(), "-", "-"),
        }
    }
    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<(PathBuf, OverlayConfig), String> {
    let path = path
        .or_else(config::default_config_path)
        .ok_or("No config given and no user config directory available")?;
    let config = config::load_file(&path).map_err(|e: ConfigError| e.to_string())?;
    Ok((path, config))
}

fn load_diagram(path: &Path) -> Result<MemoryDiagram, String> {
    let markup = std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    MemoryDiagram::from_svg(&markup).map_err(|e| format!("Failed to parse {}: {e}", path.display()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Script
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Step {
    Pointer(PointerEvent),
    Wait(Duration),
}

fn parse_script(script: &str) -> Result<Vec<Step>, String> {
    script
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|step| {
            let (kind, arg) = step
                .split_once(':')
                .ok_or_else(|| format!("Malformed step '{step}' (expected kind:value)"))?;
            let arg = arg.trim();
            match kind.trim() {
                "click" => Ok(Step::Pointer(PointerEvent::Activate(ElementId::from(arg)))),
                "enter" => Ok(Step::Pointer(PointerEvent::Enter(ElementId::from(arg)))),
                "leave" => Ok(Step::Pointer(PointerEvent::Leave(ElementId::from(arg)))),
                "wait" => arg
                    .parse::<u64>()
                    .map(|ms| Step::Wait(Duration::from_millis(ms)))
                    .map_err(|e| format!("Bad wait '{arg}': {e}")),
                other => Err(format!("Unknown step kind '{other}'")),
            }
        })
        .collect()
}
