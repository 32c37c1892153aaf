mod error;
mod models;
mod progress;
mod store;
mod tracker;
mod tui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use models::{Difficulty, JsonOutput, MissionStatus, NewMission, TicketType};
use error::SoloCraftError;
use store::{JsonStore, Storage};
use tracker::{TicketUse, Tracker};

const DATA_DIR_NAME: &str = "solocraft";
const FALLBACK_DATA_DIR: &str = "solocraft_data";

#[derive(Parser)]
#[command(name = "solocraft")]
#[command(about = "Track self-assigned missions, XP, weekly tickets and insight debts")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Data directory (overrides SOLOCRAFT_DATA)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and files
    Init,

    /// Show XP, level and tickets
    Status,

    /// Show mission and insight statistics
    Stats,

    /// Manage missions
    #[command(subcommand)]
    Mission(MissionCommands),

    /// Spend a weekly ticket (opens an insight debt)
    Ticket {
        /// Ticket type: help/tutorial
        kind: String,

        /// What you need the ticket for
        purpose: String,
    },

    /// Write and review insights
    #[command(subcommand)]
    Insight(InsightCommands),

    /// Launch interactive terminal UI
    Tui,
}

#[derive(Subcommand)]
enum MissionCommands {
    /// List missions
    List {
        /// Filter by status: active/completed/failed
        #[arg(long, short)]
        status: Option<String>,
    },

    /// Add a new mission
    Add {
        /// Mission title
        title: String,

        /// What the mission involves
        #[arg(long, short)]
        description: String,

        /// Difficulty: easy/medium/hard
        #[arg(long, short = 'D', default_value = "easy")]
        difficulty: String,

        /// Constraints, e.g. "max 2 help tickets"
        #[arg(long, short, default_value = "")]
        constraints: String,

        /// XP awarded on completion
        #[arg(long, short, default_value_t = 50)]
        reward: u32,

        /// Punishment applied on failure, e.g. "lose 20 xp"
        #[arg(long, short)]
        punishment: Option<String>,
    },

    /// Show mission details
    Show {
        /// Mission ID (or unique prefix)
        id: String,
    },

    /// Complete a mission and collect its XP
    Complete {
        /// Mission ID (or unique prefix)
        id: String,
    },

    /// Fail a mission and take its punishment
    Fail {
        /// Mission ID (or unique prefix)
        id: String,
    },

    /// Delete a mission
    Delete {
        /// Mission ID (or unique prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum InsightCommands {
    /// List outstanding insight debts
    List,

    /// Write an insight to clear a debt
    Write {
        /// Debt ID (or unique prefix)
        id: String,

        /// The insight you gained
        text: String,
    },

    /// Show recorded insights
    View,
}

fn get_data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir;
    }

    if let Ok(path) = std::env::var("SOLOCRAFT_DATA") {
        return PathBuf::from(path);
    }

    dirs::data_dir()
        .map(|d| d.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SOLOCRAFT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("solocraft=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_json<T: serde::Serialize>(output: &JsonOutput<T>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(output)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = get_data_dir(cli.data_dir);
    let store = JsonStore::open(&data_dir)?;
    let mut tracker = Tracker::open(store);

    let tickets_reset = tracker.refresh_weekly_tickets()?;
    if tickets_reset && !cli.json {
        println!("Your weekly tickets have been reset!");
    }

    match cli.command {
        Commands::Init => {
            let location = tracker.store().data_dir();
            if cli.json {
                print_json(&JsonOutput::ok(serde_json::json!({
                    "data_dir": location.display().to_string()
                })))?;
            } else {
                println!("Data initialized at: {}", location.display());
            }
        }

        Commands::Status => {
            let p = tracker.progress();
            if cli.json {
                print_json(&JsonOutput::ok(serde_json::json!({
                    "progress": p,
                    "xp_to_next_level": p.xp_to_next_level(),
                    "days_until_ticket_reset": p.days_until_ticket_reset(),
                })))?;
            } else {
                println!("=== Progress ===");
                println!("Level: {}", p.level);
                println!("XP: {} ({} to next level)", p.xp, p.xp_to_next_level());
                println!("Help tickets: {}", p.help_tickets);
                println!("Tutorial tickets: {}", p.tutorial_tickets);
                println!(
                    "Tickets reset in: {} day(s)",
                    p.days_until_ticket_reset()
                );
            }
        }

        Commands::Stats => {
            let stats = tracker.stats();
            if cli.json {
                print_json(&JsonOutput::ok(&stats))?;
            } else {
                println!("=== Mission Statistics ===");
                println!("Active missions: {}", stats.active_missions);
                println!("Completed missions: {}", stats.completed_missions);
                println!("Failed missions: {}", stats.failed_missions);
                println!("Outstanding insight debts: {}", stats.outstanding_debts);
                println!("Insights recorded: {}", stats.cleared_debts);
            }
        }

        Commands::Mission(mission_cmd) => match mission_cmd {
            MissionCommands::List { status } => {
                let status = status
                    .map(|s| {
                        MissionStatus::from_str(&s).ok_or_else(|| {
                            format!(
                                "Invalid status '{}'. Use: active, completed, or failed",
                                s
                            )
                        })
                    })
                    .transpose()?;

                let missions = tracker.missions(status);
                if cli.json {
                    print_json(&JsonOutput::ok(&missions))?;
                } else if missions.is_empty() {
                    println!("No missions found.");
                } else {
                    println!(
                        "{:<10} {:<36} {:<10} {:>6}  STATUS",
                        "ID", "TITLE", "DIFFICULTY", "XP"
                    );
                    println!("{}", "-".repeat(78));
                    for m in missions {
                        println!(
                            "{:<10} {:<36} {:<10} {:>6}  {}",
                            short_id(&m.id),
                            truncate(&m.title, 34),
                            m.difficulty.label(),
                            m.rewards,
                            m.status().label()
                        );
                    }
                }
            }

            MissionCommands::Add {
                title,
                description,
                difficulty,
                constraints,
                reward,
                punishment,
            } => {
                let difficulty = Difficulty::from_str(&difficulty).ok_or_else(|| {
                    format!(
                        "Invalid difficulty '{}'. Use: easy, medium, or hard",
                        difficulty
                    )
                })?;

                let mission = tracker.create_mission(NewMission {
                    title,
                    description,
                    difficulty,
                    constraints,
                    rewards: reward,
                    punishment,
                })?;

                if cli.json {
                    print_json(&JsonOutput::ok(&mission))?;
                } else {
                    println!(
                        "Added mission '{}' with ID: {}",
                        mission.title,
                        short_id(&mission.id)
                    );
                }
            }

            MissionCommands::Show { id } => {
                let m = tracker.find_mission(&id)?;
                if cli.json {
                    print_json(&JsonOutput::ok(&m))?;
                } else {
                    println!("Mission: {}", m.title);
                    println!("ID: {}", m.id);
                    println!("Status: {}", m.status().label());
                    println!("Difficulty: {}", m.difficulty.label());
                    println!("Description: {}", m.description);
                    if !m.constraints.is_empty() {
                        println!("Constraints: {}", m.constraints);
                    }
                    println!("Reward: {} XP", m.rewards);
                    println!(
                        "Punishment: {}",
                        m.punishment.as_deref().unwrap_or("-")
                    );
                    println!("Created: {}", format_timestamp(&m.created_at));
                    if let Some(at) = &m.completed_at {
                        println!("Completed: {}", format_timestamp(at));
                    }
                    if let Some(at) = &m.failed_at {
                        println!("Failed: {}", format_timestamp(at));
                    }
                }
            }

            MissionCommands::Complete { id } => {
                let completion = tracker.complete_mission(&id)?;
                if cli.json {
                    print_json(&JsonOutput::ok(&completion))?;
                } else {
                    println!(
                        "Mission '{}' completed! You earned {} XP.",
                        completion.mission.title, completion.xp_gained
                    );
                    if completion.leveled_up {
                        println!("You leveled up to Level {}!", completion.level);
                    }
                }
            }

            MissionCommands::Fail { id } => {
                let failure = tracker.fail_mission(&id)?;
                if cli.json {
                    print_json(&JsonOutput::ok(&failure))?;
                } else {
                    println!("Mission '{}' failed.", failure.mission.title);
                    if failure.effects.is_empty() {
                        println!("No punishment applied.");
                    } else {
                        println!("Punishment applied:");
                        for effect in &failure.effects {
                            println!("  - {}", effect);
                        }
                    }
                }
            }

            MissionCommands::Delete { id } => {
                let full_id = mission_id_for_delete(&tracker, &id)?;
                let removed = tracker.delete_mission(&full_id)?;
                if cli.json {
                    print_json(&JsonOutput::ok(serde_json::json!({ "removed": removed })))?;
                } else if removed {
                    println!("Mission {} deleted.", id);
                } else {
                    println!("No mission with ID {}; nothing to delete.", id);
                }
            }
        },

        Commands::Ticket { kind, purpose } => {
            let ticket_type = TicketType::from_str(&kind).ok_or_else(|| {
                format!("Invalid ticket type '{}'. Use: help or tutorial", kind)
            })?;

            let outcome = tracker.use_ticket(ticket_type, &purpose)?;
            if cli.json {
                print_json(&JsonOutput::ok(&outcome))?;
            } else {
                match outcome {
                    TicketUse::Used { debt, remaining } => {
                        println!(
                            "{} ticket used! {} left this week.",
                            ticket_type.label(),
                            remaining
                        );
                        println!(
                            "You now have an insight debt to clear (ID: {}).",
                            short_id(&debt.id)
                        );
                    }
                    TicketUse::Exhausted { ticket_type } => {
                        println!(
                            "You have no {} tickets remaining.",
                            ticket_type.label().to_lowercase()
                        );
                    }
                }
            }
        }

        Commands::Insight(insight_cmd) => match insight_cmd {
            InsightCommands::List => {
                let debts = tracker.outstanding_debts();
                if cli.json {
                    print_json(&JsonOutput::ok(&debts))?;
                } else if debts.is_empty() {
                    println!("You have no outstanding insight debts!");
                } else {
                    println!("{:<10} {:<10} {:<40} CREATED", "ID", "TICKET", "USED FOR");
                    println!("{}", "-".repeat(80));
                    for d in debts {
                        println!(
                            "{:<10} {:<10} {:<40} {}",
                            short_id(&d.id),
                            d.ticket_type.label(),
                            truncate(&d.used_for, 38),
                            format_timestamp(&d.created_at)
                        );
                    }
                }
            }

            InsightCommands::Write { id, text } => {
                let debt = tracker.write_insight(&id, &text)?;
                if cli.json {
                    print_json(&JsonOutput::ok(&debt))?;
                } else {
                    println!("Your insight has been recorded and the debt cleared!");
                }
            }

            InsightCommands::View => {
                let debts = tracker.cleared_debts();
                if cli.json {
                    print_json(&JsonOutput::ok(&debts))?;
                } else if debts.is_empty() {
                    println!("You haven't recorded any insights yet.");
                } else {
                    for d in debts {
                        println!("=== {} Ticket - {} ===", d.ticket_type.label(), d.used_for);
                        if let Some(at) = &d.cleared_at {
                            println!("Cleared on: {}", format_timestamp(at));
                        }
                        println!();
                        println!("{}", d.insight_entry.as_deref().unwrap_or(""));
                        println!();
                        println!("{}", "-".repeat(50));
                    }
                }
            }
        },

        Commands::Tui => {
            tui::run(tracker)?;
        }
    }

    Ok(())
}

// A prefix that names no single mission is passed through as an exact id
fn mission_id_for_delete<S: Storage>(tracker: &Tracker<S>, id: &str) -> error::Result<String> {
    match tracker.find_mission(id) {
        Ok(mission) => Ok(mission.id),
        Err(SoloCraftError::MissionNotFound(_) | SoloCraftError::AmbiguousId(_)) => {
            Ok(id.to_string())
        }
        Err(e) => Err(e),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn format_timestamp(at: &chrono::NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
