use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use liftlog::backup::Snapshot;
use liftlog::units::convert_weight;
use liftlog::{Tracker, Unit};

#[derive(Parser, Debug)]
#[command(version, about = "liftlog - workout tracker", long_about = None)]
struct Args {
    /// Path to the SQLite database file.
    #[arg(long, env = "DATABASE_URL", default_value = "liftlog.db")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List machines.
    Machines,
    /// Add a machine.
    AddMachine {
        label: String,
        #[arg(long)]
        muscle_group: Option<String>,
    },
    /// Delete a machine and every set logged against it.
    RmMachine { id: i64 },
    /// Log a set.
    Log {
        machine_id: i64,
        weight: f64,
        reps: i64,
        /// Calendar date of the workout, defaults to today.
        #[arg(long)]
        date: Option<String>,
        /// Unit the weight was entered in; defaults to the display unit.
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        rpe: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show the daily best-e1RM / volume series for a machine.
    Progress {
        machine_id: i64,
        /// Trailing window in days; omit for the full history.
        #[arg(long)]
        days: Option<i64>,
        /// Newest day first, for history listings.
        #[arg(long)]
        desc: bool,
    },
    /// Show the all-time personal record for a machine.
    Pr { machine_id: i64 },
    /// Write a snapshot of the whole store to a JSON file.
    Export { path: PathBuf },
    /// Merge a snapshot file into the store.
    Import { path: PathBuf },
    /// Show or change the display unit.
    Unit { unit: Option<String> },
    /// Delete every machine, session and set.
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let tracker = Tracker::open(&args.db)
        .await
        .with_context(|| format!("opening store at {}", args.db))?;

    match args.command {
        Commands::Machines => {
            for machine in tracker.list_machines().await? {
                let group = machine.muscle_group.as_deref().unwrap_or("-");
                println!("{:>4}  {:<24} {}", machine.id, machine.label, group);
            }
        }
        Commands::AddMachine { label, muscle_group } => {
            let machine = tracker.add_machine(&label, muscle_group, None, None).await?;
            println!("added machine {} ({})", machine.id, machine.label);
        }
        Commands::RmMachine { id } => {
            let deleted = tracker.delete_machine(id).await?;
            if deleted == 0 {
                println!("no machine with id {id}");
            } else {
                println!("deleted machine {id} and its sets");
            }
        }
        Commands::Log {
            machine_id,
            weight,
            reps,
            date,
            unit,
            rpe,
            notes,
        } => {
            let unit = match unit {
                Some(u) => u.parse::<Unit>()?,
                None => tracker.display_unit().await?,
            };
            let date = date.unwrap_or_else(today);
            let set = tracker
                .log_set(&date, machine_id, weight, unit, reps, rpe, notes)
                .await?;
            println!("logged set {} on {date}: {:.1}kg x {}", set.set_index, set.weight_kg, set.reps);
        }
        Commands::Progress { machine_id, days, desc } => {
            let unit = tracker.display_unit().await?;
            let mut points = tracker.aggregate_progress(machine_id, unit, days).await?;
            if desc {
                points.reverse();
            }
            if points.is_empty() {
                println!("no sets logged");
            }
            for p in points {
                println!(
                    "{}  e1RM {:6.1} {unit}  volume {:8.1} {unit}",
                    p.date,
                    convert_weight(p.e1rm, unit, false),
                    p.volume
                );
            }
        }
        Commands::Pr { machine_id } => match tracker.find_personal_record(machine_id).await? {
            Some(pr) => {
                let unit = tracker.display_unit().await?;
                println!(
                    "{:.1} {unit} on {} (set {})",
                    convert_weight(pr.e1rm, unit, false),
                    pr.date,
                    pr.set_id
                );
            }
            None => println!("no sets logged"),
        },
        Commands::Export { path } => {
            let snapshot = tracker.export_snapshot().await?;
            std::fs::write(&path, snapshot.to_json()?)
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "exported {} machines, {} sessions, {} sets to {}",
                snapshot.machines.len(),
                snapshot.sessions.len(),
                snapshot.sets.len(),
                path.display()
            );
        }
        Commands::Import { path } => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let snapshot = Snapshot::from_json(&json)?;
            let report = tracker.import_snapshot(&snapshot).await?;
            println!(
                "imported {} machines, {} sessions, {} sets",
                report.imported_machines, report.imported_sessions, report.imported_sets
            );
        }
        Commands::Unit { unit } => match unit {
            Some(u) => {
                let unit = u.parse::<Unit>()?;
                tracker.set_display_unit(unit).await?;
                println!("display unit set to {unit}");
            }
            None => println!("{}", tracker.display_unit().await?),
        },
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear the store without --yes");
            }
            tracker.clear_store().await?;
            println!("store cleared");
        }
    }

    Ok(())
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
