use std::{error::Error, io::Write};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use csv::Writer;
use engine::{
    Anomaly, Efficiency, Engine, JsonStore, Liters, MovementDraft, MovementKind, Reading, Role,
};

#[derive(Parser, Debug)]
#[command(name = "gasolio_admin")]
#[command(about = "Admin utilities for Gasolio (bootstrap the store, users and snapshots)")]
struct Cli {
    /// Path of the JSON store (also read from `GASOLIO_STORE`).
    #[arg(long, env = "GASOLIO_STORE", default_value = "./gasolio.json")]
    store: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the store file and seed the defaults.
    Init,
    User(User),
    Snapshot(Snapshot),
    Movements(Movements),
    /// Print tank levels and per-asset efficiency to stdout.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    login: String,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "operator")]
    role: String,
    /// Password for the new account; prompted for when omitted.
    #[arg(long)]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct Snapshot {
    #[command(subcommand)]
    command: SnapshotCommand,
}

#[derive(Subcommand, Debug)]
enum SnapshotCommand {
    Export(SnapshotExportArgs),
    Import(SnapshotImportArgs),
}

#[derive(Args, Debug)]
struct SnapshotExportArgs {
    #[arg(long)]
    out: String,
}

#[derive(Args, Debug)]
struct SnapshotImportArgs {
    #[arg(long)]
    file: String,
}

#[derive(Args, Debug)]
struct Movements {
    #[command(subcommand)]
    command: MovementsCommand,
}

#[derive(Subcommand, Debug)]
enum MovementsCommand {
    /// Record a movement straight into the store file.
    Add(MovementsAddArgs),
    /// Dump the whole ledger as CSV.
    Csv(MovementsCsvArgs),
}

#[derive(Args, Debug)]
struct MovementsAddArgs {
    /// consumption, crusher_refill or site_refill.
    #[arg(long)]
    kind: String,
    /// Volume in liters, up to two decimals; the sign follows the kind.
    #[arg(long)]
    liters: String,
    /// RFC3339 timestamp; defaults to now.
    #[arg(long)]
    at: Option<String>,
    #[arg(long)]
    asset: Option<String>,
    #[arg(long)]
    tank: Option<String>,
    /// Odometer reading in kilometers, up to two decimals.
    #[arg(long)]
    odometer: Option<String>,
    /// Hour meter reading, up to two decimals.
    #[arg(long)]
    hours: Option<String>,
    #[arg(long)]
    operator: Option<String>,
    #[arg(long)]
    note: Option<String>,
    /// Id of the recording user.
    #[arg(long)]
    recorded_by: Option<String>,
}

#[derive(Args, Debug)]
struct MovementsCsvArgs {
    #[arg(long)]
    out: String,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Timezone the month and year windows are anchored in.
    #[arg(long, default_value = "Europe/Rome")]
    timezone: String,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    match raw {
        "admin" => Ok(Role::Admin),
        "operator" => Ok(Role::Operator),
        other => Err(format!("unsupported role: {other}")),
    }
}

fn parse_kind(raw: &str) -> Result<MovementKind, String> {
    match raw {
        "consumption" => Ok(MovementKind::Consumption),
        "crusher_refill" => Ok(MovementKind::CrusherRefill),
        "site_refill" => Ok(MovementKind::SiteRefill),
        other => Err(format!("unsupported movement kind: {other}")),
    }
}

fn parse_or_exit<T, E: std::fmt::Display>(parsed: Result<T, E>) -> T {
    match parsed {
        Ok(value) => value,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

fn open_engine(store: &str) -> Result<Engine<JsonStore>, Box<dyn Error + Send + Sync>> {
    let store = JsonStore::open(store)?;
    Ok(Engine::builder().store(store).build()?)
}

fn describe_efficiency(efficiency: Efficiency) -> String {
    match efficiency {
        Efficiency::DistancePerLiter(v) => format!("{v:.2} km/L"),
        Efficiency::LitersPerHour(v) => format!("{v:.2} L/h"),
        Efficiency::NotAvailable => "n/a".to_string(),
        Efficiency::Anomaly(Anomaly::ReadingRegression) => "meter regression".to_string(),
        Efficiency::Anomaly(Anomaly::UsageWithoutVolume) => "usage without volume".to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            let engine = open_engine(&cli.store)?;
            println!(
                "initialized store: {} ({} users, {} movements)",
                cli.store,
                engine.users().len(),
                engine.movements().len()
            );
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let role = parse_or_exit(parse_role(&args.role));

            let password = match args.password {
                Some(password) => password,
                None => prompt_password_twice()?,
            };

            let mut engine = open_engine(&cli.store)?;
            match engine.create_user(&args.login, &password, role, &args.name) {
                Ok(user) => println!("created user: {} ({})", user.login, user.id),
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Snapshot(Snapshot {
            command: SnapshotCommand::Export(args),
        }) => {
            let engine = open_engine(&cli.store)?;
            let snapshot = engine.export_snapshot(Utc::now());
            std::fs::write(&args.out, snapshot.to_json()?)?;
            println!("exported snapshot: {}", args.out);
        }
        Command::Snapshot(Snapshot {
            command: SnapshotCommand::Import(args),
        }) => {
            let raw = std::fs::read_to_string(&args.file)?;
            let snapshot = engine::Snapshot::from_json(&raw)?;
            if !snapshot.version_matches() {
                eprintln!(
                    "warning: importing a version {} snapshot into a version {} store",
                    snapshot.version,
                    engine::SNAPSHOT_VERSION
                );
            }

            let mut engine = open_engine(&cli.store)?;
            engine.import_snapshot(snapshot)?;
            println!("imported snapshot: {}", args.file);
        }
        Command::Movements(Movements {
            command: MovementsCommand::Add(args),
        }) => {
            let kind = parse_or_exit(parse_kind(&args.kind));
            let liters = parse_or_exit(args.liters.parse::<Liters>());
            let odometer = parse_or_exit(
                args.odometer.as_deref().map(str::parse::<Reading>).transpose(),
            );
            let hours = parse_or_exit(args.hours.as_deref().map(str::parse::<Reading>).transpose());
            let occurred_at = match args.at {
                Some(raw) => parse_or_exit(
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|at| at.with_timezone(&Utc))
                        .map_err(|err| format!("invalid timestamp {raw}: {err}")),
                ),
                None => Utc::now(),
            };

            let draft = MovementDraft {
                occurred_at,
                kind,
                liters,
                asset_id: args.asset,
                tank_id: args.tank,
                odometer,
                hours,
                operator: args.operator,
                note: args.note,
            };

            let mut engine = open_engine(&cli.store)?;
            match engine.commit_movement(draft, args.recorded_by.as_deref()) {
                Ok(movement) => println!(
                    "recorded movement: {} ({:.2} L)",
                    movement.id,
                    movement.signed_liters().as_f64()
                ),
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(1);
                }
            }
        }
        Command::Movements(Movements {
            command: MovementsCommand::Csv(args),
        }) => {
            let engine = open_engine(&cli.store)?;

            let mut wtr = Writer::from_path(&args.out)?;
            wtr.write_record([
                "id",
                "occurred_at",
                "kind",
                "liters",
                "asset_id",
                "tank",
                "odometer",
                "hours",
                "operator",
                "note",
            ])?;
            for movement in engine.movements() {
                wtr.write_record([
                    movement.id.clone(),
                    movement.occurred_at.to_rfc3339(),
                    movement.kind.as_str().to_string(),
                    format!("{:.2}", movement.signed_liters().as_f64()),
                    movement.asset_id.clone().unwrap_or_default(),
                    movement
                        .tank()
                        .map(|t| t.as_str().to_string())
                        .unwrap_or_default(),
                    movement
                        .odometer
                        .map(|r| format!("{:.2}", r.as_f64()))
                        .unwrap_or_default(),
                    movement
                        .hours
                        .map(|r| format!("{:.2}", r.as_f64()))
                        .unwrap_or_default(),
                    movement.operator.clone().unwrap_or_default(),
                    movement.note.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;

            println!("exported {} movements: {}", engine.movements().len(), args.out);
        }
        Command::Report(args) => {
            let tz: Tz = match args.timezone.parse() {
                Ok(tz) => tz,
                Err(_) => {
                    eprintln!("unknown timezone: {}", args.timezone);
                    std::process::exit(2);
                }
            };

            let engine = open_engine(&cli.store)?;
            let now = Utc::now();

            for status in engine.tank_statuses() {
                println!(
                    "{}: {:.2} / {:.2} L",
                    status.name,
                    status.balance.as_f64(),
                    status.capacity.as_f64()
                );
            }

            for summary in engine.fleet_summary(now, tz) {
                println!(
                    "{} [{}] all-time {} | month {} | year {}",
                    summary.label,
                    if summary.active { "active" } else { "retired" },
                    describe_efficiency(summary.all_time.efficiency),
                    describe_efficiency(summary.month_to_date.efficiency),
                    describe_efficiency(summary.year_to_date.efficiency),
                );
            }

            let totals = engine.fleet_totals();
            println!(
                "{} movements, {:.2} L consumed",
                totals.movements,
                totals.total_consumed.as_f64()
            );
        }
    }

    Ok(())
}
