use std::fmt;

use chrono::NaiveTime;
use portal_core::calendar::{CalendarCell, MonthCursor, MonthView};
use portal_core::model::{Day, Role, SlotDraft, SlotId, User, parse_date_key};
use services::{AppServices, Clock, NoticeLevel, PortalContext};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidMonth { raw: String },
    InvalidDate { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidMonth { raw } => {
                write!(f, "invalid --month value (expected YYYY-MM): {raw}")
            }
            ArgsError::InvalidDate { raw } => {
                write!(f, "invalid --date value (expected YYYY-MM-DD): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- calendar [--db <sqlite_url>] [--month YYYY-MM]");
    eprintln!("  cargo run -p app -- toggle   [--db <sqlite_url>] --date YYYY-MM-DD --slot <id>");
    eprintln!("  cargo run -p app -- progress [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- seed     [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:portal.sqlite3");
    eprintln!("  --month <current month>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PORTAL_DB_URL, PORTAL_USER, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Calendar,
    Toggle,
    Progress,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "calendar" => Some(Self::Calendar),
            "toggle" => Some(Self::Toggle),
            "progress" => Some(Self::Progress),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    user: String,
    month: Option<MonthCursor>,
    date: Option<String>,
    slot: Option<SlotId>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("PORTAL_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("portal.sqlite3".into()), normalize_sqlite_url);
        let user = std::env::var("PORTAL_USER").unwrap_or_else(|_| "teacher".into());
        let mut month = None;
        let mut date = None;
        let mut slot = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--month" => {
                    let value = require_value(args, "--month")?;
                    month = Some(parse_month(&value)?);
                }
                "--date" => date = Some(require_value(args, "--date")?),
                "--slot" => slot = Some(SlotId::new(require_value(args, "--slot")?)),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user,
            month,
            date,
            slot,
        })
    }
}

fn parse_month(raw: &str) -> Result<MonthCursor, ArgsError> {
    let invalid = || ArgsError::InvalidMonth {
        raw: raw.to_string(),
    };
    let (year, month) = raw.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    MonthCursor::new(year, month).map_err(|_| invalid())
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn render_month(view: &MonthView) {
    println!("{:04}-{:02}", view.month.year(), view.month.month());
    let header: Vec<&str> = Day::ALL.iter().map(|day| &day.name()[..3]).collect();
    println!("{}", header.join(" "));

    for week in view.cells.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match cell {
                CalendarCell::Blank => "   ".to_string(),
                CalendarCell::Day(day) if day.is_fully_completed() => format!("{:>2}*", day.day),
                CalendarCell::Day(day) => format!("{:>3}", day.day),
            })
            .collect();
        println!("{}", row.join(" "));
    }
    println!();

    for day in view.days().filter(|day| !day.slots.is_empty()) {
        println!("{} {}", day.date_key, day.weekday);
        for projected in &day.slots {
            let slot = &projected.slot;
            println!(
                "  [{}] {}-{} {} ({}) id={}",
                if projected.completed { "x" } else { " " },
                slot.start().format("%H:%M"),
                slot.end().format("%H:%M"),
                slot.subject(),
                slot.student(),
                slot.id(),
            );
        }
    }
}

async fn seed(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    if services.routine().load().await?.slot_count() > 0 {
        println!("routine already has slots; nothing to seed");
        return Ok(());
    }

    for (name, days) in [("Alice", 30), ("Bob", 10)] {
        if services.students().progress_for(name).await?.is_none() {
            services.students().add_student(name, days).await?;
        }
    }

    let at = |h: u32, m: u32| NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN);
    let plan = [
        (Day::Monday, at(16, 0), at(17, 0), "Math", "Alice"),
        (Day::Wednesday, at(15, 30), at(16, 15), "Piano", "Bob"),
        (Day::Friday, at(16, 0), at(17, 0), "Art", "Alice"),
    ];
    for (day, start, end, subject, student) in plan {
        let id = services
            .routine()
            .add_slot(
                day,
                SlotDraft {
                    start,
                    end,
                    subject: subject.into(),
                    student: student.into(),
                },
            )
            .await?;
        println!("seeded {day} {subject} ({student}) id={id}");
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: show the current month when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Calendar,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Calendar,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    tracing::info!(db = %parsed.db_url, "storage ready");

    let mut ctx = PortalContext::new();
    ctx.resume(User::new(parsed.user.clone(), Role::Teacher));

    let outcome: Result<(), Box<dyn std::error::Error>> = match cmd {
        Command::Calendar => {
            let session = services.open_timetable().await?;
            let view = match parsed.month {
                Some(month) => session.month_view(month),
                None => session.current_month_view(),
            };
            render_month(&view);
            Ok(())
        }
        Command::Toggle => {
            let raw = parsed.date.ok_or(ArgsError::MissingFlag { flag: "--date" })?;
            let date = parse_date_key(&raw).map_err(|_| ArgsError::InvalidDate { raw: raw.clone() })?;
            let slot = parsed.slot.ok_or(ArgsError::MissingFlag { flag: "--slot" })?;

            let mut session = services.open_timetable().await?;
            match session.toggle(date, &slot).await {
                Ok(Some(result)) => {
                    let state = if result.completed { "done" } else { "not done" };
                    ctx.notify(NoticeLevel::Info, format!("{slot} on {raw} marked {state}"));
                    Ok(())
                }
                Ok(None) => {
                    ctx.notify(
                        NoticeLevel::Info,
                        format!("{slot} is not scheduled on {raw}; nothing changed"),
                    );
                    Ok(())
                }
                Err(err) => {
                    ctx.report_failure("Toggle", &err);
                    Err(err.into())
                }
            }
        }
        Command::Progress => {
            for row in services.students().list_progress().await? {
                println!(
                    "{:<16} {:>3}% {:>3}/{:<3} cycles={} total={}",
                    row.name,
                    row.progress.percentage,
                    row.progress.current_cycle_completed,
                    row.days_to_complete,
                    row.progress.cycles,
                    row.total_completed,
                );
            }
            Ok(())
        }
        Command::Seed => seed(&services).await,
    };

    for notice in ctx.drain_notices() {
        match notice.level {
            NoticeLevel::Info => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("{}", notice.message),
        }
    }
    ctx.logout();
    outcome
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
