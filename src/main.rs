//! Command line front end for the attendance code allocator.
//!
//! Issues codes against an in-memory repository, which makes it handy for
//! checking a code shape before rolling it out to check-in kiosks.
//!
//! # Usage
//!
//! ```bash
//! # Issue 20 codes with the configured default shape
//! cargo run -- issue --count 20
//!
//! # Issue 500 sequential 3-digit codes from 8 kiosks at once
//! cargo run -- issue --count 500 --kiosks 8 --alpha 0 --numeric 3 --sequential
//!
//! # Show banned patterns
//! cargo run -- banned
//!
//! # How many codes does a shape allow?
//! cargo run -- capacity --alpha 1 --numeric 2
//! ```
//!
//! # Environment Variables
//!
//! See [`attendance_codes::config`]. A `.env` file is loaded if present.

use attendance_codes::config::{self, Config};
use attendance_codes::prelude::*;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Issue and inspect check-in security codes.
#[derive(Parser)]
#[command(name = "attendance-codes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Issue new codes
    Issue {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Number of codes to issue
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Number of kiosks requesting codes concurrently
        #[arg(short, long, default_value_t = 1)]
        kiosks: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List banned patterns
    Banned,

    /// Show how many distinct codes a shape allows
    Capacity {
        #[command(flatten)]
        shape: ShapeArgs,
    },
}

/// Code shape overrides. Unset values come from the configuration.
#[derive(Args)]
struct ShapeArgs {
    /// Alphanumeric characters at the start of the code
    #[arg(long)]
    alphanumeric: Option<usize>,

    /// Alpha characters after the alphanumeric ones
    #[arg(long)]
    alpha: Option<usize>,

    /// Digits at the end of the code
    #[arg(long)]
    numeric: Option<usize>,

    /// Count the digits upward instead of drawing them at random
    #[arg(long, conflicts_with = "random")]
    sequential: bool,

    /// Draw the digits at random
    #[arg(long)]
    random: bool,
}

impl ShapeArgs {
    fn resolve(&self, default: CodeShape) -> CodeShape {
        let randomized = if self.sequential {
            false
        } else if self.random {
            true
        } else {
            default.randomized
        };

        CodeShape::new(
            self.alphanumeric.unwrap_or(default.alphanumeric_length),
            self.alpha.unwrap_or(default.alpha_length),
            self.numeric.unwrap_or(default.numeric_length),
            randomized,
        )
    }
}

#[derive(Serialize)]
struct IssuedRow {
    kiosk: usize,
    #[serde(flatten)]
    code: AttendanceCode,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Failed to load configuration")?;
    init_tracing(&config);
    config.print_summary();

    match cli.command {
        Commands::Issue {
            shape,
            count,
            kiosks,
            json,
        } => {
            let shape = shape.resolve(config.default_shape);
            handle_issue(&config, shape, count, kiosks, json).await
        }
        Commands::Banned => handle_banned(&config),
        Commands::Capacity { shape } => handle_capacity(shape.resolve(config.default_shape)),
    }
}

/// Logs go to stderr so `--json` output stays machine readable.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Issues `count` codes split across `kiosks` concurrent blocking tasks.
///
/// All kiosks share one allocator, exactly like check-in stations sharing a
/// server process.
async fn handle_issue(
    config: &Config,
    shape: CodeShape,
    count: usize,
    kiosks: usize,
    json: bool,
) -> Result<()> {
    shape.validate()?;

    let repository = Arc::new(MemoryCodeRepository::new());
    let allocator = Arc::new(CodeAllocator::with_parts(
        repository.clone(),
        Arc::new(SystemClock),
        CodeGenerator::new(),
        config.banned_patterns(),
    ));
    let service = Arc::new(AttendanceCodeService::new(allocator, repository));

    let kiosks = kiosks.clamp(1, count.max(1));
    let mut tasks = Vec::with_capacity(kiosks);
    for kiosk in 0..kiosks {
        let service = service.clone();
        let share = count / kiosks + usize::from(kiosk < count % kiosks);

        tasks.push(tokio::task::spawn_blocking(move || {
            (0..share)
                .map(|_| service.get_new(&shape).map(|code| IssuedRow { kiosk, code }))
                .collect::<Result<Vec<_>, AppError>>()
        }));
    }

    let mut issued = Vec::with_capacity(count);
    for task in tasks {
        match task.await.context("Kiosk task panicked")? {
            Ok(rows) => issued.extend(rows),
            Err(e) if e.is_allocation_timeout() => {
                eprintln!("{}", "❌ Ran out of codes for this shape".red().bold());
                eprintln!("   {}", e.to_string().yellow());
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }
    }
    issued.sort_by(|a, b| a.code.issued_at.cmp(&b.code.issued_at));

    if json {
        println!("{}", serde_json::to_string_pretty(&issued)?);
        return Ok(());
    }

    println!("{}", "🎫 Attendance Codes".bright_blue().bold());
    println!();
    println!(
        "  {:<8} {:<20} {}",
        "Kiosk".bright_white().bold(),
        "Code".bright_white().bold(),
        "Issued".bright_white().bold()
    );
    println!("  {}", "─".repeat(52).bright_black());

    for row in &issued {
        println!(
            "  {:<8} {:<20} {}",
            row.kiosk.to_string().bright_black(),
            row.code.code.bright_yellow().bold(),
            row.code
                .issued_at
                .format("%Y-%m-%d %H:%M:%S%.3f")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!(
        "  Issued {} codes from {} kiosk(s)",
        issued.len().to_string().bright_white().bold(),
        kiosks.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Prints the banned patterns, twelve per line.
fn handle_banned(config: &Config) -> Result<()> {
    let banned = config.banned_patterns();
    let patterns: Vec<&str> = banned.iter().collect();

    println!("{}", "🚫 Banned Patterns".bright_blue().bold());
    println!();

    for line in patterns.chunks(12) {
        let padded: Vec<String> = line.iter().map(|p| format!("{p:<5}")).collect();
        println!("  {}", padded.join(" ").red());
    }

    println!();
    println!(
        "  Total: {} ({} configured extra)",
        banned.len().to_string().bright_white().bold(),
        config.extra_banned_patterns.len()
    );
    println!();

    Ok(())
}

/// Prints the size of a shape's code space.
fn handle_capacity(shape: CodeShape) -> Result<()> {
    shape.validate()?;

    println!("{}", "📐 Code Shape".bright_blue().bold());
    println!();
    println!("  Alphanumeric: {}", shape.alphanumeric_length.to_string().cyan());
    println!("  Alpha:        {}", shape.alpha_length.to_string().cyan());
    println!("  Numeric:      {}", shape.numeric_length.to_string().cyan());
    println!(
        "  Mode:         {}",
        (if shape.randomized { "random" } else { "sequential" }).cyan()
    );
    println!("  Length:       {}", shape.total_length().to_string().cyan());

    match shape.capacity() {
        Some(capacity) if capacity < 1_000 => println!(
            "  Capacity:     {} {}",
            capacity.to_string().yellow().bold(),
            "(small: a busy day may exhaust it)".yellow()
        ),
        Some(capacity) => println!("  Capacity:     {}", capacity.to_string().green().bold()),
        None => println!("  Capacity:     {}", "more than 2^128".green().bold()),
    }
    println!();

    Ok(())
}
