use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod badge;
mod certificates;
mod config;
mod db;
mod error;
mod leaderboard;
mod models;
mod months;
mod report;
mod summary;

use crate::badge::badge_for;
use crate::config::Settings;
use crate::leaderboard::DEFAULT_LEADERBOARD_LIMIT;

#[derive(Parser)]
#[command(name = "flashlearn-analytics")]
#[command(about = "Summary statistics and quiz leaderboards for FlashLearn", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import quiz attempts from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print platform totals and the trailing six-month activity
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Rank learners by quiz points
    Leaderboard {
        #[arg(long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: usize,
        /// Write the ranking as CSV instead of printing it
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// List completed courses, newest first
    Certificates {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .try_init()
        .context("failed to install tracing subscriber")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let pool = db::connect(&cli.settings).await?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_attempts_csv(&pool, &csv).await?;
            println!("Inserted {inserted} quiz attempts from {}.", csv.display());
        }
        Commands::Summary { json } => {
            let snapshot = db::fetch_snapshot(&pool).await?;
            let stats = summary::compute_summary(&snapshot, Utc::now());

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
                return Ok(());
            }

            println!(
                "{} users, {} courses, {} enrollments",
                stats.total_users, stats.total_courses, stats.total_enrollments
            );
            println!(
                "{} quiz attempts averaging {}%, {} certificates",
                stats.total_quiz_attempts, stats.average_quiz_score, stats.total_certificates
            );
            println!("Month       users  attempts  enrollments");
            for ((users, attempts), enrollments) in stats
                .users_by_month
                .iter()
                .zip(&stats.quiz_attempts_by_month)
                .zip(&stats.enrollments_by_month)
            {
                println!(
                    "{:<10} {:>6} {:>9} {:>12}",
                    users.month, users.count, attempts.count, enrollments.count
                );
            }
            if !stats.top_courses.is_empty() {
                println!("Top courses:");
                for course in &stats.top_courses {
                    println!("- {} ({} enrollments)", course.title, course.enrollments);
                }
            }
        }
        Commands::Leaderboard { limit, csv } => {
            let (users, attempts) =
                tokio::try_join!(db::fetch_users(&pool), db::fetch_quiz_attempts(&pool))?;
            let board = leaderboard::compute_leaderboard(&users, &attempts, limit);

            if let Some(path) = csv {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("cannot create {}", path.display()))?;
                report::write_leaderboard_csv(file, &board)?;
                println!("Leaderboard written to {}.", path.display());
                return Ok(());
            }

            if board.is_empty() {
                println!("No quiz attempts recorded yet.");
                return Ok(());
            }

            println!("Top learners by quiz points:");
            for (rank, entry) in board.iter().enumerate() {
                println!(
                    "{:>2}. {} ({}) {} points, avg {}%, best {}% [{}] across {} attempts",
                    rank + 1,
                    entry.name,
                    entry.email,
                    entry.total_points,
                    entry.average_score,
                    entry.best_score,
                    badge_for(entry.best_score),
                    entry.attempts
                );
            }
        }
        Commands::Certificates { limit } => {
            let (users, courses, progress) = tokio::try_join!(
                db::fetch_users(&pool),
                db::fetch_courses(&pool),
                db::fetch_course_progress(&pool),
            )?;
            let issued = certificates::list_certificates(&users, &courses, &progress);

            if issued.is_empty() {
                println!("No courses completed yet.");
                return Ok(());
            }

            for certificate in issued.iter().take(limit) {
                let completed = certificate
                    .completed_at
                    .map(|at| at.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "- {} ({}) completed {} on {}",
                    certificate.name, certificate.email, certificate.course_title, completed
                );
            }
        }
        Commands::Report { limit, out } => {
            let generated_at = Utc::now();
            let snapshot = db::fetch_snapshot(&pool).await?;
            let stats = summary::compute_summary(&snapshot, generated_at);
            let board =
                leaderboard::compute_leaderboard(&snapshot.users, &snapshot.quiz_attempts, limit);
            let issued = certificates::list_certificates(
                &snapshot.users,
                &snapshot.courses,
                &snapshot.course_progress,
            );
            let report = report::build_report(&stats, &board, &issued, generated_at);
            std::fs::write(&out, report)
                .with_context(|| format!("cannot write {}", out.display()))?;
            tracing::info!(path = %out.display(), "report generated");
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
