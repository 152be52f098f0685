use std::fmt::Write;
use std::io;

use chrono::{DateTime, Utc};

use crate::badge::badge_for;
use crate::models::{CertificateEntry, LeaderboardEntry, SummaryStats};

pub const RECENT_CERTIFICATES: usize = 5;

pub fn build_report(
    summary: &SummaryStats,
    leaderboard: &[LeaderboardEntry],
    certificates: &[CertificateEntry],
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# FlashLearn Analytics Report");
    let _ = writeln!(output, "Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Users: {}", summary.total_users);
    let _ = writeln!(output, "- Courses: {}", summary.total_courses);
    let _ = writeln!(output, "- Enrollments: {}", summary.total_enrollments);
    let _ = writeln!(output, "- Quiz attempts: {}", summary.total_quiz_attempts);
    let _ = writeln!(output, "- Average quiz score: {}%", summary.average_quiz_score);
    let _ = writeln!(output, "- Certificates issued: {}", summary.total_certificates);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Activity");
    let _ = writeln!(output, "| Month | New users | Quiz attempts | Enrollments |");
    let _ = writeln!(output, "|---|---|---|---|");
    for ((users, attempts), enrollments) in summary
        .users_by_month
        .iter()
        .zip(&summary.quiz_attempts_by_month)
        .zip(&summary.enrollments_by_month)
    {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            users.month, users.count, attempts.count, enrollments.count
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Courses");

    if summary.top_courses.is_empty() {
        let _ = writeln!(output, "No courses published yet.");
    } else {
        for (rank, course) in summary.top_courses.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({} enrollments)",
                rank + 1,
                course.title,
                course.enrollments
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Leaderboard");

    if leaderboard.is_empty() {
        let _ = writeln!(output, "No quiz attempts recorded.");
    } else {
        for (rank, entry) in leaderboard.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({}) {} points, avg {}%, best {}% [{}] across {} attempts",
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

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Certificates");

    if certificates.is_empty() {
        let _ = writeln!(output, "No courses completed yet.");
    } else {
        for certificate in certificates.iter().take(RECENT_CERTIFICATES) {
            let completed = certificate
                .completed_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "date unknown".to_string());
            let _ = writeln!(
                output,
                "- {} completed {} on {}",
                certificate.name, certificate.course_title, completed
            );
        }
    }

    output
}

pub fn write_leaderboard_csv<W: io::Write>(
    writer: W,
    leaderboard: &[LeaderboardEntry],
) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "rank",
        "name",
        "email",
        "attempts",
        "average_score",
        "best_score",
        "total_points",
        "badge",
    ])?;

    for (rank, entry) in leaderboard.iter().enumerate() {
        csv.write_record([
            (rank + 1).to_string(),
            entry.name.clone(),
            entry.email.clone(),
            entry.attempts.to_string(),
            entry.average_score.to_string(),
            entry.best_score.to_string(),
            entry.total_points.to_string(),
            badge_for(entry.best_score).to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
