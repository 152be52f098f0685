use chrono::{DateTime, Utc};

use crate::models::{percentage, MonthlyBucket, Snapshot, SummaryStats, TopCourseEntry};
use crate::months;

pub const TOP_COURSES: usize = 5;

pub fn compute_summary(snapshot: &Snapshot, now: DateTime<Utc>) -> SummaryStats {
    let total_enrollments = snapshot
        .courses
        .iter()
        .map(|course| course.enrollment_count())
        .sum();

    let (score_sum, question_sum) = snapshot
        .quiz_attempts
        .iter()
        .fold((0i64, 0i64), |(score, questions), attempt| {
            (score + attempt.score, questions + attempt.total_questions)
        });

    let total_certificates = snapshot
        .course_progress
        .iter()
        .filter(|record| record.is_complete())
        .count() as i64;

    SummaryStats {
        total_users: snapshot.users.len() as i64,
        total_courses: snapshot.courses.len() as i64,
        total_enrollments,
        total_quiz_attempts: snapshot.quiz_attempts.len() as i64,
        average_quiz_score: percentage(score_sum, question_sum),
        total_certificates,
        users_by_month: months::bucket_timestamps(
            snapshot.users.iter().map(|user| user.created_at),
            now,
        ),
        quiz_attempts_by_month: months::bucket_timestamps(
            snapshot.quiz_attempts.iter().map(|attempt| attempt.completed_at),
            now,
        ),
        enrollments_by_month: enrollments_by_month(snapshot, now),
        top_courses: top_courses(snapshot),
    }
}

/// Each course's whole enrollment lands in its creation month, then every bucket is
/// divided by the window length. There are no per-enrollment timestamps to do better.
fn enrollments_by_month(snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<MonthlyBucket> {
    let counts = months::count_by_month(
        snapshot
            .courses
            .iter()
            .map(|course| (course.created_at, course.enrollment_count())),
        now,
    );

    months::window(&counts, now)
        .into_iter()
        .map(|bucket| MonthlyBucket {
            count: (bucket.count as f64 / months::WINDOW_MONTHS as f64).round() as i64,
            month: bucket.month,
        })
        .collect()
}

fn top_courses(snapshot: &Snapshot) -> Vec<TopCourseEntry> {
    let mut courses: Vec<TopCourseEntry> = snapshot
        .courses
        .iter()
        .map(|course| TopCourseEntry {
            course_id: course.id,
            title: course.title.clone(),
            enrollments: course.enrollment_count(),
        })
        .collect();

    // stable: equal counts keep input order
    courses.sort_by(|a, b| b.enrollments.cmp(&a.enrollments));
    courses.truncate(TOP_COURSES);
    courses
}
