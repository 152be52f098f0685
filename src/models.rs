use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CourseRecord {
    pub id: Uuid,
    pub title: String,
    /// May repeat a student; every entry counts as one enrollment.
    pub enrolled_students: Vec<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

impl CourseRecord {
    /// Builds a course from backend columns. A NULL enrollment list means no students.
    pub fn from_parts(
        id: Uuid,
        title: String,
        enrolled_students: Option<Vec<Uuid>>,
        created_at: Option<DateTime<Utc>>,
    ) -> Self {
        CourseRecord {
            id,
            title,
            enrolled_students: enrolled_students.unwrap_or_default(),
            created_at,
        }
    }

    pub fn enrollment_count(&self) -> i64 {
        self.enrolled_students.len() as i64
    }
}

#[derive(Debug, Clone)]
pub struct QuizAttemptRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub score: i64,
    pub total_questions: i64,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CourseProgressRecord {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub progress: i64,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CourseProgressRecord {
    pub fn is_complete(&self) -> bool {
        self.progress == 100
    }
}

/// Complete collections as loaded from the backend in one pass.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub users: Vec<UserRecord>,
    pub courses: Vec<CourseRecord>,
    pub quiz_attempts: Vec<QuizAttemptRecord>,
    pub course_progress: Vec<CourseProgressRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCourseEntry {
    pub course_id: Uuid,
    pub title: String,
    pub enrollments: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_users: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_quiz_attempts: i64,
    pub average_quiz_score: i64,
    pub total_certificates: i64,
    pub users_by_month: Vec<MonthlyBucket>,
    pub quiz_attempts_by_month: Vec<MonthlyBucket>,
    pub enrollments_by_month: Vec<MonthlyBucket>,
    pub top_courses: Vec<TopCourseEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub attempts: i64,
    pub average_score: i64,
    pub best_score: i64,
    pub total_points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateEntry {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub course_id: Uuid,
    pub course_title: String,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Rounded percentage of `numerator / denominator`, or 0 when there is nothing to divide by.
pub fn percentage(numerator: i64, denominator: i64) -> i64 {
    if denominator == 0 {
        return 0;
    }
    (100.0 * numerator as f64 / denominator as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(17, 20), 85);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(2, 3), 67);
    }

    #[test]
    fn percentage_of_zero_denominator_is_zero() {
        assert_eq!(percentage(5, 0), 0);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn missing_enrollment_list_is_empty() {
        let course = CourseRecord::from_parts(Uuid::new_v4(), "Lifetimes".to_string(), None, None);
        assert!(course.enrolled_students.is_empty());
        assert_eq!(course.enrollment_count(), 0);
    }

    #[test]
    fn repeated_students_count_separately() {
        let x = Uuid::new_v4();
        let y = Uuid::new_v4();
        let course =
            CourseRecord::from_parts(Uuid::new_v4(), "Lifetimes".to_string(), Some(vec![x, x, y]), None);
        assert_eq!(course.enrollment_count(), 3);
    }

    #[test]
    fn progress_completion_requires_full_progress() {
        let record = CourseProgressRecord {
            user_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            progress: 99,
            completed_at: None,
        };
        assert!(!record.is_complete());
        assert!(CourseProgressRecord { progress: 100, ..record }.is_complete());
    }
}
