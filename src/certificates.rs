use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{CertificateEntry, CourseProgressRecord, CourseRecord, UserRecord};

/// Completed course progress joined to its user and course, newest first.
pub fn list_certificates(
    users: &[UserRecord],
    courses: &[CourseRecord],
    progress: &[CourseProgressRecord],
) -> Vec<CertificateEntry> {
    let users_by_id: HashMap<Uuid, &UserRecord> =
        users.iter().map(|user| (user.id, user)).collect();
    let courses_by_id: HashMap<Uuid, &CourseRecord> =
        courses.iter().map(|course| (course.id, course)).collect();

    let mut certificates: Vec<CertificateEntry> = progress
        .iter()
        .filter(|record| record.is_complete())
        .filter_map(|record| {
            let user = users_by_id.get(&record.user_id)?;
            let course = courses_by_id.get(&record.course_id)?;
            Some(CertificateEntry {
                user_id: user.id,
                name: user.name.clone(),
                email: user.email.clone(),
                course_id: course.id,
                course_title: course.title.clone(),
                completed_at: record.completed_at,
            })
        })
        .collect();

    // None sorts below Some, so undated certificates end up last
    certificates.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    certificates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn lists_only_completed_and_known_records() {
        let user = UserRecord {
            id: Uuid::new_v4(),
            name: "Kiara Patel".to_string(),
            email: "kiara@example.com".to_string(),
            created_at: None,
        };
        let course = CourseRecord {
            id: Uuid::new_v4(),
            title: "Ownership 101".to_string(),
            enrolled_students: vec![user.id],
            created_at: None,
        };
        let other = CourseRecord {
            id: Uuid::new_v4(),
            title: "Lifetimes".to_string(),
            enrolled_students: vec![user.id],
            created_at: None,
        };
        let progress = vec![
            CourseProgressRecord {
                user_id: user.id,
                course_id: course.id,
                progress: 100,
                completed_at: None,
            },
            CourseProgressRecord {
                user_id: user.id,
                course_id: other.id,
                progress: 100,
                completed_at: Some(Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap()),
            },
            CourseProgressRecord {
                user_id: user.id,
                course_id: Uuid::new_v4(),
                progress: 100,
                completed_at: None,
            },
            CourseProgressRecord {
                user_id: Uuid::new_v4(),
                course_id: course.id,
                progress: 60,
                completed_at: None,
            },
        ];

        let certificates = list_certificates(&[user], &[course, other], &progress);
        let titles: Vec<&str> = certificates
            .iter()
            .map(|entry| entry.course_title.as_str())
            .collect();
        assert_eq!(titles, vec!["Lifetimes", "Ownership 101"]);
    }
}
