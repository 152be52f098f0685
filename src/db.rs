use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::config::Settings;
use crate::error::AnalyticsError;
use crate::models::{CourseProgressRecord, CourseRecord, QuizAttemptRecord, Snapshot, UserRecord};

pub async fn connect(settings: &Settings) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect(&settings.database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

struct SeedUser {
    id: Uuid,
    name: &'static str,
    email: &'static str,
    created_at: DateTime<Utc>,
}

struct SeedCourse {
    id: Uuid,
    title: &'static str,
    enrolled_students: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

struct SeedAttempt {
    source_key: &'static str,
    user_id: Uuid,
    score: i32,
    total_questions: i32,
    completed_at: DateTime<Utc>,
}

struct SeedProgress {
    user_id: Uuid,
    course_id: Uuid,
    progress: i32,
    completed_at: Option<DateTime<Utc>>,
}

struct SeedRecords {
    courses: Vec<SeedCourse>,
    attempts: Vec<SeedAttempt>,
    progress: Vec<SeedProgress>,
}

fn seed_users(now: DateTime<Utc>) -> [SeedUser; 3] {
    [
        SeedUser {
            id: Uuid::from_u128(0x3d7f5d6f_24f7_4e8e_8b4b_3e7e44b4a7b2),
            name: "Avery Lee",
            email: "avery.lee@flashlearn.dev",
            created_at: now - Duration::days(140),
        },
        SeedUser {
            id: Uuid::from_u128(0x0c22f1f1_9184_4fd4_9b21_28c68a6a89dc),
            name: "Jules Moreno",
            email: "jules.moreno@flashlearn.dev",
            created_at: now - Duration::days(75),
        },
        SeedUser {
            id: Uuid::from_u128(0xd5a0a1a2_2a3c_44c2_8f73_60b7897a9dd2),
            name: "Kiara Patel",
            email: "kiara.patel@flashlearn.dev",
            created_at: now - Duration::days(12),
        },
    ]
}

/// Courses, attempts and progress for the seed users. `user_ids` are the ids the
/// database holds for those emails, which differ from the defaults when a user already existed.
fn seed_records(user_ids: [Uuid; 3], now: DateTime<Utc>) -> SeedRecords {
    let [avery, jules, kiara] = user_ids;
    let ownership = Uuid::from_u128(0x8f0b3c7e_5b8d_4a0e_9d0b_6b7f9c1e2a31);
    let async_foundations = Uuid::from_u128(0xb2e4f6a8_1c3d_4e5f_8a9b_0c1d2e3f4a5b);

    let courses = vec![
        SeedCourse {
            id: ownership,
            title: "Ownership and Borrowing",
            enrolled_students: vec![avery, jules, kiara],
            created_at: now - Duration::days(120),
        },
        SeedCourse {
            id: async_foundations,
            title: "Async Foundations",
            enrolled_students: vec![avery, kiara],
            created_at: now - Duration::days(40),
        },
        SeedCourse {
            id: Uuid::from_u128(0xc7d8e9f0_a1b2_4c3d_9e4f_5a6b7c8d9e0f),
            title: "Testing in Practice",
            enrolled_students: Vec::new(),
            created_at: now - Duration::days(3),
        },
    ];

    let attempt = |source_key, user_id, score, total_questions, days_ago| SeedAttempt {
        source_key,
        user_id,
        score,
        total_questions,
        completed_at: now - Duration::days(days_ago),
    };
    let attempts = vec![
        attempt("seed-001", avery, 8, 10, 30),
        attempt("seed-002", avery, 9, 10, 6),
        attempt("seed-003", jules, 20, 20, 18),
        attempt("seed-004", kiara, 6, 12, 2),
    ];

    let progress = vec![
        SeedProgress {
            user_id: avery,
            course_id: ownership,
            progress: 100,
            completed_at: Some(now - Duration::days(20)),
        },
        SeedProgress {
            user_id: jules,
            course_id: ownership,
            progress: 65,
            completed_at: None,
        },
        SeedProgress {
            user_id: kiara,
            course_id: async_foundations,
            progress: 100,
            completed_at: Some(now - Duration::days(1)),
        },
    ];

    SeedRecords {
        courses,
        attempts,
        progress,
    }
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let users = seed_users(now);
    let mut tx = pool.begin().await?;

    let mut user_ids = [Uuid::nil(); 3];
    for (slot, user) in user_ids.iter_mut().zip(&users) {
        *slot = sqlx::query(
            r#"
            INSERT INTO flashlearn.users (id, name, email, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(user.id)
        .bind(user.name)
        .bind(user.email)
        .bind(user.created_at)
        .fetch_one(&mut *tx)
        .await?
        .try_get("id")?;
    }

    let records = seed_records(user_ids, now);

    for course in &records.courses {
        sqlx::query(
            r#"
            INSERT INTO flashlearn.courses (id, title, enrolled_students, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title, enrolled_students = EXCLUDED.enrolled_students
            "#,
        )
        .bind(course.id)
        .bind(course.title)
        .bind(&course.enrolled_students)
        .bind(course.created_at)
        .execute(&mut *tx)
        .await?;
    }

    for attempt in &records.attempts {
        sqlx::query(
            r#"
            INSERT INTO flashlearn.quiz_attempts
            (id, user_id, score, total_questions, completed_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(attempt.user_id)
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .bind(attempt.completed_at)
        .bind(attempt.source_key)
        .execute(&mut *tx)
        .await?;
    }

    for progress in &records.progress {
        sqlx::query(
            r#"
            INSERT INTO flashlearn.course_progress (user_id, course_id, progress, completed_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, course_id) DO UPDATE
            SET progress = EXCLUDED.progress, completed_at = EXCLUDED.completed_at
            "#,
        )
        .bind(progress.user_id)
        .bind(progress.course_id)
        .bind(progress.progress)
        .bind(progress.completed_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await.context("failed to commit seed data")?;

    tracing::info!(
        users = users.len(),
        courses = records.courses.len(),
        attempts = records.attempts.len(),
        "seed data written"
    );
    Ok(())
}

pub async fn import_attempts_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        name: String,
        email: String,
        score: i32,
        total_questions: i32,
        completed_at: DateTime<Utc>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("cannot open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid row {}", line + 1))?;
        let user_id: Uuid = sqlx::query(
            r#"
            INSERT INTO flashlearn.users (id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.name)
        .bind(&row.email)
        .fetch_one(pool)
        .await?
        .try_get("id")?;

        let source_key = row
            .source_key
            .filter(|key| !key.trim().is_empty())
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO flashlearn.quiz_attempts
            (id, user_id, score, total_questions, completed_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(row.score)
        .bind(row.total_questions)
        .bind(row.completed_at)
        .bind(&source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        } else {
            tracing::debug!(%source_key, "attempt already imported");
        }
    }

    Ok(inserted)
}

pub async fn fetch_users(pool: &PgPool) -> Result<Vec<UserRecord>, AnalyticsError> {
    const OPERATION: &str = "fetching users";

    let rows = sqlx::query("SELECT id, name, email, created_at FROM flashlearn.users")
        .fetch_all(pool)
        .await
        .map_err(AnalyticsError::backend(OPERATION))?;

    rows.iter()
        .map(user_from_row)
        .collect::<Result<_, _>>()
        .map_err(AnalyticsError::backend(OPERATION))
}

pub async fn fetch_courses(pool: &PgPool) -> Result<Vec<CourseRecord>, AnalyticsError> {
    const OPERATION: &str = "fetching courses";

    let rows = sqlx::query(
        "SELECT id, title, enrolled_students, created_at FROM flashlearn.courses",
    )
    .fetch_all(pool)
    .await
    .map_err(AnalyticsError::backend(OPERATION))?;

    rows.iter()
        .map(course_from_row)
        .collect::<Result<_, _>>()
        .map_err(AnalyticsError::backend(OPERATION))
}

pub async fn fetch_quiz_attempts(pool: &PgPool) -> Result<Vec<QuizAttemptRecord>, AnalyticsError> {
    const OPERATION: &str = "fetching quiz attempts";

    let rows = sqlx::query(
        "SELECT id, user_id, score, total_questions, completed_at FROM flashlearn.quiz_attempts",
    )
    .fetch_all(pool)
    .await
    .map_err(AnalyticsError::backend(OPERATION))?;

    rows.iter()
        .map(attempt_from_row)
        .collect::<Result<_, _>>()
        .map_err(AnalyticsError::backend(OPERATION))
}

pub async fn fetch_course_progress(
    pool: &PgPool,
) -> Result<Vec<CourseProgressRecord>, AnalyticsError> {
    const OPERATION: &str = "fetching course progress";

    let rows = sqlx::query(
        "SELECT user_id, course_id, progress, completed_at FROM flashlearn.course_progress",
    )
    .fetch_all(pool)
    .await
    .map_err(AnalyticsError::backend(OPERATION))?;

    rows.iter()
        .map(progress_from_row)
        .collect::<Result<_, _>>()
        .map_err(AnalyticsError::backend(OPERATION))
}

/// Loads all four collections concurrently. Any failure aborts the whole snapshot.
pub async fn fetch_snapshot(pool: &PgPool) -> Result<Snapshot, AnalyticsError> {
    let (users, courses, quiz_attempts, course_progress) = tokio::try_join!(
        fetch_users(pool),
        fetch_courses(pool),
        fetch_quiz_attempts(pool),
        fetch_course_progress(pool),
    )?;

    tracing::debug!(
        users = users.len(),
        courses = courses.len(),
        quiz_attempts = quiz_attempts.len(),
        course_progress = course_progress.len(),
        "snapshot loaded"
    );

    Ok(Snapshot {
        users,
        courses,
        quiz_attempts,
        course_progress,
    })
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

fn course_from_row(row: &PgRow) -> Result<CourseRecord, sqlx::Error> {
    Ok(CourseRecord::from_parts(
        row.try_get("id")?,
        row.try_get("title")?,
        row.try_get("enrolled_students")?,
        row.try_get("created_at")?,
    ))
}

fn attempt_from_row(row: &PgRow) -> Result<QuizAttemptRecord, sqlx::Error> {
    Ok(QuizAttemptRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        score: i64::from(row.try_get::<i32, _>("score")?),
        total_questions: i64::from(row.try_get::<i32, _>("total_questions")?),
        completed_at: row.try_get("completed_at")?,
    })
}

fn progress_from_row(row: &PgRow) -> Result<CourseProgressRecord, sqlx::Error> {
    Ok(CourseProgressRecord {
        user_id: row.try_get("user_id")?,
        course_id: row.try_get("course_id")?,
        progress: i64::from(row.try_get::<i32, _>("progress")?),
        completed_at: row.try_get("completed_at")?,
    })
}
