use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{percentage, LeaderboardEntry, QuizAttemptRecord, UserRecord};

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
pub const POINTS_PER_SCORE: i64 = 10;

#[derive(Debug, Default)]
struct AttemptTally {
    attempts: i64,
    score_sum: i64,
    question_sum: i64,
    best_score: i64,
}

pub fn compute_leaderboard(
    users: &[UserRecord],
    attempts: &[QuizAttemptRecord],
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let users_by_id: HashMap<Uuid, &UserRecord> =
        users.iter().map(|user| (user.id, user)).collect();

    let mut order: Vec<Uuid> = Vec::new();
    let mut tallies: HashMap<Uuid, AttemptTally> = HashMap::new();

    for attempt in attempts {
        if !users_by_id.contains_key(&attempt.user_id) {
            tracing::debug!(
                attempt_id = %attempt.id,
                user_id = %attempt.user_id,
                "skipping quiz attempt without a matching user"
            );
            continue;
        }

        let tally = tallies.entry(attempt.user_id).or_insert_with(|| {
            order.push(attempt.user_id);
            AttemptTally::default()
        });

        tally.attempts += 1;
        tally.score_sum += attempt.score;
        tally.question_sum += attempt.total_questions;
        tally.best_score = tally
            .best_score
            .max(percentage(attempt.score, attempt.total_questions));
    }

    let mut entries: Vec<LeaderboardEntry> = order
        .into_iter()
        .filter_map(|user_id| {
            let user = users_by_id.get(&user_id)?;
            let tally = tallies.remove(&user_id)?;
            Some(LeaderboardEntry {
                user_id,
                name: user.name.clone(),
                email: user.email.clone(),
                attempts: tally.attempts,
                average_score: percentage(tally.score_sum, tally.question_sum),
                best_score: tally.best_score,
                total_points: tally.score_sum * POINTS_PER_SCORE,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then_with(|| b.average_score.cmp(&a.average_score))
    });
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            created_at: None,
        }
    }

    fn attempt(user: &UserRecord, score: i64, total_questions: i64) -> QuizAttemptRecord {
        QuizAttemptRecord {
            id: Uuid::new_v4(),
            user_id: user.id,
            score,
            total_questions,
            completed_at: None,
        }
    }

    #[test]
    fn ranks_by_points_with_per_user_stats() {
        let a = user("Avery");
        let b = user("Jules");
        let attempts = vec![attempt(&a, 8, 10), attempt(&a, 9, 10), attempt(&b, 20, 20)];

        let board = compute_leaderboard(&[a.clone(), b.clone()], &attempts, DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(board.len(), 2);

        assert_eq!(board[0].user_id, b.id);
        assert_eq!(board[0].attempts, 1);
        assert_eq!(board[0].average_score, 100);
        assert_eq!(board[0].best_score, 100);
        assert_eq!(board[0].total_points, 200);

        assert_eq!(board[1].user_id, a.id);
        assert_eq!(board[1].attempts, 2);
        assert_eq!(board[1].average_score, 85);
        assert_eq!(board[1].best_score, 90);
        assert_eq!(board[1].total_points, 170);
    }

    #[test]
    fn users_without_attempts_are_left_out() {
        let a = user("Avery");
        let idle = user("Kiara");
        let board = compute_leaderboard(&[idle.clone(), a.clone()], &[attempt(&a, 1, 4)], 10);
        assert_eq!(board.len(), 1);
        assert!(board.iter().all(|entry| entry.user_id != idle.id));
    }

    #[test]
    fn equal_points_fall_back_to_average() {
        let a = user("Avery");
        let b = user("Jules");
        let attempts = vec![attempt(&a, 10, 20), attempt(&b, 10, 10)];
        let board = compute_leaderboard(&[a, b.clone()], &attempts, 10);
        assert_eq!(board[0].user_id, b.id);
        assert_eq!(board[0].total_points, board[1].total_points);
        assert!(board[0].average_score > board[1].average_score);
    }

    #[test]
    fn full_ties_keep_first_appearance_order() {
        let a = user("Avery");
        let b = user("Jules");
        let attempts = vec![attempt(&b, 5, 10), attempt(&a, 5, 10)];
        let board = compute_leaderboard(&[a, b.clone()], &attempts, 10);
        assert_eq!(board[0].user_id, b.id);
    }

    #[test]
    fn limit_truncates_to_top_ranked() {
        let users: Vec<UserRecord> = (0..10).map(|i| user(&format!("User{i}"))).collect();
        let attempts: Vec<QuizAttemptRecord> = users
            .iter()
            .enumerate()
            .map(|(i, u)| attempt(u, i as i64 + 1, 10))
            .collect();

        let board = compute_leaderboard(&users, &attempts, 3);
        let points: Vec<i64> = board.iter().map(|entry| entry.total_points).collect();
        assert_eq!(points, vec![100, 90, 80]);
    }

    #[test]
    fn points_are_ten_times_raw_score_sum() {
        let a = user("Avery");
        let attempts = vec![attempt(&a, 3, 7), attempt(&a, 0, 0), attempt(&a, 11, 12)];
        let board = compute_leaderboard(&[a], &attempts, 10);
        assert_eq!(board[0].total_points, 140);
        assert_eq!(board[0].attempts, 3);
        assert_eq!(board[0].best_score, 92);
    }

    #[test]
    fn attempts_for_unknown_users_are_dropped() {
        let a = user("Avery");
        let ghost = user("Ghost");
        let attempts = vec![attempt(&ghost, 9, 9), attempt(&a, 1, 2), attempt(&ghost, 4, 4)];
        let board = compute_leaderboard(&[a.clone()], &attempts, 10);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, a.id);
        assert_eq!(board[0].attempts, 1);
        assert_eq!(board[0].total_points, 10);
        assert_eq!(board[0].best_score, 50);
    }
}
