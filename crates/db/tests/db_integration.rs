//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored --test-threads=1`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `napoleon_test`)
//!   `TEST_DB_PASSWORD` (default: `napoleon_test`)
//!   `TEST_DB_NAME` (default: `napoleon_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use napoleon_db::entities::video;
use napoleon_db::repositories::{ShotRepository, VideoRepository, VoteRepository};
use napoleon_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;

async fn fresh_db() -> TestDatabase {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.expect("Cleanup failed");
    db
}

fn new_video(shot_id: i64, owner: &str, n: i64) -> video::ActiveModel {
    video::ActiveModel {
        shot_id: Set(shot_id),
        user_id: Set(owner.to_string()),
        user_email: Set(Some(format!("{owner}@example.com"))),
        video_url: Set(format!("https://cdn.example/{n}.mp4")),
        storage_key: Set(format!("shot-{shot_id}/{owner}/{n}.mp4")),
        description: Set(None),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_videos_with_votes_counts_and_flags() {
    let db = fresh_db().await;
    let conn = Arc::new(db.conn.clone());
    let shot = db.seed_shot("Toulon", 1).await.unwrap();

    let videos = VideoRepository::new(conn.clone());
    let votes = VoteRepository::new(conn.clone());

    let a = videos.create(new_video(shot.id, "alice", 1)).await.unwrap();
    let b = videos.create(new_video(shot.id, "bob", 2)).await.unwrap();

    votes.create(a.id, "carol").await.unwrap();
    votes.create(a.id, "dave").await.unwrap();
    votes.create(b.id, "carol").await.unwrap();

    let listed = videos.with_votes(shot.id, Some("dave")).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, a.id);
    assert_eq!(listed[0].votes_count, 2);
    assert!(listed[0].has_voted);
    assert_eq!(listed[1].votes_count, 1);
    assert!(!listed[1].has_voted);

    let anonymous = videos.with_votes(shot.id, None).await.unwrap();
    assert!(anonymous.iter().all(|v| !v.has_voted));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_vote_is_conflict() {
    let db = fresh_db().await;
    let conn = Arc::new(db.conn.clone());
    let shot = db.seed_shot("Austerlitz", 1).await.unwrap();

    let videos = VideoRepository::new(conn.clone());
    let video = videos.create(new_video(shot.id, "alice", 1)).await.unwrap();
    let votes = VoteRepository::new(conn);

    votes.create(video.id, "bob").await.unwrap();
    let second = votes.create(video.id, "bob").await;

    assert!(matches!(
        second,
        Err(napoleon_common::AppError::Conflict(_))
    ));
    let listed = videos.with_votes(shot.id, Some("bob")).await.unwrap();
    assert_eq!(listed[0].votes_count, 1);
    assert!(listed[0].has_voted);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_shots_with_top_videos() {
    let db = fresh_db().await;
    let conn = Arc::new(db.conn.clone());
    let second = db.seed_shot("Waterloo", 2).await.unwrap();
    let first = db.seed_shot("Corsica", 1).await.unwrap();

    let videos = VideoRepository::new(conn.clone());
    let votes = VoteRepository::new(conn.clone());

    let low = videos.create(new_video(first.id, "alice", 1)).await.unwrap();
    let high = videos.create(new_video(first.id, "bob", 2)).await.unwrap();
    votes.create(high.id, "carol").await.unwrap();
    votes.create(high.id, "dave").await.unwrap();
    votes.create(low.id, "erin").await.unwrap();

    let rows = ShotRepository::new(conn).with_top_videos().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, first.id);
    assert_eq!(rows[0].top_video_id, Some(high.id));
    assert_eq!(rows[0].top_video_votes, Some(2));
    assert_eq!(rows[1].id, second.id);
    assert_eq!(rows[1].top_video_id, None);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_video_cascades_votes() {
    let db = fresh_db().await;
    let conn = Arc::new(db.conn.clone());
    let shot = db.seed_shot("Elba", 1).await.unwrap();

    let videos = VideoRepository::new(conn.clone());
    let votes = VoteRepository::new(conn);

    let video = videos.create(new_video(shot.id, "alice", 1)).await.unwrap();
    votes.create(video.id, "bob").await.unwrap();

    videos.delete_owned(video.id, "alice").await.unwrap();

    assert!(
        votes
            .find_by_video_and_user(video.id, "bob")
            .await
            .unwrap()
            .is_none()
    );
    assert!(videos.find_by_id(video.id).await.unwrap().is_none());
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.database.is_empty());
}
