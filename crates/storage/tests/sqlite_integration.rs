use progress_core::model::{ProgressKey, ProgressUpdate, UserId};
use progress_core::time::fixed_now;
use serde_json::json;
use storage::repository::ProgressRepository;
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_progress_and_payload() {
    let repo = connect("memdb_progress_roundtrip").await;
    let user = UserId::random();
    let key = ProgressKey::new("quiz-ownership");
    let update = ProgressUpdate::in_progress(key.clone(), 35)
        .with_extra(json!({"seed": 7, "session": {"answers": [1, null], "currentQuestion": 1}}));

    let outcome = repo
        .save_progress(user, &update, fixed_now())
        .await
        .expect("save");
    assert!(!outcome.points_awarded);

    let loaded = repo
        .load_progress(user, &key)
        .await
        .expect("load")
        .expect("record exists");
    assert_eq!(loaded.topic_key, key);
    assert!(!loaded.completed);
    assert_eq!(loaded.score, 35);
    assert_eq!(loaded.extra["session"]["answers"], json!([1, null]));
    assert_eq!(loaded.updated_at, fixed_now());
}

#[tokio::test]
async fn sqlite_awards_points_once_and_overwrites() {
    let repo = connect("memdb_progress_points").await;
    let user = UserId::random();
    let key = ProgressKey::new("quiz-traits");

    let done = ProgressUpdate::completed(key.clone(), 60, 60);
    let first = repo.save_progress(user, &done, fixed_now()).await.unwrap();
    assert!(first.points_awarded);

    let retake = ProgressUpdate::completed(key.clone(), 100, 100);
    let second = repo.save_progress(user, &retake, fixed_now()).await.unwrap();
    assert!(!second.points_awarded);

    let loaded = repo.load_progress(user, &key).await.unwrap().unwrap();
    assert_eq!(loaded.score, 100);
    assert_eq!(loaded.points_earned, 100);
    assert_eq!(loaded.extra, serde_json::Value::Null);
}

#[tokio::test]
async fn sqlite_lists_and_deletes_per_user() {
    let repo = connect("memdb_progress_list").await;
    let alice = UserId::random();
    let bob = UserId::random();

    for key in ["borrowing", "quiz-borrowing", "modules"] {
        let update = ProgressUpdate::completed(ProgressKey::new(key), 100, 0);
        repo.save_progress(alice, &update, fixed_now()).await.unwrap();
    }
    let update = ProgressUpdate::in_progress(ProgressKey::new("modules"), 10);
    repo.save_progress(bob, &update, fixed_now()).await.unwrap();

    let listed = repo.list_progress(alice).await.unwrap();
    let keys: Vec<_> = listed.iter().map(|r| r.topic_key.as_str()).collect();
    assert_eq!(keys, vec!["borrowing", "modules", "quiz-borrowing"]);

    assert!(repo.delete_progress(alice, &ProgressKey::new("modules")).await.unwrap());
    assert!(!repo.delete_progress(alice, &ProgressKey::new("modules")).await.unwrap());
    assert_eq!(repo.list_progress(alice).await.unwrap().len(), 2);
    assert_eq!(repo.list_progress(bob).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_corrupt_payload_loads_as_null() {
    let repo = connect("memdb_progress_corrupt").await;
    let user = UserId::random();
    sqlx::query(
        r"
            INSERT INTO topic_progress (
                user_id, topic_key, completed, score, points_earned, extra, updated_at
            )
            VALUES (?1, 'quiz-macros', 0, 20, 0, '{broken', ?2)
        ",
    )
    .bind(user.to_string())
    .bind(fixed_now())
    .execute(repo.pool())
    .await
    .unwrap();

    let loaded = repo
        .load_progress(user, &ProgressKey::new("quiz-macros"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.extra, serde_json::Value::Null);
    assert_eq!(loaded.score, 20);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_progress_migrate").await;
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn sqlite_stores_out_of_range_score_clamped() {
    let repo = connect("memdb_progress_clamp").await;
    let user = UserId::random();
    let key = ProgressKey::new("closures");
    let mut update = ProgressUpdate::completed(key.clone(), 100, 20);
    update.score = 150;

    repo.save_progress(user, &update, fixed_now())
        .await
        .expect("save is not rejected by the score check");

    let loaded = repo.load_progress(user, &key).await.unwrap().unwrap();
    assert_eq!(loaded.score, 100);
}
