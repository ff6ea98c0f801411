use chrono::{Duration, FixedOffset, TimeZone};
use quiz_core::gate::SetMembershipGate;
use quiz_core::model::{
    CardId, Category, CategoryId, CategoryPoints, Flashcard, ScoreReport, SetId, UserProfile,
};
use quiz_core::scoring::{RewardPolicy, apply_report};
use quiz_core::streak::record_login;
use quiz_core::time::fixed_now;
use storage::repository::{
    CategoryRepository, FlashcardRepository, ProfileRepository, RewardPersistence, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn open(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn card(id: u64, set: u64, category: u64) -> Flashcard {
    Flashcard::new(
        CardId::new(id),
        format!("Q{id}"),
        format!("A{id}"),
        CategoryId::new(category),
        SetId::new(set),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_round_trips_categories_and_cards() {
    let repo = open("memdb_cards").await;
    repo.upsert_category(&Category::new(CategoryId::new(1), "Capitals", 0))
        .await
        .unwrap();
    for (id, set) in [(2, 10), (1, 10), (3, 11)] {
        repo.upsert_flashcard(&card(id, set, 1)).await.unwrap();
    }

    let cards = repo.cards_for_set(SetId::new(10)).await.unwrap();
    let ids: Vec<_> = cards.iter().map(|c| c.id().value()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(cards[0].solution(), "A1");

    repo.update_points(CategoryPoints::new(CategoryId::new(1), 25))
        .await
        .unwrap();
    let category = repo.find_category(CategoryId::new(1)).await.unwrap().unwrap();
    assert_eq!(category.points().points(), 25);
    assert!(repo.find_category(CategoryId::new(2)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_rejects_card_for_unknown_category() {
    let repo = open("memdb_orphan_card").await;
    let err = repo.upsert_flashcard(&card(1, 1, 99)).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_loads_fresh_profile_when_empty() {
    let repo = open("memdb_empty_profile").await;
    assert_eq!(repo.load_profile().await.unwrap(), UserProfile::new());
}

#[tokio::test]
async fn sqlite_round_trips_profile_snapshot() {
    let repo = open("memdb_profile").await;
    let offset = FixedOffset::east_opt(-5 * 3600).unwrap();
    let first = offset.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap();

    let mut profile = record_login(&UserProfile::new(), first);
    profile = record_login(&profile, first + Duration::days(1));

    let report =
        ScoreReport::from_persisted(SetId::new(4), CategoryId::new(1), 3, 5, fixed_now()).unwrap();
    let outcome = apply_report(
        &report,
        &profile,
        CategoryPoints::new(CategoryId::new(1), 0),
        &RewardPolicy::default(),
        &SetMembershipGate,
    );

    repo.save_profile(&outcome.profile).await.unwrap();
    let loaded = repo.load_profile().await.unwrap();

    assert_eq!(loaded, outcome.profile);
    assert_eq!(loaded.streak(), 2);
    assert_eq!(loaded.login_timestamps()[0].offset().local_minus_utc(), -5 * 3600);
    assert_eq!(loaded.history().len(), 1);
    assert!(loaded.completed_set_ids().contains(&SetId::new(4)));
}

#[tokio::test]
async fn sqlite_persist_reward_is_atomic() {
    let repo = open("memdb_reward").await;
    let profile = UserProfile::from_persisted(120, 20, [SetId::new(1)], [], 1, []);

    let err = repo
        .persist_reward(&profile, CategoryPoints::new(CategoryId::new(7), 30))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    assert_eq!(repo.load_profile().await.unwrap(), UserProfile::new());

    repo.upsert_category(&Category::new(CategoryId::new(7), "Verbs", 0))
        .await
        .unwrap();
    repo.persist_reward(&profile, CategoryPoints::new(CategoryId::new(7), 30))
        .await
        .unwrap();

    assert_eq!(repo.load_profile().await.unwrap().xp(), 120);
    let category = repo.find_category(CategoryId::new(7)).await.unwrap().unwrap();
    assert_eq!(category.points().points(), 30);
}
