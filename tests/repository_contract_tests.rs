use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use quizforge_server::{
    errors::AppError,
    models::domain::{
        AnswerLetter, Difficulty, KeyEntities, Question, QuizBundle, RelatedTopic,
    },
    repositories::{MemoryQuizBundleRepository, QuizBundleRepository},
    services::persistence::PersistenceCoordinator,
};

fn make_question(n: usize) -> Question {
    Question {
        id: format!("q-{}", n),
        text: format!("Which river carried cargo number {}?", n),
        options: [
            format!("Rhine {}", n),
            format!("Danube {}", n),
            format!("Elbe {}", n),
            format!("Oder {}", n),
        ],
        correct_answer: AnswerLetter::B,
        difficulty: Difficulty::Medium,
        explanation: "The article names it directly.".to_string(),
        section_reference: None,
    }
}

fn make_bundle(id: &str, url: &str, title: &str, age_minutes: i64) -> QuizBundle {
    let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    QuizBundle {
        id: id.to_string(),
        normalized_url: url.to_string(),
        title: title.to_string(),
        summary: "One sentence. Two sentences.".to_string(),
        sections: vec!["History".to_string()],
        entities: KeyEntities {
            people: vec!["Marco Polo".to_string()],
            ..KeyEntities::default()
        },
        questions: (0..5).map(make_question).collect(),
        related_topics: vec![RelatedTopic::named("Silk Road")],
        warnings: vec![],
        created_at: base - Duration::minutes(age_minutes),
    }
}

#[tokio::test]
async fn persist_then_find_by_normalized_url() {
    let repo = MemoryQuizBundleRepository::new();
    let bundle = make_bundle("b-1", "https://example.com/rivers", "Rivers", 0);

    let stored = repo.persist(bundle.clone()).await.expect("persist should work");
    assert_eq!(stored, bundle);

    let found = repo
        .find_by_normalized_url("https://example.com/rivers")
        .await
        .expect("lookup should work");
    assert_eq!(found, Some(bundle));

    let missing = repo
        .find_by_normalized_url("https://example.com/other")
        .await
        .expect("lookup should work");
    assert!(missing.is_none());
}

#[tokio::test]
async fn second_bundle_for_same_url_is_rejected() {
    let repo = MemoryQuizBundleRepository::new();
    repo.persist(make_bundle("b-1", "https://example.com/rivers", "Rivers", 0))
        .await
        .expect("first persist should work");

    let duplicate = repo
        .persist(make_bundle("b-2", "https://example.com/rivers", "Rivers again", 0))
        .await;

    assert!(matches!(duplicate, Err(AppError::DuplicateUrl(ref url)) if url == "https://example.com/rivers"));
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn list_page_is_newest_first_with_search_and_paging() {
    let repo = MemoryQuizBundleRepository::new();
    repo.persist(make_bundle("old", "https://example.com/a", "Ancient Rome", 30))
        .await
        .expect("persist old");
    repo.persist(make_bundle("mid", "https://example.com/b", "Roman Roads", 20))
        .await
        .expect("persist mid");
    repo.persist(make_bundle("new", "https://example.com/c", "Baltic Trade", 10))
        .await
        .expect("persist new");

    let (all, total) = repo.list_page(1, 10, None).await.expect("list should work");
    assert_eq!(total, 3);
    let ids: Vec<_> = all.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);

    let (second_page, total) = repo.list_page(2, 2, None).await.expect("list should work");
    assert_eq!(total, 3);
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].id, "old");

    let (past_end, total) = repo.list_page(5, 2, None).await.expect("list should work");
    assert_eq!(total, 3);
    assert!(past_end.is_empty());

    let (roman, total) = repo
        .list_page(1, 10, Some("ROM".to_string()))
        .await
        .expect("search should work");
    assert_eq!(total, 2);
    assert_eq!(roman[0].id, "mid");
    assert_eq!(roman[1].id, "old");

    let (blank, total) = repo
        .list_page(1, 10, Some("   ".to_string()))
        .await
        .expect("blank search should list everything");
    assert_eq!(total, 3);
    assert_eq!(blank.len(), 3);
}

#[tokio::test]
async fn list_page_rejects_pages_beyond_addressable_range() {
    let repo = MemoryQuizBundleRepository::new();
    repo.persist(make_bundle("b-1", "https://example.com/rivers", "Rivers", 0))
        .await
        .expect("persist should work");

    let result = repo.list_page(u64::MAX, 100, None).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let (items, total) = repo
        .list_page(1_000_000, 100, None)
        .await
        .expect("large but representable page should work");
    assert!(items.is_empty());
    assert_eq!(total, 1);
}

#[tokio::test]
async fn fetch_and_delete_by_id() {
    let repo = MemoryQuizBundleRepository::new();
    repo.persist(make_bundle("b-1", "https://example.com/rivers", "Rivers", 0))
        .await
        .expect("persist should work");

    let fetched = repo.fetch_by_id("b-1").await.expect("fetch should work");
    assert_eq!(fetched.map(|b| b.questions.len()), Some(5));

    assert!(repo.delete_by_id("b-1").await.expect("delete should work"));
    assert!(!repo.delete_by_id("b-1").await.expect("repeat delete should work"));
    assert!(repo.fetch_by_id("b-1").await.expect("fetch should work").is_none());

    // The URL is free again once its bundle is gone.
    repo.persist(make_bundle("b-2", "https://example.com/rivers", "Rivers", 0))
        .await
        .expect("persist after delete should work");
}

#[tokio::test]
async fn coordinator_assigns_fresh_ids_before_storing() {
    let repo = Arc::new(MemoryQuizBundleRepository::new());
    let coordinator = PersistenceCoordinator::new(repo.clone());

    let mut bundle = make_bundle("", "https://example.com/rivers", "Rivers", 0);
    for question in &mut bundle.questions {
        question.id.clear();
    }

    let stored = coordinator.persist(bundle).await.expect("persist should work");

    assert!(!stored.id.is_empty());
    assert!(stored.questions.iter().all(|q| !q.id.is_empty()));
    assert!(stored.related_topics.iter().all(|t| !t.id.is_empty()));

    let fetched = repo
        .fetch_by_id(&stored.id)
        .await
        .expect("fetch should work")
        .expect("stored bundle should be retrievable");
    assert_eq!(fetched, stored);
}
