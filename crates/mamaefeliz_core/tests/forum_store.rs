use mamaefeliz_core::{
    MemoryPersistence, MutationOutcome, PersistenceError, PersistenceProvider, PersistenceResult,
    PostCategory, PostListQuery, PostStore, PostValidationError, Revision, StoreConfig, StoreError,
    StoredValue,
};
use std::cell::Cell;
use std::collections::HashSet;

#[test]
fn first_list_seeds_and_second_list_returns_same_ids() {
    let provider = MemoryPersistence::new();
    let store = PostStore::new(&provider);

    let first = store.list_posts().unwrap();
    let second = store.list_posts().unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    let ids: Vec<&str> = first.iter().map(|post| post.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(first[0].comments.len(), 1);
    assert_eq!(first[0].comments[0].id, "c1");

    let stored = provider.get("mamaefeliz_forum_posts").unwrap().unwrap();
    assert_eq!(stored.revision, 1);
}

#[test]
fn created_posts_have_distinct_ids_and_defaults() {
    let store = PostStore::new(MemoryPersistence::new());

    let mut ids = HashSet::new();
    for index in 0..25 {
        let post = store
            .create_post(
                format!("título {index}"),
                "conteúdo",
                PostCategory::Other,
                "Mamãe Anônima",
            )
            .unwrap();
        assert_eq!(post.likes, 0);
        assert!(post.comments.is_empty());
        assert!(!post.is_reported);
        assert!(ids.insert(post.id));
    }

    let posts = store.list_posts().unwrap();
    assert_eq!(posts.len(), 28);
    assert_eq!(posts[0].title, "título 24");
}

#[test]
fn create_post_rejects_blank_title_or_content() {
    let provider = MemoryPersistence::new();
    let store = PostStore::new(&provider);

    let err = store
        .create_post("   ", "body", PostCategory::Food, "a")
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(PostValidationError::EmptyTitle)
    ));

    let err = store
        .create_post("title", "\n\t", PostCategory::Food, "a")
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(PostValidationError::EmptyContent)
    ));

    assert!(provider.get("mamaefeliz_forum_posts").unwrap().is_none());
}

#[test]
fn likes_grow_by_exactly_one_per_call() {
    let store = PostStore::new(MemoryPersistence::new());
    let initial = store.find_post("3").unwrap().unwrap().likes;

    for _ in 0..7 {
        assert!(store.like_post("3").unwrap().is_updated());
    }

    assert_eq!(store.find_post("3").unwrap().unwrap().likes, initial + 7);
}

#[test]
fn comments_keep_insertion_order() {
    let store = PostStore::new(MemoryPersistence::new());
    let entries = [("Ana", "primeiro"), ("Bia", "segundo"), ("Cris", "terceiro")];

    for (author, text) in entries {
        store.add_comment("2", text, author).unwrap();
    }

    let post = store.find_post("2").unwrap().unwrap();
    let seen: Vec<(&str, &str)> = post
        .comments
        .iter()
        .map(|comment| (comment.author.as_str(), comment.text.as_str()))
        .collect();
    assert_eq!(seen, entries);
    let ids: HashSet<&str> = post.comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn blank_comment_is_rejected() {
    let store = PostStore::new(MemoryPersistence::new());
    let err = store.add_comment("1", "  ", "Ana").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(PostValidationError::EmptyCommentText)
    ));
}

#[test]
fn report_is_terminal_and_hides_post_from_browse() {
    let store = PostStore::new(MemoryPersistence::new());
    store.like_post("1").unwrap();

    let after_first = store.report_post("1").unwrap().into_posts();
    let after_second = store.report_post("1").unwrap().into_posts();
    assert_eq!(after_first, after_second);

    let reported = store.find_post("1").unwrap().unwrap();
    assert!(reported.is_reported);
    assert_eq!(reported.likes, 13);
    assert_eq!(reported.comments.len(), 1);

    let visible = store.browse(&PostListQuery::default()).unwrap();
    assert!(visible.iter().all(|post| post.id != "1"));
    assert_eq!(store.list_posts().unwrap().len(), 3);
}

#[test]
fn unknown_ids_leave_collection_and_storage_untouched() {
    let provider = MemoryPersistence::new();
    let store = PostStore::new(&provider);
    let before = store.list_posts().unwrap();
    let revision = provider.get("mamaefeliz_forum_posts").unwrap().unwrap().revision;

    let outcomes = [
        store.add_comment("missing", "oi", "Ana").unwrap(),
        store.like_post("missing").unwrap(),
        store.report_post("missing").unwrap(),
    ];

    for outcome in outcomes {
        assert_eq!(outcome, MutationOutcome::NotFound(before.clone()));
    }
    let after = provider.get("mamaefeliz_forum_posts").unwrap().unwrap();
    assert_eq!(after.revision, revision);
}

#[test]
fn end_to_end_create_like_comment_report() {
    let store = PostStore::new(MemoryPersistence::new());

    let category: PostCategory = "saude".parse().unwrap();
    let post = store
        .create_post("Teste", "Conteúdo de teste", category, "Mamãe X")
        .unwrap();
    assert_eq!(post.likes, 0);
    assert!(post.comments.is_empty());
    assert!(!post.is_reported);

    for _ in 0..3 {
        store.like_post(&post.id).unwrap();
    }
    assert_eq!(store.find_post(&post.id).unwrap().unwrap().likes, 3);

    let posts = store
        .add_comment(&post.id, "Apoio!", "Mamãe Y")
        .unwrap()
        .into_posts();
    let updated = posts.iter().find(|item| item.id == post.id).unwrap();
    assert_eq!(updated.comments.len(), 1);
    assert_eq!(updated.comments[0].text, "Apoio!");
    assert_eq!(updated.comments[0].author, "Mamãe Y");

    store.report_post(&post.id).unwrap();
    let visible = store.browse(&PostListQuery::default()).unwrap();
    assert!(visible.iter().all(|item| item.id != post.id));
    assert!(store
        .list_posts()
        .unwrap()
        .iter()
        .any(|item| item.id == post.id));
}

#[test]
fn browse_filters_category_newest_first() {
    let store = PostStore::new(MemoryPersistence::new());
    let created = store
        .create_post("Soneca", "Quantas sonecas?", PostCategory::Sleep, "Ana")
        .unwrap();

    let query = PostListQuery {
        category: Some(PostCategory::Sleep),
        ..PostListQuery::default()
    };
    let sleep = store.browse(&query).unwrap();
    let ids: Vec<&str> = sleep.iter().map(|post| post.id.as_str()).collect();
    assert_eq!(ids, vec![created.id.as_str(), "2"]);
}

#[test]
fn persisted_wire_shape_uses_expected_fields() {
    let provider = MemoryPersistence::new();
    let store = PostStore::new(&provider);
    store.report_post("2").unwrap();

    let text = provider.get("mamaefeliz_forum_posts").unwrap().unwrap().text;
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let first = &json[0];
    assert_eq!(first["id"], "1");
    assert_eq!(first["category"], "saude");
    assert_eq!(first["likes"], 12);
    assert_eq!(first["isReported"], false);
    assert!(first["timestamp"].as_str().unwrap().contains('T'));
    assert_eq!(first["comments"][0]["author"], "Mamãe do Pedro");
    assert_eq!(json[1]["isReported"], true);
}

#[test]
fn legacy_state_without_report_flag_and_with_unknown_category_loads() {
    let provider = MemoryPersistence::new();
    let legacy = r#"[{
        "id": "1700000000000",
        "title": "Antigo",
        "content": "Post salvo por uma versão anterior",
        "category": "viagem",
        "author": "Mamãe Anônima",
        "timestamp": "2024-05-01T12:30:00.000Z",
        "likes": 2,
        "comments": [{
            "id": "1700000000001",
            "author": "Ana",
            "text": "oi",
            "timestamp": "2024-05-01T13:00:00.000Z",
            "isExpert": true
        }]
    }, {
        "id": "8",
        "title": "Soneca",
        "content": "Quantas sonecas?",
        "category": "sono",
        "author": "Bia",
        "timestamp": "2024-05-02T08:00:00.000Z",
        "likes": 0,
        "comments": []
    }]"#;
    provider.put("mamaefeliz_forum_posts", legacy, None).unwrap();

    let store = PostStore::new(&provider);
    let posts = store.list_posts().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(
        posts[0].category,
        PostCategory::Unknown("viagem".to_string())
    );
    assert_eq!(posts[0].category.label(), "Outros");
    assert!(!posts[0].is_reported);
    assert!(posts[0].comments[0].is_expert);
    assert_eq!(posts[0].timestamp.to_rfc3339(), "2024-05-01T12:30:00+00:00");

    assert!(store.like_post("8").unwrap().is_updated());

    let text = provider.get("mamaefeliz_forum_posts").unwrap().unwrap().text;
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json[0]["category"], "viagem");
    assert_eq!(json[0]["likes"], 2);
    assert_eq!(json[1]["category"], "sono");
    assert_eq!(json[1]["likes"], 1);
}

#[test]
fn corrupted_state_is_surfaced() {
    let provider = MemoryPersistence::new();
    provider
        .put("mamaefeliz_forum_posts", "{not json", None)
        .unwrap();

    let err = PostStore::new(&provider).list_posts().unwrap_err();
    assert!(matches!(err, StoreError::CorruptedState(_)));
}

#[test]
fn custom_storage_key_is_respected() {
    let provider = MemoryPersistence::new();
    let config = StoreConfig {
        storage_key: "forum_test".to_string(),
        ..StoreConfig::default()
    };
    PostStore::with_config(&provider, config).list_posts().unwrap();

    assert!(provider.get("forum_test").unwrap().is_some());
    assert!(provider.get("mamaefeliz_forum_posts").unwrap().is_none());
}

/// Provider whose every write fails, as when the medium is full.
struct FullDisk;

impl PersistenceProvider for FullDisk {
    fn get(&self, _key: &str) -> PersistenceResult<Option<StoredValue>> {
        Ok(None)
    }

    fn put(
        &self,
        _key: &str,
        _text: &str,
        _expected: Option<Revision>,
    ) -> PersistenceResult<Revision> {
        Err(PersistenceError::Unavailable("quota exceeded".to_string()))
    }
}

#[test]
fn storage_failure_is_returned_not_panicked() {
    let err = PostStore::new(FullDisk).list_posts().unwrap_err();
    assert!(matches!(
        err,
        StoreError::Storage(PersistenceError::Unavailable(_))
    ));
}

/// Wraps a provider and lets a rival writer sneak in before the next write.
struct RacingProvider<'a> {
    inner: &'a MemoryPersistence,
    rival_writes_left: Cell<u32>,
}

impl PersistenceProvider for RacingProvider<'_> {
    fn get(&self, key: &str) -> PersistenceResult<Option<StoredValue>> {
        self.inner.get(key)
    }

    fn put(
        &self,
        key: &str,
        text: &str,
        expected: Option<Revision>,
    ) -> PersistenceResult<Revision> {
        if expected.is_some() && self.rival_writes_left.get() > 0 {
            self.rival_writes_left.set(self.rival_writes_left.get() - 1);
            let rival = PostStore::new(self.inner);
            rival.like_post("2").expect("rival like should succeed");
        }
        self.inner.put(key, text, expected)
    }
}

#[test]
fn concurrent_write_is_not_lost() {
    let shared = MemoryPersistence::new();
    PostStore::new(&shared).list_posts().unwrap();

    let racing = RacingProvider {
        inner: &shared,
        rival_writes_left: Cell::new(1),
    };
    let outcome = PostStore::new(&racing).like_post("3").unwrap();
    assert!(outcome.is_updated());

    let posts = PostStore::new(&shared).list_posts().unwrap();
    let likes: Vec<u64> = posts.iter().map(|post| post.likes).collect();
    assert_eq!(likes, vec![12, 6, 25]);
}

#[test]
fn persistent_contention_gives_up_after_configured_attempts() {
    let shared = MemoryPersistence::new();
    PostStore::new(&shared).list_posts().unwrap();

    let racing = RacingProvider {
        inner: &shared,
        rival_writes_left: Cell::new(u32::MAX),
    };
    let config = StoreConfig {
        max_write_attempts: 2,
        ..StoreConfig::default()
    };
    let err = PostStore::with_config(&racing, config)
        .like_post("3")
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { attempts: 2 }));
}
