mod common;

use common::{RecordingStore, doc, test_database};
use group_chat_store::{
    AppError, FindOptions, MessageRepository, Settings, SortDirection, SqliteDocumentStore,
};
use serde_json::json;

async fn seeded_repository() -> MessageRepository<SqliteDocumentStore> {
    let db = test_database().await;
    let repo = MessageRepository::new(SqliteDocumentStore::new(db.pool.clone()), "messages");

    let messages = [
        json!({ "_id": "m1", "groupId": "g1", "author": "ann", "text": "first", "timestamp": 100 }),
        json!({ "_id": "m2", "groupId": "g1", "author": "bob", "text": "second", "timestamp": 200 }),
        json!({ "_id": "m3", "groupId": "g1", "author": "ann", "text": "third", "timestamp": 300 }),
        json!({ "_id": "m4", "groupId": "g2", "author": "cat", "text": "elsewhere", "timestamp": 250 }),
        json!({ "_id": "m5", "groupId": "g1", "author": "dan", "text": "fourth", "timestamp": 400, "pinned": true }),
    ];
    for message in messages {
        repo.create(doc(message)).await.unwrap();
    }
    repo
}

fn ids(messages: &[group_chat_store::Document]) -> Vec<&str> {
    messages
        .iter()
        .map(|m| m["_id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_fetch_all_forwards_arguments_unchanged() {
    let records = vec![doc(json!({ "_id": "x", "text": "hello" }))];
    let store = RecordingStore::returning(Ok(records.clone()));
    let repo = MessageRepository::new(store, "messages");

    let filter = doc(json!({ "groupId": "g9", "seq": { "$gt": 3 } }));
    let projection = doc(json!({ "text": 1 }));
    let options = FindOptions::new().limit(10).offset(20);

    let result = repo
        .fetch_all(&filter, Some(&projection), &options)
        .await
        .unwrap();
    assert_eq!(result, records);

    let calls = repo.store().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].collection, "messages");
    assert_eq!(calls[0].filter, filter);
    assert_eq!(calls[0].projection.as_ref(), Some(&projection));
    assert_eq!(calls[0].options, options);
}

#[tokio::test]
async fn test_fetch_all_propagates_store_error() {
    let store = RecordingStore::returning(Err(AppError::invalid_filter("boom")));
    let repo = MessageRepository::new(store, "messages");

    let err = repo
        .fetch_all(&doc(json!({})), None, &FindOptions::default())
        .await
        .unwrap_err();

    match err {
        AppError::InvalidFilter(msg) => assert_eq!(msg, "boom"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(repo.store().calls().len(), 1);
}

#[tokio::test]
async fn test_fetch_all_with_group_id_defaults_to_newest_first() {
    let repo = seeded_repository().await;

    let messages = repo.fetch_all_with_group_id("g1", None, None).await.unwrap();
    assert_eq!(ids(&messages), ["m5", "m3", "m2", "m1"]);

    let calls_store = RecordingStore::returning(Ok(Vec::new()));
    let recording = MessageRepository::new(calls_store, "messages");
    recording
        .fetch_all_with_group_id("g1", Some(10), Some(0))
        .await
        .unwrap();
    let call = &recording.store().calls()[0];
    assert_eq!(call.filter, doc(json!({ "groupId": "g1" })));
    assert_eq!(call.options.limit, Some(10));
    assert_eq!(call.options.offset, Some(0));
    assert_eq!(call.options.sort, FindOptions::default().sort);
}

#[tokio::test]
async fn test_pagination_with_limit_and_offset() {
    let repo = seeded_repository().await;

    let page = repo.fetch_all_with_group_id("g1", Some(2), Some(1)).await.unwrap();
    assert_eq!(ids(&page), ["m3", "m2"]);

    let tail = repo.fetch_all_with_group_id("g1", None, Some(3)).await.unwrap();
    assert_eq!(ids(&tail), ["m1"]);

    let past_end = repo.fetch_all_with_group_id("g1", Some(5), Some(10)).await.unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn test_sort_ascending_and_secondary_key() {
    let repo = seeded_repository().await;

    let options = FindOptions::new()
        .sort_by("author", SortDirection::Asc)
        .then_by("timestamp", SortDirection::Desc);
    let messages = repo.fetch_all(&doc(json!({})), None, &options).await.unwrap();
    assert_eq!(ids(&messages), ["m3", "m1", "m2", "m4", "m5"]);
}

#[tokio::test]
async fn test_filter_operators() {
    let repo = seeded_repository().await;
    let options = FindOptions::new().sort_by("timestamp", SortDirection::Asc);

    let range = doc(json!({ "timestamp": { "$gte": 200, "$lt": 400 } }));
    let messages = repo.fetch_all(&range, None, &options).await.unwrap();
    assert_eq!(ids(&messages), ["m2", "m4", "m3"]);

    let authors = doc(json!({ "author": { "$in": ["bob", "dan"] } }));
    let messages = repo.fetch_all(&authors, None, &options).await.unwrap();
    assert_eq!(ids(&messages), ["m2", "m5"]);

    let not_ann = doc(json!({ "groupId": "g1", "author": { "$ne": "ann" } }));
    let messages = repo.fetch_all(&not_ann, None, &options).await.unwrap();
    assert_eq!(ids(&messages), ["m2", "m5"]);

    let pinned = doc(json!({ "pinned": true }));
    let messages = repo.fetch_all(&pinned, None, &options).await.unwrap();
    assert_eq!(ids(&messages), ["m5"]);

    let unpinned = doc(json!({ "pinned": { "$exists": false } }));
    let messages = repo.fetch_all(&unpinned, None, &options).await.unwrap();
    assert_eq!(ids(&messages), ["m1", "m2", "m4", "m3"]);
}

#[tokio::test]
async fn test_projection_shapes_results() {
    let repo = seeded_repository().await;
    let filter = doc(json!({ "_id": "m1" }));

    let included = repo
        .fetch_all(&filter, Some(&doc(json!({ "text": 1 }))), &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(included, vec![doc(json!({ "_id": "m1", "text": "first" }))]);

    let excluded = repo
        .fetch_all(
            &filter,
            Some(&doc(json!({ "text": 0, "timestamp": 0, "_id": 0 }))),
            &FindOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(excluded, vec![doc(json!({ "groupId": "g1", "author": "ann" }))]);
}

#[tokio::test]
async fn test_create_assigns_id_and_rejects_duplicates() {
    let repo = seeded_repository().await;

    let created = repo
        .create(doc(json!({ "groupId": "g3", "text": "new", "timestamp": 1 })))
        .await
        .unwrap();
    let id = created["_id"].as_str().unwrap().to_string();
    assert_eq!(uuid::Uuid::parse_str(&id).unwrap().get_version_num(), 4);

    let stored = repo.fetch_all_with_group_id("g3", None, None).await.unwrap();
    assert_eq!(stored, vec![created]);

    let duplicate = repo
        .create(doc(json!({ "_id": "m1", "groupId": "g1" })))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, AppError::Database(_)));

    let bad_id = repo.create(doc(json!({ "_id": 7 }))).await.unwrap_err();
    assert_eq!(bad_id.code(), "invalid_document");
}

#[tokio::test]
async fn test_invalid_queries_are_rejected() {
    let repo = seeded_repository().await;

    let err = repo
        .fetch_all(&doc(json!({})), None, &FindOptions::new().limit(-1))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_options");

    let err = repo
        .fetch_all(&doc(json!({ "text": { "$regex": "f.*" } })), None, &FindOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_filter");

    let err = repo
        .fetch_all(
            &doc(json!({})),
            Some(&doc(json!({ "text": 1, "author": 0 }))),
            &FindOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_projection");
}

#[tokio::test]
async fn test_collections_are_isolated() {
    let repo = seeded_repository().await;
    let other = MessageRepository::new(repo.store().clone(), "archived_messages");

    assert!(other.fetch_all_with_group_id("g1", None, None).await.unwrap().is_empty());
    other
        .create(doc(json!({ "_id": "m1", "groupId": "g1", "timestamp": 1 })))
        .await
        .unwrap();
    assert_eq!(repo.fetch_all_with_group_id("g1", None, None).await.unwrap().len(), 4);
    assert_eq!(other.collection(), "archived_messages");
}

#[tokio::test]
async fn test_repository_from_settings_uses_configured_collection() {
    let db = test_database().await;
    let settings = Settings {
        messages_collection: "group_messages".into(),
        ..Settings::default()
    };
    let repo = MessageRepository::from_settings(SqliteDocumentStore::new(db.pool.clone()), &settings);
    assert_eq!(repo.collection(), "group_messages");

    repo.create(doc(json!({ "_id": "m1", "groupId": "g1", "timestamp": 1 })))
        .await
        .unwrap();
    let default_collection = MessageRepository::new(repo.store().clone(), "messages");
    assert!(default_collection
        .fetch_all_with_group_id("g1", None, None)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(repo.fetch_all_with_group_id("g1", None, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_filters_do_not_match_across_json_types() {
    let db = test_database().await;
    let repo = MessageRepository::new(SqliteDocumentStore::new(db.pool.clone()), "messages");
    let flags = [
        json!({ "_id": "b", "pinned": true, "timestamp": 1 }),
        json!({ "_id": "n", "pinned": 1, "timestamp": 2 }),
        json!({ "_id": "s", "pinned": "1", "timestamp": 3 }),
        json!({ "_id": "f", "pinned": false, "timestamp": 4 }),
        json!({ "_id": "x", "timestamp": 5 }),
    ];
    for flag in flags {
        repo.create(doc(flag)).await.unwrap();
    }
    let options = FindOptions::new().sort_by("timestamp", SortDirection::Asc);

    let cases = [
        (json!({ "pinned": true }), vec!["b"]),
        (json!({ "pinned": 1 }), vec!["n"]),
        (json!({ "pinned": "1" }), vec!["s"]),
        (json!({ "pinned": false }), vec!["f"]),
        (json!({ "pinned": { "$lt": "0" } }), vec![]),
        (json!({ "pinned": { "$gt": 0 } }), vec!["n"]),
        (json!({ "pinned": { "$gte": false } }), vec!["b", "f"]),
        (json!({ "pinned": { "$ne": 1 } }), vec!["b", "s", "f", "x"]),
        (json!({ "pinned": { "$in": [true, "1"] } }), vec!["b", "s"]),
        (json!({ "pinned": { "$in": [1, null] } }), vec!["n", "x"]),
    ];
    for (filter, expected) in cases {
        let messages = repo.fetch_all(&doc(filter.clone()), None, &options).await.unwrap();
        assert_eq!(ids(&messages), expected, "filter {filter}");
    }
}
