//! LocalCache typed snapshots over a raw backend.

use std::sync::Arc;

use contest_sync::cache::{CacheBackend, LocalCache, MemoryCache};
use contest_sync::error::CacheError;
use contest_sync::types::{
    Collection, ContestFields, EliteFields, Loser, Record, Winner, WinnerRef,
};
use serde_json::json;

fn fields(name: &str) -> ContestFields {
    ContestFields {
        guide_id: format!("guide-{name}"),
        name: name.to_string(),
        department: "Support".to_string(),
        supervisor: String::new(),
        timestamp: "2024-01-01T00:00:00Z".parse().unwrap(),
        chat_ids: vec!["c1".to_string()],
    }
}

fn local() -> (Arc<MemoryCache>, LocalCache) {
    let backend = Arc::new(MemoryCache::new());
    let cache = LocalCache::new(backend.clone(), "contest");
    (backend, cache)
}

#[test]
fn keys_are_prefixed_collection_names() {
    let (_backend, cache) = local();
    assert_eq!(cache.key(Collection::Winners), "contest:winners");
    assert_eq!(cache.key(Collection::Losers), "contest:losers");
    assert_eq!(cache.key(Collection::EliteEntries), "contest:elite_entries");
}

#[test]
fn never_written_reads_none() {
    let (_backend, cache) = local();
    let read: Option<Vec<Winner>> = cache.read(Collection::Winners).unwrap();
    assert!(read.is_none());
}

#[test]
fn pending_and_persisted_records_survive_a_write() {
    let (backend, cache) = local();
    let winners: Vec<Winner> = vec![
        Record::persisted("w1", fields("A")),
        Record::Pending(fields("B")),
    ];
    cache.write(Collection::Winners, &winners).unwrap();

    let read: Vec<Winner> = cache.read(Collection::Winners).unwrap().unwrap();
    assert_eq!(read, winners);

    // Pending records are stored without an id.
    let raw: serde_json::Value =
        serde_json::from_str(&backend.get("contest:winners").unwrap().unwrap()).unwrap();
    assert_eq!(raw[0]["id"], "w1");
    assert!(raw[1].get("id").is_none());
}

#[test]
fn elite_entries_keep_their_winner_link() {
    let (_backend, cache) = local();
    let entries = vec![Record::persisted(
        "e1",
        EliteFields {
            winner_id: Some(WinnerRef::new("w1")),
            entry: fields("A"),
        },
    )];
    cache.write(Collection::EliteEntries, &entries).unwrap();

    let read: Vec<Record<EliteFields>> = cache.read(Collection::EliteEntries).unwrap().unwrap();
    assert_eq!(read[0].fields().winner_id, Some(WinnerRef::new("w1")));
}

#[test]
fn malformed_snapshot_is_reported() {
    let (backend, cache) = local();
    backend.set("contest:losers", "{not json").unwrap();

    let err = cache.read::<ContestFields>(Collection::Losers).unwrap_err();
    match err {
        CacheError::MalformedSnapshot { namespace, .. } => {
            assert_eq!(namespace, "contest:losers");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn namespaces_do_not_collide() {
    let backend = Arc::new(MemoryCache::new());
    let spring = LocalCache::new(backend.clone(), "spring");
    let autumn = LocalCache::new(backend, "autumn");

    let losers: Vec<Loser> = vec![Record::Pending(fields("A"))];
    spring.write(Collection::Losers, &losers).unwrap();

    let read: Option<Vec<Loser>> = autumn.read(Collection::Losers).unwrap();
    assert!(read.is_none());
}

#[test]
fn chat_ids_and_supervisor_default_when_missing() {
    let (backend, cache) = local();
    backend
        .set(
            "contest:winners",
            &json!([{
                "id": "w1",
                "guide_id": "g",
                "name": "A",
                "department": "D",
                "timestamp": "2024-01-01T00:00:00Z"
            }])
            .to_string(),
        )
        .unwrap();

    let read: Vec<Winner> = cache.read(Collection::Winners).unwrap().unwrap();
    assert!(read[0].fields().chat_ids.is_empty());
    assert!(read[0].fields().supervisor.is_empty());
}
