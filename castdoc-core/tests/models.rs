use castdoc_core::models::{ApiStats, Episode, HitKind, Podcast, SearchHit, SearchResult};
use castdoc_core::{embed_one, marshal_many, marshal_one};
use chrono::DateTime;
use serde_json::json;

fn episode(uid: &str, title: &str, published: i64) -> Episode {
    Episode {
        uid: uid.to_string(),
        podcast_uid: "p1".to_string(),
        title: title.to_string(),
        link: format!("https://example.com/{uid}"),
        published: DateTime::from_timestamp(published, 0).unwrap(),
        ..Default::default()
    }
}

fn podcast() -> Podcast {
    let latest = episode("e2", "Second", 1_700_000_100);
    Podcast {
        uid: "p1".to_string(),
        title: "Example Cast".to_string(),
        description: "A show".to_string(),
        feed: "https://example.com/feed.xml".to_string(),
        owner_name: "Ann".to_string(),
        published: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
        latest_episode: Some(Box::new(latest.clone())),
        episodes: vec![latest, episode("e1", "First", 1_700_000_000)],
        ..Default::default()
    }
}

#[test]
fn test_podcast_document_sideloads_episodes_once() {
    let payload = marshal_one(&podcast()).expect("Podcast should marshal");
    let encoded = serde_json::to_value(&payload).unwrap();

    assert_eq!(
        encoded["data"]["attributes"],
        json!({
            "title": "Example Cast",
            "description": "A show",
            "feed": "https://example.com/feed.xml",
            "owner_name": "Ann",
            "published": 1_600_000_000
        })
    );
    assert_eq!(
        encoded["data"]["relationships"],
        json!({
            "latest_episode": { "data": { "type": "episode", "id": "e2" } },
            "episodes": { "data": [
                { "type": "episode", "id": "e2" },
                { "type": "episode", "id": "e1" }
            ] }
        })
    );

    let included: Vec<_> = payload.included.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(included, vec!["e2", "e1"]);
    assert_eq!(
        payload.included[0].attributes["puid"],
        json!("p1"),
        "episode keeps its podcast uid attribute"
    );
    assert!(!payload.included[0].attributes.contains_key("author"));
}

#[test]
fn test_podcast_without_episodes_has_no_relationships() {
    let bare = Podcast {
        uid: "p2".to_string(),
        title: "Bare".to_string(),
        ..Default::default()
    };

    let encoded = serde_json::to_value(marshal_one(&bare).unwrap()).unwrap();
    assert!(encoded["data"].get("relationships").is_none());
    // Zero publication time is never emitted.
    assert!(encoded["data"]["attributes"].get("published").is_none());
    assert!(encoded["data"]["attributes"].get("updated").is_none());
}

#[test]
fn test_episode_published_at_unix_epoch_is_emitted() {
    let payload = marshal_one(&episode("e0", "Pilot", 0)).unwrap();
    assert_eq!(payload.data.attributes.get("published"), Some(&json!(0)));
}

#[test]
fn test_embedded_podcast_nests_episode_bodies() {
    let payload = embed_one(&podcast()).unwrap();
    let encoded = serde_json::to_value(&payload).unwrap();

    assert_eq!(
        encoded["data"]["relationships"]["episodes"]["data"][1]["attributes"]["title"],
        json!("First")
    );
    assert!(encoded.get("included").is_none());
}

#[test]
fn test_search_result_lists_hits_in_rank_order() {
    let search = SearchResult {
        uid: "q-1".to_string(),
        count: 2,
        search_term: "rust async".to_string(),
        results: vec![
            SearchHit {
                uid: "h1".to_string(),
                kind: HitKind::Episode,
                title: "Async in depth".to_string(),
                score: 97,
                published: 1_700_000_000,
                ..Default::default()
            },
            SearchHit {
                uid: "h2".to_string(),
                kind: HitKind::Podcast,
                title: "Rustacean Station".to_string(),
                score: 64,
                ..Default::default()
            },
        ],
    };

    let payload = marshal_one(&search).unwrap();
    let encoded = serde_json::to_value(&payload).unwrap();

    assert_eq!(encoded["data"]["type"], json!("search"));
    assert_eq!(
        encoded["data"]["attributes"],
        json!({ "count": 2, "search_term": "rust async" })
    );
    assert_eq!(
        encoded["data"]["relationships"]["results"]["data"],
        json!([{ "type": "result", "id": "h1" }, { "type": "result", "id": "h2" }])
    );
    assert_eq!(payload.included[0].attributes["kind"], json!("episode"));
    assert_eq!(payload.included[0].attributes["score"], json!(97));
    // Plain integer publication times are stored as-is, zero included.
    assert_eq!(payload.included[1].attributes["published"], json!(0));
}

#[test]
fn test_stats_collection() {
    let stats = vec![
        ApiStats {
            version: "1.2.0".to_string(),
            podcasts: 120,
            episodes: 4_500,
        },
        ApiStats {
            version: "1.1.0".to_string(),
            podcasts: 90,
            episodes: 3_000,
        },
    ];

    let encoded = serde_json::to_value(marshal_many(&stats).unwrap()).unwrap();
    assert_eq!(
        encoded,
        json!({
            "data": [
                { "type": "stats", "id": "1.2.0", "attributes": { "podcasts": 120, "episodes": 4500 } },
                { "type": "stats", "id": "1.1.0", "attributes": { "podcasts": 90, "episodes": 3000 } }
            ]
        })
    );
}
