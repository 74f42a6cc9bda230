//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

#![cfg(feature = "http")]


use std::sync::Arc;

use serde_json::{json, Value};
use support::{start_server, test_store};
use tier_list::{CollectionPort, GameMode, InMemoryCollection, PlayerRecord, PlayerStore, Tier};

#[tokio::test]
async fn health_check() {
    let base = start_server(test_store()).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true, "players": 8 }));
}

#[tokio::test]
async fn list_players() {
    let base = start_server(test_store()).await;

    let players: Vec<PlayerRecord> = reqwest::get(format!("{base}/api/players"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(players, tier_list::default_players());
}

#[tokio::test]
async fn create_normalizes_partial_stats() {
    let store = test_store();
    let base = start_server(store.clone()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/players"))
        .json(&json!({
            "name": "Newcomer",
            "overallPoints": 300,
            "stats": { "Sword": { "tier": "LT4", "points": 3 } }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let created: PlayerRecord = resp.json().await.unwrap();
    assert_eq!(created.stat(GameMode::Sword).tier, Tier::LT4);
    assert_eq!(created.stat(GameMode::Smp).tier, Tier::Unrated);
    assert_eq!(store.get_by_id(&created.id).unwrap(), Some(created));
}

#[tokio::test]
async fn create_rejects_invalid_bodies() {
    let base = start_server(test_store()).await;
    let client = reqwest::Client::new();

    let empty_name = client
        .post(format!("{base}/api/players"))
        .json(&json!({ "name": "  ", "overallPoints": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(empty_name.status(), 422);

    let bad_tier = client
        .post(format!("{base}/api/players"))
        .json(&json!({ "name": "X", "stats": { "SMP": { "tier": "S+", "points": 1 } } }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_tier.status(), 400);

    let body: Value = bad_tier.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("bad request"));
}

#[tokio::test]
async fn replace_all_collection() {
    let store = test_store();
    let base = start_server(store.clone()).await;
    let client = reqwest::Client::new();

    let mut players = tier_list::default_players();
    players.truncate(2);

    let resp = client
        .put(format!("{base}/api/players"))
        .json(&players)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true, "count": 2 }));
    assert_eq!(store.list_all().unwrap(), players);
}

#[tokio::test]
async fn get_patch_delete_by_id() {
    let base = start_server(test_store()).await;
    let client = reqwest::Client::new();

    let player: PlayerRecord = client
        .get(format!("{base}/api/players/4"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(player.name, "coldified");

    let patched: PlayerRecord = client
        .patch(format!("{base}/api/players/4"))
        .json(&json!({ "name": "coldified2" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(patched.name, "coldified2");
    assert_eq!(patched.overall_points, player.overall_points);

    let deleted = client
        .delete(format!("{base}/api/players/4"))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    for resp in [
        client.get(format!("{base}/api/players/4")).send().await.unwrap(),
        client.delete(format!("{base}/api/players/4")).send().await.unwrap(),
        client
            .patch(format!("{base}/api/players/4"))
            .json(&json!({}))
            .send()
            .await
            .unwrap(),
    ] {
        assert_eq!(resp.status(), 404);
    }
}

#[tokio::test]
async fn rate_one_mode() {
    let base = start_server(test_store()).await;
    let client = reqwest::Client::new();

    let rated: PlayerRecord = client
        .put(format!("{base}/api/players/8/stats/Crystal"))
        .json(&json!({ "tier": "HT1", "points": 60 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(rated.stat(GameMode::Crystal).tier, Tier::HT1);
    assert_eq!(rated.overall_points, 60);

    let unknown_mode = client
        .put(format!("{base}/api/players/8/stats/Bedwars"))
        .json(&json!({ "tier": "HT1", "points": 60 }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_mode.status(), 400);
}

#[tokio::test]
async fn leaderboard_search_overrides_mode() {
    let base = start_server(test_store()).await;

    let rows: Vec<Value> = reqwest::get(format!("{base}/api/leaderboard?q=MARL&mode=Crystal"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["player"]["name"], "Marlowww");
    assert_eq!(rows[0]["tier"], "N/A");
}

#[tokio::test]
async fn leaderboard_mode_filter_and_limit() {
    let base = start_server(test_store()).await;

    let rows: Vec<Value> = reqwest::get(format!("{base}/api/leaderboard?mode=SMP&limit=2"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["player"]["name"], "ItzRealMe");
    assert_eq!(rows[0]["tier"], "LT2");
    assert_eq!(rows[0]["band"], "low");
    assert_eq!(rows[1]["player"]["name"], "coldified");

    let all: Vec<Value> = reqwest::get(format!("{base}/api/leaderboard"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 8);

    let bad = reqwest::get(format!("{base}/api/leaderboard?mode=ALL")).await.unwrap();
    assert_eq!(bad.status(), 400);
}

#[tokio::test]
async fn top_and_mode_views() {
    let base = start_server(test_store()).await;

    let top: Vec<PlayerRecord> = reqwest::get(format!("{base}/api/leaderboard/top?n=3"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let points: Vec<u32> = top.iter().map(|p| p.overall_points).collect();
    assert_eq!(points, vec![5200, 5100, 4800]);

    let uhc: Vec<PlayerRecord> = reqwest::get(format!("{base}/api/modes/UHC"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = uhc.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Swight", "Marlowww", "Lurrn", "coldified"]);
}

#[tokio::test]
async fn servers_sharing_a_port_see_each_others_writes() {
    let port = InMemoryCollection::new();
    let a = start_server(Arc::new(PlayerStore::open(port.clone()).unwrap())).await;
    let b = start_server(Arc::new(PlayerStore::open(port.clone()).unwrap())).await;
    let client = reqwest::Client::new();

    let from_a: PlayerRecord = client
        .post(format!("{a}/api/players"))
        .json(&json!({ "name": "FromA", "overallPoints": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let seen_by_b = reqwest::get(format!("{b}/api/players/{}", from_a.id)).await.unwrap();
    assert_eq!(seen_by_b.status(), 200);

    let from_b: PlayerRecord = client
        .post(format!("{b}/api/players"))
        .json(&json!({ "name": "FromB", "overallPoints": 2 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(from_a.id, from_b.id);

    let stored: Vec<PlayerRecord> = serde_json::from_slice(&port.load().unwrap().unwrap()).unwrap();
    let names: Vec<&str> = stored.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names.len(), 10);
    assert!(names.contains(&"FromA"));
    assert!(names.contains(&"FromB"));
}
