use serde_json::json;
use tier_list::{
    default_players, CollectionPort, GameMode, InMemoryCollection, MigrationPolicy, ModeStat,
    NewPlayer, PlayerRecord, PlayerStore, Recovery, SeedReason, Tier,
};

fn port_with(value: serde_json::Value) -> InMemoryCollection {
    let port = InMemoryCollection::new();
    port.put_raw(serde_json::to_vec(&value).unwrap()).unwrap();
    port
}

fn legacy_blob() -> serde_json::Value {
    json!([
        { "id": "1", "name": "OldTimer", "overallPoints": 900,
          "stats": { "SMP": { "tier": "HT2", "points": 30 },
                     "Crystal": { "tier": "LT1", "points": 45 },
                     "Sword": { "tier": "N/A", "points": 0 },
                     "Nethpot": { "tier": "N/A", "points": 0 } } },
        { "id": "2", "name": "Veteran", "overallPoints": 800,
          "stats": { "SMP": { "tier": "LT3", "points": 6 } } }
    ])
}

#[test]
fn discard_policy_falls_back_to_default_dataset() {
    let port = port_with(legacy_blob());

    let store = PlayerStore::open_with(port.clone(), MigrationPolicy::DiscardLegacy).unwrap();

    assert_eq!(store.list_all().unwrap(), default_players());
    assert_eq!(store.list_all().unwrap().len(), 8);
    assert_eq!(
        store.recovery().unwrap(),
        Recovery::Seeded(SeedReason::LegacyShape { missing: GameMode::Uhc })
    );
}

#[test]
fn normalize_policy_keeps_legacy_players() {
    let port = port_with(legacy_blob());

    let store = PlayerStore::open(port).unwrap();
    let players = store.list_all().unwrap();

    assert_eq!(
        store.recovery().unwrap(),
        Recovery::Normalized { repaired: 2, dropped: 0 }
    );
    assert_eq!(players.len(), 2);
    assert_eq!(players[0].name, "OldTimer");
    assert_eq!(players[0].stat(GameMode::Uhc), ModeStat::unrated());
    assert_eq!(players[0].stat(GameMode::Crystal), ModeStat::new(Tier::LT1, 45));
    assert_eq!(players[1].stat(GameMode::Smp), ModeStat::new(Tier::LT3, 6));
    assert_eq!(players[1].stat(GameMode::Sword), ModeStat::unrated());
}

#[test]
fn repaired_collection_is_written_on_next_mutation() {
    let port = port_with(legacy_blob());
    let store = PlayerStore::open(port.clone()).unwrap();

    // Loading alone does not rewrite the stored blob.
    let raw: serde_json::Value = serde_json::from_slice(&port.load().unwrap().unwrap()).unwrap();
    assert!(raw[1]["stats"].get("UHC").is_none());

    let created = store.create(NewPlayer::new("Newcomer", 10)).unwrap();
    assert_eq!(created.id, "3");

    let persisted: Vec<PlayerRecord> =
        serde_json::from_slice(&port.load().unwrap().unwrap()).unwrap();
    assert_eq!(persisted.len(), 3);
    assert_eq!(persisted[1].stat(GameMode::Uhc), ModeStat::unrated());
}

#[test]
fn garbage_blob_falls_back_under_either_policy() {
    for policy in [MigrationPolicy::Normalize, MigrationPolicy::DiscardLegacy] {
        let port = InMemoryCollection::new();
        port.put_raw(&b"{ definitely not json"[..]).unwrap();

        let store = PlayerStore::open_with(port, policy).unwrap();

        assert_eq!(store.list_all().unwrap(), default_players());
        assert!(matches!(
            store.recovery().unwrap(),
            Recovery::Seeded(SeedReason::Malformed(_))
        ));
    }
}

#[test]
fn current_format_loads_clean_under_discard_policy() {
    let port = InMemoryCollection::new();
    port.put_raw(serde_json::to_vec(&default_players()).unwrap()).unwrap();

    let store = PlayerStore::open_with(port, MigrationPolicy::DiscardLegacy).unwrap();
    assert_eq!(store.recovery().unwrap(), Recovery::Clean);
}

#[test]
fn duplicate_ids_on_load_allow_a_full_table_edit() {
    let port = port_with(json!([
        { "id": "5", "name": "A", "overallPoints": 10, "stats": {} },
        { "id": "5", "name": "B", "overallPoints": 20, "stats": {} }
    ]));
    let store = PlayerStore::open(port.clone()).unwrap();

    let players = store.list_all().unwrap();
    let ids: Vec<&str> = players.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["5", "6"]);

    store.replace_all(players.clone()).unwrap();
    assert_eq!(store.get_by_id("6").unwrap().unwrap().name, "B");
    assert_eq!(store.recovery().unwrap(), Recovery::Clean);
    assert!(store.delete("5").unwrap());
    assert_eq!(store.list_all().unwrap().len(), 1);
}

#[test]
fn badly_typed_fields_keep_their_records() {
    let port = port_with(json!([
        { "id": "1", "name": "Marlowww", "overallPoints": 5200.0,
          "stats": { "SMP": { "tier": "HT1", "points": 60 } } },
        { "id": "2", "name": "ItzRealMe", "overallPoints": 5100, "stats": null }
    ]));

    let store = PlayerStore::open(port).unwrap();
    let players = store.list_all().unwrap();

    assert_eq!(
        store.recovery().unwrap(),
        Recovery::Normalized { repaired: 2, dropped: 0 }
    );
    assert_eq!(players[0].overall_points, 5200);
    assert_eq!(players[1].name, "ItzRealMe");
    assert_eq!(players[1].stat(GameMode::Smp), ModeStat::unrated());
}

#[test]
fn unrepaired_blob_keeps_stable_ids_across_reads() {
    let port = port_with(json!([
        { "name": "NoId", "overallPoints": 10, "stats": {} }
    ]));
    let store = PlayerStore::open(port).unwrap();

    let first = store.list_all().unwrap()[0].id.clone();
    assert_eq!(store.list_all().unwrap()[0].id, first);
    assert!(store
        .update(&first, tier_list::PlayerPatch::default().overall_points(11))
        .unwrap()
        .is_some());
    assert_eq!(store.get_by_id(&first).unwrap().unwrap().overall_points, 11);
}
