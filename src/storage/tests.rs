use super::playlist::{LAST_PLAYED_KEY, PLAYLIST_KEY};
use super::*;
use crate::library::Track;
use tempfile::tempdir;

fn t(id: &str, locator: &str) -> Track {
    Track {
        id: id.into(),
        name: format!("Song {id}"),
        locator: locator.into(),
        date_added: None,
    }
}

fn store_with(entries: &[(&str, &str)]) -> PlaylistStore<MemoryStore> {
    let mut mem = MemoryStore::default();
    for (k, v) in entries {
        mem.entries.insert(k.to_string(), v.to_string());
    }
    PlaylistStore::new(mem)
}

#[test]
fn missing_playlist_loads_empty() {
    let mut store = store_with(&[]);
    let loaded = store.load_playlist().unwrap();
    assert!(loaded.tracks.is_empty());
    assert!(!loaded.was_cleaned());
}

#[test]
fn non_array_playlist_is_reset() {
    let mut store = store_with(&[(PLAYLIST_KEY, r#"{"not":"a list"}"#)]);
    let loaded = store.load_playlist().unwrap();
    assert!(loaded.reset);
    assert!(loaded.tracks.is_empty());
    assert_eq!(store.inner().entries[PLAYLIST_KEY], "[]");
}

#[test]
fn unparsable_playlist_is_reset() {
    let mut store = store_with(&[(PLAYLIST_KEY, "{{{")]);
    assert!(store.load_playlist().unwrap().reset);
}

#[test]
fn invalid_entries_are_dropped_and_written_back() {
    let raw = r#"[
        {"id":"1","name":"A","locator":"file:///a.mp3"},
        {"id":"","name":"B","locator":"file:///b.mp3"},
        42,
        {"id":"3","name":"C","uri":"file:///c.mp3"}
    ]"#;
    let mut store = store_with(&[(PLAYLIST_KEY, raw)]);

    let loaded = store.load_playlist().unwrap();
    assert_eq!(loaded.removed, 2);
    assert_eq!(
        loaded.tracks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "3"]
    );

    let reloaded = store.load_playlist().unwrap();
    assert_eq!(reloaded.removed, 0);
    assert_eq!(reloaded.tracks.len(), 2);
}

#[test]
fn add_track_appends_and_sets_last_played() {
    let mut store = store_with(&[]);
    assert_eq!(
        store.add_track(&t("1", "file:///a.mp3")).unwrap(),
        AddOutcome::Added { count: 1 }
    );
    assert_eq!(
        store.add_track(&t("2", "file:///b.mp3")).unwrap(),
        AddOutcome::Added { count: 2 }
    );

    let tracks = store.load_playlist().unwrap().tracks;
    assert_eq!(tracks[0].id, "1");
    assert_eq!(tracks[1].id, "2");
    assert_eq!(store.last_played().unwrap().unwrap().id, "2");
    assert_eq!(store.playlist_count().unwrap(), 2);
}

#[test]
fn add_track_rejects_duplicate_locator_even_with_new_id() {
    let mut store = store_with(&[]);
    store.add_track(&t("1", "file:///a.mp3")).unwrap();
    assert_eq!(
        store.add_track(&t("99", "file:///a.mp3")).unwrap(),
        AddOutcome::Duplicate
    );
    assert_eq!(store.playlist_count().unwrap(), 1);
    assert_eq!(store.last_played().unwrap().unwrap().id, "1");
}

#[test]
fn removing_last_played_repoints_to_first_remaining() {
    let mut store = store_with(&[]);
    store.add_track(&t("1", "file:///a.mp3")).unwrap();
    store.add_track(&t("2", "file:///b.mp3")).unwrap();
    store.add_track(&t("3", "file:///c.mp3")).unwrap();

    let remaining = store.remove_track("3").unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(store.last_played().unwrap().unwrap().id, "1");
}

#[test]
fn removing_other_track_keeps_last_played() {
    let mut store = store_with(&[]);
    store.add_track(&t("1", "file:///a.mp3")).unwrap();
    store.add_track(&t("2", "file:///b.mp3")).unwrap();

    store.remove_track("1").unwrap();
    assert_eq!(store.last_played().unwrap().unwrap().id, "2");
}

#[test]
fn removing_only_track_clears_last_played() {
    let mut store = store_with(&[]);
    store.add_track(&t("1", "file:///a.mp3")).unwrap();

    assert!(store.remove_track("1").unwrap().is_empty());
    assert!(store.last_played().unwrap().is_none());
    assert!(!store.inner().entries.contains_key(LAST_PLAYED_KEY));
}

#[test]
fn clear_empties_playlist_and_forgets_last_played() {
    let mut store = store_with(&[]);
    store.add_track(&t("1", "file:///a.mp3")).unwrap();

    store.clear().unwrap();
    assert_eq!(store.playlist_count().unwrap(), 0);
    assert!(store.last_played().unwrap().is_none());
}

#[test]
fn invalid_last_played_is_removed() {
    let mut store = store_with(&[(LAST_PLAYED_KEY, r#"{"id":"1","name":""}"#)]);
    assert!(store.last_played().unwrap().is_none());
    assert!(!store.inner().entries.contains_key(LAST_PLAYED_KEY));
}

#[test]
fn json_file_store_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.json");

    let mut kv = JsonFileStore::open(&path).unwrap();
    assert_eq!(kv.get("k").unwrap(), None);
    kv.set("k", "v").unwrap();
    kv.set("gone", "x").unwrap();
    kv.remove("gone").unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.get("k").unwrap(), Some("v".to_string()));
    assert_eq!(reopened.get("gone").unwrap(), None);
    assert_eq!(reopened.path(), path.as_path());
}

#[test]
fn json_file_store_treats_corrupt_file_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "not json at all").unwrap();

    let mut kv = JsonFileStore::open(&path).unwrap();
    assert_eq!(kv.get("playlist").unwrap(), None);

    kv.set("playlist", "[]").unwrap();
    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.get("playlist").unwrap(), Some("[]".to_string()));
}

#[test]
fn playlist_store_over_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("storage.json");

    {
        let mut store = PlaylistStore::new(JsonFileStore::open(&path).unwrap());
        store.add_track(&t("1", "file:///a.mp3")).unwrap();
    }

    let mut store = PlaylistStore::new(JsonFileStore::open(&path).unwrap());
    assert_eq!(store.playlist_count().unwrap(), 1);
    assert_eq!(store.last_played().unwrap().unwrap().id, "1");
}

#[test]
fn failed_write_leaves_store_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("storage.json");

    let mut store = PlaylistStore::new(JsonFileStore::open(&path).unwrap());
    // A plain file where the data directory should be makes every write fail.
    std::fs::write(dir.path().join("data"), "in the way").unwrap();

    assert!(store.add_track(&t("1", "file:///a.mp3")).is_err());
    assert!(store.load_playlist().unwrap().tracks.is_empty());
    assert_eq!(store.last_played().unwrap(), None);
    assert_eq!(store.inner().get(PLAYLIST_KEY).unwrap(), None);
}

#[test]
fn failed_remove_keeps_the_entry() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let path = data.join("storage.json");

    let mut kv = JsonFileStore::open(&path).unwrap();
    kv.set("lastPlayed", "{}").unwrap();
    std::fs::remove_dir_all(&data).unwrap();
    std::fs::write(&data, "in the way").unwrap();

    assert!(kv.remove("lastPlayed").is_err());
    assert_eq!(kv.get("lastPlayed").unwrap(), Some("{}".to_string()));
}
