use super::*;
use std::fs;
use tempfile::tempdir;

fn t(artist: &str, album: &str, title: &str, n: u32) -> Track {
    Track {
        artist: artist.into(),
        album: album.into(),
        title: title.into(),
        track_number: n,
        duration: 100.0,
        ..Track::untagged(format!("/music/{title}.flac"), ContainerFormat::Flac)
    }
}

#[test]
fn track_id_is_sha256_of_artist_then_title() {
    // sha256("ab")
    assert_eq!(
        TrackId::from_tags("a", "b").as_str(),
        "fb8e20fc2e4c3f248c60c39bd652f3c1347298bb977b8b4d5903b85055620603"
    );
    let moved = Track {
        path: "/elsewhere/x.flac".into(),
        ..t("a", "Album", "b", 1)
    };
    assert_eq!(moved.id(), t("a", "Album", "b", 1).id());
}

#[test]
fn cache_round_trips_and_reads_nulls_as_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("songcache.json");
    let tracks = vec![t("A", "X", "One", 1), t("B", "Y", "Two", 2)];
    save_cache(&path, &tracks).unwrap();
    assert_eq!(load_cache(&path).unwrap(), tracks);

    let raw = r#"[{"id":"00","info":{"path":"/m/a.mp3","type":"mp3","duration":12.5,
        "artist":null,"album_artist":null,"album":"Al","title":null,"genre":null,"track":null}}]"#;
    fs::write(&path, raw).unwrap();
    let loaded = load_cache(&path).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].format, ContainerFormat::Mp3);
    assert_eq!(loaded[0].artist, "");
    assert_eq!(loaded[0].title, "");
    assert_eq!(loaded[0].track_number, 0);
    assert_eq!(loaded[0].genre, None);
}

#[test]
fn malformed_cache_is_reported_with_its_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("songcache.json");
    fs::write(&path, "{not json").unwrap();
    let err = load_cache(&path).unwrap_err();
    assert!(matches!(err, LibraryError::Json { .. }));
    assert!(err.to_string().contains("songcache.json"));
}

#[test]
fn load_or_refresh_reports_empty_sources() {
    let dir = tempdir().unwrap();
    let settings = crate::config::LibrarySettings {
        sources: vec![dir.path().join("missing")],
        cache_path: dir.path().join("songcache.json"),
        ..crate::config::LibrarySettings::default()
    };
    assert!(matches!(
        load_or_refresh(&settings, &[], false),
        Err(LibraryError::Empty)
    ));
    assert!(!settings.cache_path.exists());
}

#[test]
fn load_or_refresh_scans_extra_sources_and_writes_cache() {
    let dir = tempdir().unwrap();
    let music = dir.path().join("music");
    fs::create_dir_all(&music).unwrap();
    fs::write(music.join("song.mp3"), b"not real").unwrap();

    let settings = crate::config::LibrarySettings {
        sources: vec![],
        cache_path: dir.path().join("songcache.json"),
        ..crate::config::LibrarySettings::default()
    };
    let tracks = load_or_refresh(&settings, &[music], true).unwrap();
    assert_eq!(tracks.len(), 1);
    assert!(settings.cache_path.exists());

    let again = load_or_refresh(&settings, &[], false).unwrap();
    assert_eq!(again, tracks);
}

#[test]
fn album_tracks_are_ordered_by_track_number() {
    let lib = vec![
        t("A", "X", "Three", 3),
        t("A", "Y", "Other", 1),
        t("A", "X", "One", 1),
        t("A", "X", "Two", 2),
    ];
    let titles: Vec<String> = album_tracks(&lib, "X").into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
}

#[test]
fn albums_are_unique_in_library_order() {
    let lib = vec![t("A", "X", "1", 1), t("A", "X", "2", 2), t("B", "Y", "3", 1)];
    assert_eq!(
        albums(&lib),
        vec![("A".to_string(), "X".to_string()), ("B".to_string(), "Y".to_string())]
    );
}

#[test]
fn favorites_toggle_and_persist() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    let id = TrackId::from_tags("Artist", "Song");

    let mut favs = Favorites::open(&path).unwrap();
    assert!(path.exists());
    assert!(!favs.is_favorite(&id));
    assert!(favs.toggle(&id).unwrap());
    assert!(!favs.add(&id).unwrap());

    let reopened = Favorites::open(&path).unwrap();
    assert!(reopened.is_favorite(&id));

    let mut favs = reopened;
    assert!(!favs.toggle(&id).unwrap());
    assert!(!favs.remove(&id).unwrap());
    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(raw, r#"{"favorites":[]}"#);
}
