//! Tests for SyncPrefs
//!
//! These tests verify:
//! - Typed get/set for every supported type
//! - Defaults for missing keys, including after clear_all
//! - Writing None removes the key
//! - Background (set) vs blocking (set_now) persistence

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use prefkv::codec::EncodedValue;
use prefkv::key::Key;
use prefkv::store::{Edit, FileStore, FlatStore};
use prefkv::{pref_enum, pref_key, Config, SyncPrefs};
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortOrder {
    Newest,
    Oldest,
}

pref_enum!(SortOrder { Newest, Oldest });

pref_key!(const COUNT: i32 = "count");
pref_key!(const NAME: String = "name");
pref_key!(const TOTAL_BYTES: i64 = "total_bytes");
pref_key!(const RATIO: f64 = "ratio");
pref_key!(const ONBOARDED: bool = "onboarded");
const CREATED: Key<DateTime<Utc>> = Key::date("created");
const BIRTHDAY: Key<NaiveDate> = Key::local_date("birthday");
const ALARM: Key<NaiveTime> = Key::local_time("alarm");
const LAST_SEEN: Key<NaiveDateTime> = Key::local_date_time("last_seen");
const SORT: Key<SortOrder> = Key::enumeration("sort");

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_prefs() -> (TempDir, Config, SyncPrefs) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .store_name("settings")
        .build();
    let prefs = SyncPrefs::new(Arc::new(FileStore::open(&config).unwrap()));
    (temp_dir, config, prefs)
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_set_get_then_clear() {
    let (_temp, _config, prefs) = setup_prefs();

    prefs.set(&COUNT, 5);
    assert_eq!(prefs.get(&COUNT, 0), 5);

    prefs.clear_all().unwrap();
    assert_eq!(prefs.get(&COUNT, 0), 0);
    assert!(prefs.keys().is_empty());
}

#[test]
fn test_every_type_round_trips() {
    let (_temp, _config, prefs) = setup_prefs();

    let created = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    let birthday = NaiveDate::from_ymd_opt(2023, 11, 25).unwrap();
    let alarm = NaiveTime::from_hms_opt(6, 45, 0).unwrap();
    let last_seen = birthday.and_hms_opt(22, 10, 5).unwrap();

    prefs.set(&NAME, "Ada".to_string());
    prefs.set(&TOTAL_BYTES, 1i64 << 40);
    prefs.set(&RATIO, 0.75);
    prefs.set(&ONBOARDED, true);
    prefs.set(&CREATED, created);
    prefs.set(&BIRTHDAY, birthday);
    prefs.set(&ALARM, alarm);
    prefs.set(&LAST_SEEN, last_seen);
    prefs.set(&SORT, SortOrder::Oldest);

    assert_eq!(prefs.get(&NAME, String::new()), "Ada");
    assert_eq!(prefs.get(&TOTAL_BYTES, 0), 1 << 40);
    assert_eq!(prefs.get(&RATIO, 0.0), 0.75);
    assert!(prefs.get(&ONBOARDED, false));
    assert_eq!(prefs.get_opt(&CREATED), Some(created));
    assert_eq!(prefs.get_opt(&BIRTHDAY), Some(birthday));
    assert_eq!(prefs.get_opt(&ALARM), Some(alarm));
    assert_eq!(prefs.get_opt(&LAST_SEEN), Some(last_seen));
    assert_eq!(prefs.get(&SORT, SortOrder::Newest), SortOrder::Oldest);
}

#[test]
fn test_missing_keys_give_defaults() {
    let (_temp, _config, prefs) = setup_prefs();

    assert_eq!(prefs.get(&NAME, "guest".to_string()), "guest");
    assert_eq!(prefs.get_opt(&BIRTHDAY), None);
    assert_eq!(prefs.get(&SORT, SortOrder::Newest), SortOrder::Newest);
    assert!(!prefs.contains("name"));
}

#[test]
fn test_empty_string_is_stored() {
    let (_temp, _config, prefs) = setup_prefs();

    prefs.set(&NAME, String::new());

    assert!(prefs.contains("name"));
    assert_eq!(prefs.get(&NAME, "guest".to_string()), "");
}

#[test]
fn test_none_removes_key() {
    let (_temp, _config, prefs) = setup_prefs();

    prefs.set(&BIRTHDAY, NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());
    assert!(prefs.contains("birthday"));

    prefs.set(&BIRTHDAY, None);
    assert!(!prefs.contains("birthday"));
    assert_eq!(prefs.get_opt(&BIRTHDAY), None);

    prefs.set_now(&SORT, SortOrder::Oldest).unwrap();
    prefs.set_now(&SORT, None).unwrap();
    assert!(!prefs.contains("sort"));
}

#[test]
fn test_remove() {
    let (_temp, _config, prefs) = setup_prefs();

    prefs.set(&COUNT, 3);
    prefs.remove(&COUNT);

    assert_eq!(prefs.get(&COUNT, -1), -1);
}

#[test]
fn test_overwrite_replaces_value() {
    let (_temp, _config, prefs) = setup_prefs();

    prefs.set(&NAME, "first".to_string());
    prefs.set(&NAME, "second".to_string());

    assert_eq!(prefs.get(&NAME, String::new()), "second");
}

// =============================================================================
// Legacy / Foreign Data Tests
// =============================================================================

#[test]
fn test_sentinels_read_as_default() {
    let (_temp, _config, prefs) = setup_prefs();

    prefs.store().apply(
        Edit::new()
            .put("birthday", EncodedValue::Long(-1))
            .put("sort", EncodedValue::Str(String::new())),
    );

    let fallback = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    assert_eq!(prefs.get(&BIRTHDAY, fallback), fallback);
    assert_eq!(prefs.get(&SORT, SortOrder::Newest), SortOrder::Newest);
    // The keys exist even though they read as absent
    assert!(prefs.contains("birthday"));
}

#[test]
fn test_unknown_enum_name_gives_default() {
    let (_temp, _config, prefs) = setup_prefs();

    prefs
        .store()
        .apply(Edit::new().put("sort", EncodedValue::Str("Alphabetical".into())));

    assert_eq!(prefs.get(&SORT, SortOrder::Newest), SortOrder::Newest);
    assert_eq!(prefs.get_opt(&SORT), None);
}

#[test]
fn test_wrong_type_gives_default() {
    let (_temp, _config, prefs) = setup_prefs();

    prefs.set(&NAME, "not a number".to_string());
    let as_count: Key<i32> = Key::int("name");

    assert_eq!(prefs.get(&as_count, 42), 42);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_set_now_persists_across_reopen() {
    let (_temp, config, prefs) = setup_prefs();

    prefs.set_now(&NAME, "Grace".to_string()).unwrap();
    drop(prefs);

    let reopened = SyncPrefs::new(Arc::new(FileStore::open(&config).unwrap()));
    assert_eq!(reopened.get(&NAME, String::new()), "Grace");
}

#[test]
fn test_background_set_persists_after_flush() {
    let (_temp, config, prefs) = setup_prefs();

    prefs.set(&COUNT, 12);
    prefs.store().flush().unwrap();
    drop(prefs);

    let reopened = SyncPrefs::new(Arc::new(FileStore::open(&config).unwrap()));
    assert_eq!(reopened.get(&COUNT, 0), 12);
}

#[test]
fn test_clear_all_is_durable() {
    let (_temp, config, prefs) = setup_prefs();

    prefs.set_now(&COUNT, 1).unwrap();
    prefs.clear_all().unwrap();
    drop(prefs);

    let reopened = SyncPrefs::new(Arc::new(FileStore::open(&config).unwrap()));
    assert_eq!(reopened.get(&COUNT, 0), 0);
    assert!(reopened.store().is_empty());
}
