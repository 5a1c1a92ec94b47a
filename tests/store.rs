use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use envior::{
    CACHE_NAME, CACHE_TYPE, EnvironmentStore, Error, ReferenceMode, StoreSettings, Value, dump,
    parse_str_with_mode,
};

#[test]
fn open_parses_typed_groups() {
    let dir = make_temp_dir("open-typed");
    write_file(
        &dir.join(".env"),
        "APP_MODE=production\nAPP_DEBUG=false\nDB_PORT=5432\nDB_TIMEOUT=2.5\nDB_PASSWORD=null\n",
    );

    let store = EnvironmentStore::open(StoreSettings::new(&dir)).expect("open should succeed");

    assert_eq!(
        store.get("app.mode"),
        Some(Value::Str("production".to_owned()))
    );
    assert_eq!(store.get("app.debug"), Some(Value::Bool(false)));
    assert_eq!(store.get("db.port"), Some(Value::Int(5432)));
    assert_eq!(store.get("db.timeout"), Some(Value::Float(2.5)));
    assert_eq!(store.get("db.password"), Some(Value::Null));
}

#[test]
fn open_missing_file_is_a_path_error() {
    let dir = make_temp_dir("open-missing");
    let err = EnvironmentStore::open(StoreSettings::new(&dir)).expect_err("expected path error");
    match err {
        Error::Path { path } => assert_eq!(path, dir.join(".env")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn get_is_case_insensitive_and_supports_defaults() {
    let dir = make_temp_dir("get-case");
    write_file(&dir.join(".env"), "APP_MODE=production\n");

    let store = EnvironmentStore::open(StoreSettings::new(&dir)).expect("open should succeed");

    assert_eq!(store.get("app.mode"), store.get("APP.MODE"));
    assert_eq!(store.get("App.Mode"), Some(Value::Str("production".to_owned())));
    assert_eq!(store.get("db.host"), None);
    assert_eq!(
        store.get_or("db.host", Value::Str("localhost".to_owned())),
        Value::Str("localhost".to_owned())
    );
}

#[test]
fn all_injects_the_default_app_mode() {
    let dir = make_temp_dir("default-mode");
    write_file(&dir.join(".env"), "DB_HOST=localhost\n");

    let store = EnvironmentStore::open(StoreSettings::new(&dir).default_app_mode("staging"))
        .expect("open should succeed");

    assert_eq!(
        store.all().get("APP", "MODE"),
        Some(&Value::Str("staging".to_owned()))
    );
    assert_eq!(store.get("app.mode"), Some(Value::Str("staging".to_owned())));
    // The fallback is not a declaration.
    assert!(!store.exist("app", "mode"));
    assert!(store.exist("DB", "HOST"));
}

#[test]
fn mode_prefix_helpers_follow_app_mode() {
    let dir = make_temp_dir("mode-helpers");
    write_file(&dir.join(".env"), "APP_MODE=production\n");
    let store = EnvironmentStore::open(StoreSettings::new(&dir)).expect("open should succeed");
    assert!(store.is_prod());
    assert!(!store.is_dev());

    let dir = make_temp_dir("mode-helpers-default");
    write_file(&dir.join(".env"), "");
    let store = EnvironmentStore::open(StoreSettings::new(&dir)).expect("open should succeed");
    assert!(store.is_dev());
    assert!(!store.is_prod());
}

#[test]
fn interpolation_resolves_through_the_store() {
    let dir = make_temp_dir("interpolation");
    write_file(
        &dir.join(".env"),
        "APP_HOST=localhost\nAPP_PORT=8080\n\nDB_URL=postgres://${APP_HOST}:${APP_PORT}/main\nDB_PORT=${APP_PORT}\n",
    );

    let store = EnvironmentStore::open(StoreSettings::new(&dir)).expect("open should succeed");

    assert_eq!(
        store.get("db.url"),
        Some(Value::Str("postgres://localhost:8080/main".to_owned()))
    );
    assert_eq!(store.get("db.port"), Some(Value::Int(8080)));
}

#[test]
fn broken_references_fail_the_open() {
    let dir = make_temp_dir("broken-reference");
    write_file(&dir.join(".env"), "DB_HOST=${APP_UNKNOWN}\n");
    let err = EnvironmentStore::open(StoreSettings::new(&dir)).expect_err("expected open failure");
    match err {
        Error::VariableNotFound { identifier } => assert_eq!(identifier, "APP_UNKNOWN"),
        other => panic!("unexpected error: {other:?}"),
    }

    let dir = make_temp_dir("cyclic-reference");
    write_file(&dir.join(".env"), "A_X=${B_Y}\nB_Y=${A_X}\n");
    let err = EnvironmentStore::open(StoreSettings::new(&dir)).expect_err("expected open failure");
    assert!(matches!(err, Error::CyclicReference { .. }));
}

#[test]
fn parse_and_dump_round_trip() {
    let text = "APP_MODE=dev\nAPP_RETRIES=3\n\nDB_URL=${APP_MODE}-db\nDB_TIMEOUT=1.5\n";
    let map = parse_str_with_mode(text, ReferenceMode::Preserve).expect("parse should succeed");

    let dumped = dump(&map, 1);
    let reparsed =
        parse_str_with_mode(&dumped, ReferenceMode::Preserve).expect("dump output should parse");

    assert_eq!(reparsed, map);
}

#[test]
fn remove_rewrites_the_file_and_preserves_references() {
    let dir = make_temp_dir("remove");
    write_file(
        &dir.join(".env"),
        "APP_HOST=localhost\nAPP_OBSOLETE=drop-me\n\nDB_URL=${APP_HOST}/main\n",
    );

    let mut store =
        EnvironmentStore::open(StoreSettings::new(&dir)).expect("open should succeed");
    assert!(
        store
            .remove("app", "obsolete", false)
            .expect("remove should succeed")
    );

    let rewritten = read_file(&dir.join(".env"));
    assert!(!rewritten.contains("APP_OBSOLETE"));
    assert!(rewritten.contains("DB_URL=${APP_HOST}/main"));

    // The in-memory view follows the rewrite.
    assert_eq!(store.get("app.obsolete"), None);
    assert_eq!(
        store.get("db.url"),
        Some(Value::Str("localhost/main".to_owned()))
    );

    assert!(
        !store
            .remove("app", "obsolete", false)
            .expect("second remove should succeed")
    );
}

#[test]
fn change_applies_a_pure_mutator() {
    let dir = make_temp_dir("change");
    write_file(&dir.join(".env"), "APP_MODE=dev\n");

    let mut store =
        EnvironmentStore::open(StoreSettings::new(&dir)).expect("open should succeed");
    store
        .change(
            |mut map| {
                map.insert("MAIL", "FROM", Value::Str("ops@example.com".to_owned()));
                map
            },
            false,
        )
        .expect("change should succeed");

    let rewritten = read_file(&dir.join(".env"));
    assert!(rewritten.contains("MAIL_FROM=ops@example.com"));
    assert_eq!(
        store.get("mail.from"),
        Some(Value::Str("ops@example.com".to_owned()))
    );
}

#[test]
fn populated_cache_is_preferred_over_the_file() {
    let dir = make_temp_dir("cache-preferred");
    let settings = StoreSettings::new(&dir).cache_dir(dir.join("cache"));
    write_file(&dir.join(".env"), "APP_MODE=cached\n");

    let store = EnvironmentStore::open(settings.clone()).expect("open should succeed");
    store.update_cache().expect("cache update should succeed");
    assert!(dir.join("cache").join(CACHE_TYPE).join(format!("{CACHE_NAME}.json")).is_file());

    // The file moves on; a fresh store still serves the cached map.
    write_file(&dir.join(".env"), "APP_MODE=fresh\n");
    let cached_store = EnvironmentStore::open(settings.clone()).expect("open should succeed");
    assert_eq!(
        cached_store.get("app.mode"),
        Some(Value::Str("cached".to_owned()))
    );

    // Dropping the entry goes back to parsing the file.
    assert!(cached_store.delete_cache().expect("delete should succeed"));
    let fresh_store = EnvironmentStore::open(settings).expect("open should succeed");
    assert_eq!(
        fresh_store.get("app.mode"),
        Some(Value::Str("fresh".to_owned()))
    );
}

#[test]
fn delete_cache_reports_a_missing_entry() {
    let dir = make_temp_dir("cache-delete-missing");
    write_file(&dir.join(".env"), "APP_MODE=dev\n");

    let store = EnvironmentStore::open(StoreSettings::new(&dir).cache_dir(dir.join("cache")))
        .expect("open should succeed");
    assert!(!store.delete_cache().expect("delete should succeed"));

    // Without a cache layer configured there is never anything to delete.
    let uncached =
        EnvironmentStore::open(StoreSettings::new(&dir)).expect("open should succeed");
    assert!(!uncached.delete_cache().expect("delete should succeed"));
}

#[test]
fn remove_writes_through_to_the_cache_only_on_request() {
    let dir = make_temp_dir("cache-write-through");
    let settings = StoreSettings::new(&dir).cache_dir(dir.join("cache"));
    write_file(&dir.join(".env"), "APP_MODE=dev\nAPP_OLD=x\nAPP_STALE=y\n");

    let mut store = EnvironmentStore::open(settings.clone()).expect("open should succeed");
    store.update_cache().expect("cache update should succeed");

    // Without the flag the cache keeps the stale entry.
    store
        .remove("app", "stale", false)
        .expect("remove should succeed");
    let cached = EnvironmentStore::open(settings.clone()).expect("open should succeed");
    assert_eq!(cached.get("app.stale"), Some(Value::Str("y".to_owned())));

    // With the flag the cache follows the file.
    let mut store = EnvironmentStore::open(settings.clone()).expect("open should succeed");
    store
        .remove("app", "old", true)
        .expect("remove should succeed");
    let cached = EnvironmentStore::open(settings).expect("open should succeed");
    assert_eq!(cached.get("app.old"), None);
}

#[test]
fn create_file_makes_an_empty_environment() {
    let dir = make_temp_dir("create-file");
    let settings = StoreSettings::new(&dir);

    EnvironmentStore::create_file(&settings).expect("create should succeed");
    let store = EnvironmentStore::open(settings.clone()).expect("open should succeed");
    assert!(store.all().contains("APP", "MODE"));
    assert!(!store.exist("app", "mode"));

    // Creating again does not clobber existing content.
    write_file(&dir.join(".env"), "APP_MODE=prod\n");
    EnvironmentStore::create_file(&settings).expect("create should succeed");
    assert_eq!(read_file(&dir.join(".env")), "APP_MODE=prod\n");
}

#[test]
fn blank_lines_contribute_nothing() {
    let dir = make_temp_dir("blank-lines");
    write_file(&dir.join(".env"), "\n\nAPP_MODE=dev\n   \n\nDB_HOST=db\n\n");

    let store = EnvironmentStore::open(StoreSettings::new(&dir)).expect("open should succeed");
    assert_eq!(store.all().len(), 2);
}

#[test]
fn malformed_line_fails_the_open_with_the_offending_line() {
    let dir = make_temp_dir("malformed");
    write_file(&dir.join(".env"), "APP_MODE=dev\nappmode=prod\n");

    let err = EnvironmentStore::open(StoreSettings::new(&dir)).expect_err("expected open failure");
    match err {
        Error::Parsing { line, .. } => assert_eq!(line, "appmode=prod"),
        other => panic!("unexpected error: {other:?}"),
    }
}

fn make_temp_dir(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    path.push(format!("envior-{name}-{}-{nanos}", std::process::id()));
    std::fs::create_dir_all(&path).expect("failed to create temp dir");
    path
}

fn write_file(path: &Path, content: &str) {
    std::fs::write(path, content).expect("failed to write test file");
}

fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path).expect("failed to read test file")
}
