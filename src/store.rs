use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::error::Error;
use crate::model::{EnvironmentMap, ReferenceMode};
use crate::parser;
use crate::settings::StoreSettings;
use crate::value::Value;

/// Cache namespace for parsed environments.
pub const CACHE_TYPE: &str = "configs";
/// Cache entry name for parsed environments.
pub const CACHE_NAME: &str = "envi";

/// Facade over one environment file: owns the resolved map, an optional
/// cache handle, and the mutation operations that rewrite the file.
///
/// Plain mutable value, not process-wide state; callers needing
/// concurrent mutation must serialize access themselves.
#[derive(Debug)]
pub struct EnvironmentStore {
    settings: StoreSettings,
    map: EnvironmentMap,
    cache: Option<CacheStore>,
}

impl EnvironmentStore {
    /// Open the store. Fails with [`Error::Path`] when the environment
    /// file does not exist. When caching is configured and the entry is
    /// populated, the map is served from cache instead of re-parsing.
    pub fn open(settings: StoreSettings) -> Result<Self, Error> {
        let path = settings.env_path();
        if !path.is_file() {
            return Err(Error::Path { path });
        }

        let cache = settings.cache_root().map(CacheStore::new);
        let cached = match &cache {
            Some(cache_store) => cache_store.get(CACHE_TYPE, CACHE_NAME)?,
            None => None,
        };
        let map = match cached {
            Some(map) => {
                debug!(path = %path.display(), "environment served from cache");
                map
            }
            None => {
                debug!(path = %path.display(), "parsing environment file");
                parse_file(&path)?
            }
        };

        Ok(Self {
            settings,
            map,
            cache,
        })
    }

    /// Create an empty environment file at the configured path if none
    /// exists yet.
    pub fn create_file(settings: &StoreSettings) -> Result<(), Error> {
        let path = settings.env_path();
        if !path.is_file() {
            fs::write(&path, "")?;
            debug!(path = %path.display(), "environment file created");
        }
        Ok(())
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Snapshot of the whole environment. `APP.MODE` falls back to the
    /// configured default when the file does not declare it.
    pub fn all(&self) -> EnvironmentMap {
        let mut map = self.map.clone();
        if !map.contains("APP", "MODE") {
            map.insert(
                "APP",
                "MODE",
                Value::Str(self.settings.app_mode_default().to_owned()),
            );
        }
        map
    }

    /// Look up a dotted `group.name` key, case-insensitively.
    pub fn get(&self, key: &str) -> Option<Value> {
        let upper = key.to_uppercase();
        let (group, name) = upper.split_once('.')?;
        self.all().get(group, name).cloned()
    }

    /// Like [`get`](Self::get), returning `default` when absent.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }

    /// Whether the file declares `group.name` (case-insensitive). The
    /// `APP.MODE` fallback does not count as a declaration.
    pub fn exist(&self, group: &str, name: &str) -> bool {
        self.map
            .contains(&group.to_uppercase(), &name.to_uppercase())
    }

    /// `true` when `APP.MODE` starts with `dev`.
    pub fn is_dev(&self) -> bool {
        self.get("app.mode")
            .is_some_and(|mode| mode.to_string().starts_with("dev"))
    }

    /// `true` when `APP.MODE` starts with `prod`.
    pub fn is_prod(&self) -> bool {
        self.get("app.mode")
            .is_some_and(|mode| mode.to_string().starts_with("prod"))
    }

    /// Remove one declaration from the environment file, rewriting it.
    /// `Ok(false)` when the declaration was absent. The cache is
    /// refreshed only when `update_cache` is set.
    pub fn remove(&mut self, group: &str, name: &str, update_cache: bool) -> Result<bool, Error> {
        let group = group.to_uppercase();
        let name = name.to_uppercase();
        if !self.exist(&group, &name) {
            return Ok(false);
        }

        let mut raw = self.parse_raw()?;
        raw.remove(&group, &name);
        self.rewrite(&raw, update_cache)?;
        Ok(true)
    }

    /// Apply a pure transformation to the environment and rewrite the
    /// file with the result. The mutator sees the raw map, with
    /// `${...}` reference syntax preserved, so rewrites do not bake
    /// resolved values into the file.
    pub fn change(
        &mut self,
        mutator: impl FnOnce(EnvironmentMap) -> EnvironmentMap,
        update_cache: bool,
    ) -> Result<(), Error> {
        let raw = self.parse_raw()?;
        let changed = mutator(raw);
        self.rewrite(&changed, update_cache)
    }

    /// Re-serialize the current environment into the cache entry. A
    /// no-op while caching is disabled.
    pub fn update_cache(&self) -> Result<(), Error> {
        let Some(cache) = &self.cache else {
            return Ok(());
        };
        cache.create(CACHE_TYPE, CACHE_NAME, &self.all())?;
        info!("environment cache updated");
        Ok(())
    }

    /// Remove the cache entry. `Ok(false)` when nothing was cached or
    /// caching is disabled.
    pub fn delete_cache(&self) -> Result<bool, Error> {
        match &self.cache {
            Some(cache) => cache.remove(CACHE_TYPE, CACHE_NAME),
            None => Ok(false),
        }
    }

    /// The file's map with references preserved, as a base for rewrites.
    fn parse_raw(&self) -> Result<EnvironmentMap, Error> {
        let text = fs::read_to_string(self.settings.env_path())?;
        parser::parse_str_with_mode(&text, ReferenceMode::Preserve)
    }

    fn rewrite(&mut self, raw: &EnvironmentMap, update_cache: bool) -> Result<(), Error> {
        let text = dump(raw, 1);
        let path = self.settings.env_path();
        fs::write(&path, &text)?;
        debug!(path = %path.display(), declarations = raw.len(), "environment file rewritten");

        // Keep reads consistent with what was just written.
        self.map = parser::parse_str(&text)?;

        if update_cache {
            self.update_cache()?;
        }
        Ok(())
    }
}

fn parse_file(path: &Path) -> Result<EnvironmentMap, Error> {
    let text = fs::read_to_string(path)?;
    parser::parse_str(&text)
}

/// Serialize a map back to `GROUP_NAME=value` lines, the inverse of
/// parsing in `Preserve` mode. Groups are separated by
/// `blank_lines_after_groups` blank lines; groups and names are
/// uppercased on write. No trailing newline.
pub fn dump(map: &EnvironmentMap, blank_lines_after_groups: usize) -> String {
    let mut out = String::new();
    let mut first = true;

    for group in map.groups() {
        let lines: Vec<String> = map
            .entries(group)
            .map(|(name, value)| {
                format!("{}_{}={value}", group.to_uppercase(), name.to_uppercase())
            })
            .collect();
        if lines.is_empty() {
            continue;
        }
        if !first {
            out.push_str(&"\n".repeat(blank_lines_after_groups + 1));
        }
        out.push_str(&lines.join("\n"));
        first = false;
    }

    out
}
