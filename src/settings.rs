use std::path::{Path, PathBuf};

/// Default environment file name.
pub const DEFAULT_FILENAME: &str = ".env";
/// Default `APP.MODE` reported when the file does not declare one.
pub const DEFAULT_APP_MODE: &str = "dev";

/// Where the environment file lives and how the store behaves.
///
/// An explicit value the store owns, instead of ambient global
/// configuration: construct once at startup and hand it to
/// [`EnvironmentStore::open`](crate::EnvironmentStore::open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    directory: PathBuf,
    filename: String,
    cache_dir: Option<PathBuf>,
    use_cache: bool,
    default_app_mode: String,
}

impl StoreSettings {
    /// Settings rooted at the directory containing the environment file.
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            filename: DEFAULT_FILENAME.to_owned(),
            cache_dir: None,
            use_cache: false,
            default_app_mode: DEFAULT_APP_MODE.to_owned(),
        }
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Cache root directory; setting one enables caching.
    pub fn cache_dir(mut self, cache_dir: impl AsRef<Path>) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self.use_cache = true;
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn default_app_mode(mut self, mode: impl Into<String>) -> Self {
        self.default_app_mode = mode.into();
        self
    }

    /// Full path to the environment file.
    pub fn env_path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    pub(crate) fn app_mode_default(&self) -> &str {
        &self.default_app_mode
    }

    /// Effective cache root, `None` while caching is disabled.
    pub(crate) fn cache_root(&self) -> Option<PathBuf> {
        if !self.use_cache {
            return None;
        }
        Some(
            self.cache_dir
                .clone()
                .unwrap_or_else(|| self.directory.join("cache")),
        )
    }
}
