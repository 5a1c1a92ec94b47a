//! Parse and load grouped `GROUP_NAME=value` environment files.
//!
//! [`parse_str`] is the core: it decodes declarations into a typed
//! [`EnvironmentMap`] and resolves `${GROUP_NAME}` references with
//! cycle and missing-variable detection.
//!
//! [`EnvironmentStore`] wraps the parser with file access, an optional
//! namespaced JSON cache, and mutation operations (`remove`, `change`)
//! that rewrite the backing file.

mod cache;
mod error;
mod grammar;
mod model;
mod parser;
mod settings;
mod store;
mod value;

pub use cache::CacheStore;
pub use error::Error;
pub use model::{EnvironmentMap, ReferenceMode};
pub use parser::{parse_str, parse_str_with_mode};
pub use settings::{DEFAULT_APP_MODE, DEFAULT_FILENAME, StoreSettings};
pub use store::{CACHE_NAME, CACHE_TYPE, EnvironmentStore, dump};
pub use value::Value;
