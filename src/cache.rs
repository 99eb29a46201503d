//! Small JSON store under `~/.cache/relato/` for things that should survive
//! between runs, which today means gateway contexts and the pointer to the
//! current one.
//!
//! To store something new, implement Cacheable and CacheKey; read(), write()
//! and read_all() then work for it.
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::context::{Context, ContextName};

/// Keys know where their data lives relative to the type's folder.
pub trait CacheKey {
    fn as_path(&self) -> String;
}

/// Pairing the stored type with its key type keeps reads honest: you cannot
/// read a Context out of a key that points at something else, the compiler
/// will not let you.
pub trait Cacheable {
    type CacheKey;

    fn cache_key(&self) -> Self::CacheKey;

    /// All values of one type share a folder named after this, which is what
    /// makes [read_all] possible.
    fn type_id() -> &'static str;
}

pub fn read<D, K>(cache_key: &K) -> Result<D, crate::Error>
where
    D: Cacheable<CacheKey = K> + DeserializeOwned,
    K: CacheKey,
{
    let file_location = get_cache_path(D::type_id(), cache_key.as_path().as_str())?;

    let data = serde_json::from_reader(fs::File::open(file_location)?)?;

    Ok(data)
}

pub fn write<D, K>(data: &D) -> Result<(), crate::Error>
where
    D: Cacheable<CacheKey = K> + Serialize,
    K: CacheKey,
{
    let file_location = get_cache_path(D::type_id(), data.cache_key().as_path().as_str())?;

    let data = serde_json::to_string(&data)?;

    fs::write(file_location, data)?;

    Ok(())
}

/// Every stored value of a type, in directory order.
pub fn read_all<D, K>() -> Result<Vec<D>, crate::Error>
where
    D: Cacheable<CacheKey = K> + DeserializeOwned,
{
    let folder = require_cache_folder(D::type_id())?;

    let mut found = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;

        found.push(serde_json::from_reader(fs::File::open(entry.path())?)?);
    }

    Ok(found)
}

fn get_cache_path(type_id: &'static str, cache_key: &str) -> Result<PathBuf, crate::Error> {
    let mut location = require_cache_folder(type_id)?;

    location.push(cache_key);

    Ok(location)
}

fn require_cache_folder(type_id: &'static str) -> Result<PathBuf, crate::Error> {
    let home = std::env::var("HOME")?;

    let mut path = PathBuf::from(home);
    path.push(".cache");
    path.push("relato");
    path.push("cache");
    path.push("v1");
    path.push(type_id);

    fs::create_dir_all(&path)?;

    Ok(path)
}

// Impls for everything we store live here, so the types themselves stay free
// of storage concerns.

impl Cacheable for Context {
    type CacheKey = ContextName;

    fn cache_key(&self) -> Self::CacheKey {
        self.name.clone()
    }

    fn type_id() -> &'static str {
        "context"
    }
}

impl CacheKey for ContextName {
    fn as_path(&self) -> String {
        format!("context_{}.json", self)
    }
}

// The name of the current context is itself cached, under a fixed key.

impl Cacheable for ContextName {
    type CacheKey = SharedCacheKey;

    fn cache_key(&self) -> Self::CacheKey {
        SharedCacheKey(Self::type_id().to_owned())
    }

    fn type_id() -> &'static str {
        "current_context"
    }
}

pub struct SharedCacheKey(String);

impl SharedCacheKey {
    pub fn for_current_context() -> Self {
        SharedCacheKey(<ContextName as Cacheable>::type_id().to_owned())
    }
}

impl CacheKey for SharedCacheKey {
    fn as_path(&self) -> String {
        self.0.clone()
    }
}
