//! Key-Value store wrapper with automatic serialization.

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// Type-safe cache backed by Spin's Key-Value store.
///
/// Values are JSON-serialized, so anything `Serialize + DeserializeOwned`
/// can be stored. Expiry is the caller's concern: values that age out
/// (sessions, courier tokens, rate windows) carry their own timestamps.
pub struct Cache {
    #[cfg(target_arch = "wasm32")]
    store: spin_sdk::key_value::Store,
    #[cfg(not(target_arch = "wasm32"))]
    _phantom: std::marker::PhantomData<()>,
}

impl Cache {
    /// Open the default Key-Value store.
    #[cfg(target_arch = "wasm32")]
    pub fn open_default() -> Result<Self, CacheError> {
        let store = spin_sdk::key_value::Store::open_default()
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self { store })
    }

    /// Open a named Key-Value store.
    #[cfg(target_arch = "wasm32")]
    pub fn open(name: &str) -> Result<Self, CacheError> {
        let store = spin_sdk::key_value::Store::open(name)
            .map_err(|e| CacheError::OpenError(e.to_string()))?;
        Ok(Self { store })
    }

    /// Get a value from the cache. Returns `None` if the key doesn't exist.
    #[cfg(target_arch = "wasm32")]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get(key) {
            Ok(Some(bytes)) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(CacheError::StoreError(e.to_string())),
        }
    }

    /// Set a value in the cache.
    #[cfg(target_arch = "wasm32")]
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store
            .set(key, &bytes)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    /// Delete a value from the cache.
    #[cfg(target_arch = "wasm32")]
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store
            .delete(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    /// Check if a key exists in the cache.
    #[cfg(target_arch = "wasm32")]
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store
            .exists(key)
            .map_err(|e| CacheError::StoreError(e.to_string()))
    }

    // Non-WASM stubs for development/testing
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_default() -> Result<Self, CacheError> {
        Ok(Self {
            _phantom: std::marker::PhantomData,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn open(_name: &str) -> Result<Self, CacheError> {
        Ok(Self {
            _phantom: std::marker::PhantomData,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn get<T: DeserializeOwned>(&self, _key: &str) -> Result<Option<T>, CacheError> {
        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn set<T: Serialize>(&self, _key: &str, _value: &T) -> Result<(), CacheError> {
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }
}
