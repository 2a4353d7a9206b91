//! In-memory response cache keyed by operation shape.
//!
//! Keys are the SHA-256 of the whitespace-normalized document (string
//! literals are left untouched) and the
//! canonical (key-sorted) JSON form of the variables, so two requests that
//! differ only in formatting or variable order share an entry. The cache is
//! bounded: inserting past capacity evicts the least recently used entry.
//! Entries optionally expire after a TTL. Concurrent writers to the same key
//! resolve as last writer wins.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// A canonical cache key for a (document, variables) pair.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    /// Computes the key for `document` with `variables`.
    ///
    /// Missing variables and an empty variables object produce the same key.
    #[must_use]
    pub fn new(document: &str, variables: Option<&serde_json::Value>) -> Self {
        let normalized = normalize_document(document);

        let mut canonical_vars = String::new();
        match variables {
            None => canonical_vars.push_str("{}"),
            Some(value) => write_canonical(value, &mut canonical_vars),
        }

        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hasher.update(b"\n");
        hasher.update(canonical_vars.as_bytes());

        Self(URL_SAFE_NO_PAD.encode(hasher.finalize()))
    }

    /// Returns the encoded digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Collapses whitespace runs outside string literals to a single space.
fn normalize_document(document: &str) -> String {
    let mut out = String::with_capacity(document.len());
    let mut rest = document;
    let mut pending_space = false;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            pending_space = true;
            rest = &rest[c.len_utf8()..];
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;

        let len = if c == '"' {
            string_literal_len(rest)
        } else {
            c.len_utf8()
        };
        out.push_str(&rest[..len]);
        rest = &rest[len..];
    }

    out
}

/// Byte length of the string or block string literal that opens `source`,
/// quotes included. An unterminated literal runs to the end of `source`.
fn string_literal_len(source: &str) -> usize {
    if let Some(body) = source.strip_prefix("\"\"\"") {
        let mut from = 0;
        while let Some(i) = body[from..].find("\"\"\"") {
            let at = from + i;
            // \""" is an escaped delimiter inside a block string
            if body[..at].ends_with('\\') {
                from = at + 3;
                continue;
            }
            return at + 6;
        }
        return source.len();
    }

    let mut escaped = false;
    for (i, c) in source.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return i + 1,
            _ => {}
        }
    }
    source.len()
}

/// Writes `value` as JSON with object keys in sorted order.
fn write_canonical(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}:", serde_json::Value::String(key.clone()));
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        serde_json::Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => {
            let _ = write!(out, "{scalar}");
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    value: serde_json::Value,
    inserted_at: Instant,
    last_used: Instant,
}

/// Bounded, optionally time-bound cache of successful GraphQL payloads.
#[derive(Debug)]
pub struct ResponseCache {
    inner: Mutex<HashMap<CacheKey, CacheEntry>>,
    capacity: usize,
    ttl: Option<Duration>,
}

impl ResponseCache {
    /// Creates an empty cache holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Returns the maximum number of entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the entry lifetime, if entries expire.
    #[must_use]
    pub const fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Returns the cached payload for `key`, if present and fresh.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        self.get_at(key, Instant::now())
    }

    /// Stores `value` under `key`, evicting as needed.
    pub fn insert(&self, key: CacheKey, value: serde_json::Value) {
        self.insert_at(key, value, Instant::now());
    }

    /// Removes the entry for `key`. Returns `true` if an entry was removed.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.inner
            .lock()
            .map(|mut inner| inner.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.clear();
        }
    }

    /// Returns the number of stored entries, including stale ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.len()).unwrap_or(0)
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        self.ttl
            .map_or(true, |ttl| now.saturating_duration_since(entry.inserted_at) < ttl)
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<serde_json::Value> {
        let mut inner = self.inner.lock().ok()?;
        let fresh = self.is_fresh(inner.get(key)?, now);
        if !fresh {
            inner.remove(key);
            return None;
        }
        let entry = inner.get_mut(key)?;
        entry.last_used = now;
        Some(entry.value.clone())
    }

    fn insert_at(&self, key: CacheKey, value: serde_json::Value, now: Instant) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };

        if self.ttl.is_some() {
            inner.retain(|_, entry| self.is_fresh(entry, now));
        }

        if !inner.contains_key(&key) && inner.len() >= self.capacity {
            let oldest = inner
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(key = oldest.as_str(), "evicting least recently used response");
                inner.remove(&oldest);
            }
        }

        inner.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                last_used: now,
            },
        );
    }
}

// Verify ResponseCache is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResponseCache>();
};
