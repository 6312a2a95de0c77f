//! Cookie-backed snapshot persistence.
//!
//! The task list lives in a cookie named `todos` whose value is the
//! URL-encoded JSON array of task texts, stamped with an expiry a year out
//! and a site-wide path. The jar itself is one `name=value; attributes`
//! line per cookie, persisted in a local file.
//!
//! Every write replaces the whole snapshot; there are no partial or merge
//! writes. A missing snapshot is an empty list. A snapshot that fails to
//! decode is an error for the caller to log and mask - never to surface.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;
use todolist_core::environment::Clock;

/// Name of the cookie holding the snapshot
pub const COOKIE_NAME: &str = "todos";

/// Path attribute written with the snapshot cookie (site-wide scope)
pub const COOKIE_PATH: &str = "/";

/// Snapshot lifetime, stamped on every write
pub const COOKIE_TTL_DAYS: i64 = 365;

/// `toUTCString`-style timestamp used by the `expires` attribute
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Errors raised by snapshot persistence
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The stored value is not a valid JSON array of strings
    #[error("invalid snapshot encoding: {0}")]
    Decode(#[from] serde_json::Error),

    /// The stored value is not valid percent-encoded UTF-8
    #[error("invalid percent-encoding in snapshot: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The cookie jar file could not be read or written
    #[error("cookie jar I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent store for the task list snapshot
///
/// `load` is called once at startup; `save` after every successful
/// mutation, overwriting whatever was there before.
pub trait SnapshotStore: Send + Sync {
    /// Read the persisted task list
    ///
    /// An absent snapshot yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the stored value cannot be decoded or
    /// the jar cannot be read.
    fn load(&self) -> Result<Vec<String>, SnapshotError>;

    /// Overwrite the persisted task list
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the jar cannot be written.
    fn save(&self, tasks: &[String], expires_at: DateTime<Utc>) -> Result<(), SnapshotError>;
}

/// Encode a task list into the cookie value representation
///
/// # Errors
///
/// Returns [`SnapshotError::Decode`] if JSON serialization fails (which
/// cannot happen for a list of strings, but the signature keeps the
/// boundary honest).
pub fn encode_tasks(tasks: &[String]) -> Result<String, SnapshotError> {
    let json = serde_json::to_string(tasks)?;
    Ok(urlencoding::encode(&json).into_owned())
}

/// Decode a cookie value back into a task list
///
/// # Errors
///
/// Returns [`SnapshotError::Encoding`] for broken percent-encoding and
/// [`SnapshotError::Decode`] for anything that is not a JSON array of
/// strings.
pub fn decode_tasks(value: &str) -> Result<Vec<String>, SnapshotError> {
    let json = urlencoding::decode(value)?;
    Ok(serde_json::from_str(&json)?)
}

fn format_expires(time: DateTime<Utc>) -> String {
    time.format(EXPIRES_FORMAT).to_string()
}

fn parse_expires(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(text)
        .ok()
        .map(|time| time.with_timezone(&Utc))
}

/// A single `name=value; attributes` cookie line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Raw (encoded) cookie value
    pub value: String,
    /// Expiry attribute, if present
    pub expires: Option<DateTime<Utc>>,
    /// Path attribute, if present
    pub path: Option<String>,
}

impl Cookie {
    /// Parse one cookie line, splitting on `;` for attributes and `=` for
    /// each pair
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut segments = line.split(';');
        let (name, value) = segments.next()?.trim().split_once('=')?;
        if name.trim().is_empty() {
            return None;
        }

        let mut cookie = Self {
            name: name.trim().to_owned(),
            value: value.trim().to_owned(),
            expires: None,
            path: None,
        };

        for attribute in segments {
            if let Some((key, val)) = attribute.trim().split_once('=') {
                match key.trim().to_ascii_lowercase().as_str() {
                    "expires" => cookie.expires = parse_expires(val.trim()),
                    "path" => cookie.path = Some(val.trim().to_owned()),
                    _ => {},
                }
            }
        }

        Some(cookie)
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(expires) = self.expires {
            write!(f, "; expires={}", format_expires(expires))?;
        }
        if let Some(path) = &self.path {
            write!(f, "; path={path}")?;
        }
        Ok(())
    }
}

/// The set of cookies in a jar file, one line per cookie
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    /// Parse a jar file's contents
    ///
    /// Unparseable lines are dropped; a jar never hands out malformed
    /// entries.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self {
            cookies: text.lines().filter_map(Cookie::parse).collect(),
        }
    }

    /// Look up a cookie by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|cookie| cookie.name == name)
    }

    /// Insert or replace a cookie by name
    pub fn set(&mut self, cookie: Cookie) {
        if let Some(existing) = self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
    }
}

impl fmt::Display for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cookie in &self.cookies {
            writeln!(f, "{cookie}")?;
        }
        Ok(())
    }
}

/// Snapshot store persisting the cookie jar in a local file
///
/// Plays the browser's part of the contract too: a cookie whose `expires`
/// attribute has passed is invisible to `load`, judged against the injected
/// clock.
pub struct FileCookieStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FileCookieStore {
    /// Create a store over the jar file at `path`
    pub fn new(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    fn read_jar(&self) -> Result<CookieJar, SnapshotError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(CookieJar::parse(&text)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(CookieJar::default()),
            Err(error) => Err(error.into()),
        }
    }
}

impl SnapshotStore for FileCookieStore {
    fn load(&self) -> Result<Vec<String>, SnapshotError> {
        let jar = self.read_jar()?;
        let Some(cookie) = jar.get(COOKIE_NAME) else {
            tracing::debug!(path = %self.path.display(), "no stored todos");
            return Ok(Vec::new());
        };

        if cookie
            .expires
            .is_some_and(|expires| expires <= self.clock.now())
        {
            tracing::debug!("stored todos expired");
            return Ok(Vec::new());
        }

        decode_tasks(&cookie.value)
    }

    fn save(&self, tasks: &[String], expires_at: DateTime<Utc>) -> Result<(), SnapshotError> {
        let mut jar = self.read_jar()?;
        jar.set(Cookie {
            name: COOKIE_NAME.to_owned(),
            value: encode_tasks(tasks)?,
            expires: Some(expires_at),
            path: Some(COOKIE_PATH.to_owned()),
        });
        fs::write(&self.path, jar.to_string())?;
        Ok(())
    }
}

/// In-memory snapshot store
///
/// Keeps the same encoded representation as the file store but in a cell,
/// which lets tests preload raw (even corrupt) cookie values and inspect
/// exactly what was written.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookie: Mutex<Option<Cookie>>,
}

impl MemoryCookieStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with a raw cookie value
    #[must_use]
    pub fn with_value(raw: impl Into<String>) -> Self {
        Self {
            cookie: Mutex::new(Some(Cookie {
                name: COOKIE_NAME.to_owned(),
                value: raw.into(),
                expires: None,
                path: None,
            })),
        }
    }

    /// The raw encoded value currently stored, if any
    #[must_use]
    pub fn raw_value(&self) -> Option<String> {
        self.cookie
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|cookie| cookie.value.clone())
    }

    /// The full cookie currently stored, if any
    #[must_use]
    pub fn stored(&self) -> Option<Cookie> {
        self.cookie
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SnapshotStore for MemoryCookieStore {
    fn load(&self) -> Result<Vec<String>, SnapshotError> {
        self.cookie
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or_else(|| Ok(Vec::new()), |cookie| decode_tasks(&cookie.value))
    }

    fn save(&self, tasks: &[String], expires_at: DateTime<Utc>) -> Result<(), SnapshotError> {
        let cookie = Cookie {
            name: COOKIE_NAME.to_owned(),
            value: encode_tasks(tasks)?,
            expires: Some(expires_at),
            path: Some(COOKIE_PATH.to_owned()),
        };
        *self.cookie.lock().unwrap_or_else(PoisonError::into_inner) = Some(cookie);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use todolist_core::environment::Clock;
    use todolist_testing::{FixedClock, test_clock};

    fn tasks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| (*t).to_owned()).collect()
    }

    #[test]
    fn cookie_line_round_trips() {
        let cookie = Cookie {
            name: COOKIE_NAME.to_owned(),
            value: "%5B%22a%22%5D".to_owned(),
            expires: Some(test_clock().now()),
            path: Some(COOKIE_PATH.to_owned()),
        };

        let parsed = Cookie::parse(&cookie.to_string()).unwrap();
        assert_eq!(parsed, cookie);
    }

    #[test]
    fn expires_attribute_uses_utc_string_format() {
        let cookie = Cookie {
            name: COOKIE_NAME.to_owned(),
            value: "x".to_owned(),
            expires: Some(test_clock().now()),
            path: None,
        };

        assert_eq!(
            cookie.to_string(),
            "todos=x; expires=Wed, 01 Jan 2025 00:00:00 GMT"
        );
    }

    #[test]
    fn jar_finds_cookie_among_others() {
        let jar = CookieJar::parse("theme=dark; path=/\ntodos=%5B%5D; path=/\n");

        let cookie = jar.get(COOKIE_NAME).unwrap();
        assert_eq!(cookie.value, "%5B%5D");
        assert!(jar.get("session").is_none());
    }

    #[test]
    fn jar_drops_malformed_lines() {
        let jar = CookieJar::parse("garbage without equals\n\ntodos=ok\n");

        assert!(jar.get(COOKIE_NAME).is_some());
    }

    #[test]
    fn encode_decode_preserves_order_and_text() {
        let original = tasks(&["write report; path=/", "buy milk", "précis ✓"]);

        let encoded = encode_tasks(&original).unwrap();
        // The encoded value must survive cookie-line parsing untouched
        assert!(!encoded.contains(';'));
        assert_eq!(decode_tasks(&encoded).unwrap(), original);
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let result = decode_tasks("not%20json");
        assert!(matches!(result, Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.cookie");
        let store = FileCookieStore::new(&path, std::sync::Arc::new(test_clock()));

        let expected = tasks(&["buy milk", "walk dog"]);
        store
            .save(&expected, test_clock().now() + Duration::days(COOKIE_TTL_DAYS))
            .unwrap();

        assert_eq!(store.load().unwrap(), expected);
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCookieStore::new(
            dir.path().join("absent.cookie"),
            std::sync::Arc::new(test_clock()),
        );

        assert_eq!(store.load().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn file_store_hides_expired_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.cookie");

        let writer = FileCookieStore::new(&path, std::sync::Arc::new(test_clock()));
        writer
            .save(&tasks(&["stale"]), test_clock().now() + Duration::days(1))
            .unwrap();

        let later = FixedClock::new(test_clock().now() + Duration::days(2));
        let reader = FileCookieStore::new(&path, std::sync::Arc::new(later));

        assert_eq!(reader.load().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn file_store_preserves_unrelated_cookies() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.cookie");
        std::fs::write(&path, "theme=dark; path=/\n").unwrap();

        let store = FileCookieStore::new(&path, std::sync::Arc::new(test_clock()));
        store
            .save(&tasks(&["buy milk"]), test_clock().now() + Duration::days(1))
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("theme=dark"));
        assert!(text.contains("todos="));
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryCookieStore::new();
        let expected = tasks(&["a", "b"]);

        store
            .save(&expected, test_clock().now() + Duration::days(COOKIE_TTL_DAYS))
            .unwrap();

        assert_eq!(store.load().unwrap(), expected);
        assert!(store.stored().unwrap().expires.is_some());
    }

    #[test]
    fn memory_store_surfaces_corrupt_values() {
        let store = MemoryCookieStore::with_value("definitely-not-a-snapshot");
        assert!(store.load().is_err());
    }

    proptest! {
        #[test]
        fn encode_decode_round_trips(texts in proptest::collection::vec(".*", 0..8)) {
            let encoded = encode_tasks(&texts).unwrap();
            let decoded = decode_tasks(&encoded).unwrap();
            prop_assert_eq!(decoded, texts);
        }
    }
}
