use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Session cookies by name.
///
/// Filled from `Set-Cookie` response headers and replayed as a single
/// `Cookie` request header. Attributes (path, expiry, flags) are ignored and
/// nothing is ever expired.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: Mutex<BTreeMap<String, String>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Merge every `Set-Cookie` value of one response, overwriting same names.
    pub fn absorb<'a, I>(&self, set_cookies: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let parsed: Vec<(String, String)> = set_cookies
            .into_iter()
            .filter_map(parse_set_cookie)
            .collect();

        if parsed.is_empty() {
            return 0;
        }

        let count = parsed.len();
        self.lock().extend(parsed);
        count
    }

    /// Serialized `Cookie` header, or `None` when the jar is empty.
    pub fn header_value(&self) -> Option<String> {
        let cookies = self.lock();
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// `name=value; Path=/; HttpOnly` → `(name, value)`
fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}
