// SPDX-FileCopyrightText: 2026 Dronegate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret redaction for log output and error messages.
//!
//! Pattern rules catch credentials in the shapes vendors put them on the wire
//! (query strings, JSON bodies, headers). Exact-match values cover secrets
//! loaded from configuration.

use std::io::Write;
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;

static REDACTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // appKey=... in token endpoint query strings
        r"(?i)(app_?key=)[^&\s]+",
        // "accessToken": "..." and "refreshToken": "..." in token responses
        r#"(?i)("(?:access|refresh)_?token"\s*:\s*")[^"]+"#,
        // X-User-Token: ... header dumps
        r"(?i)(x-user-token:\s*)\S+",
        // Bearer tokens
        r"(Bearer\s+)[a-zA-Z0-9._\-]{10,}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid redaction regex"))
    .collect()
});

const REDACTED: &str = "[REDACTED]";

/// Redact credential patterns and the given exact secret values.
pub fn redact(input: &str, secrets: &[String]) -> String {
    let mut result = input.to_string();

    for pattern in REDACTION_PATTERNS.iter() {
        result = pattern
            .replace_all(&result, format!("${{1}}{REDACTED}"))
            .into_owned();
    }

    // Longest first so a secret containing another is replaced whole.
    let mut sorted: Vec<&String> = secrets.iter().filter(|s| !s.is_empty()).collect();
    sorted.sort_by_key(|v| std::cmp::Reverse(v.len()));
    for value in sorted {
        result = result.replace(value.as_str(), REDACTED);
    }

    result
}

/// Writer wrapper that redacts secrets before forwarding output.
pub struct RedactingWriter<W> {
    inner: W,
    secrets: Arc<RwLock<Vec<String>>>,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, secrets: Arc<RwLock<Vec<String>>>) -> Self {
        Self { inner, secrets }
    }

    /// Register another exact-match secret (e.g. a freshly issued token).
    pub fn add_secret(secrets: &Arc<RwLock<Vec<String>>>, value: String) {
        if let Ok(mut values) = secrets.write() {
            if !value.is_empty() && !values.contains(&value) {
                values.push(value);
            }
        }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let input = String::from_utf8_lossy(buf);
        let secrets = self
            .secrets
            .read()
            .map(|v| v.clone())
            .unwrap_or_default();
        self.inner.write_all(redact(&input, &secrets).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
