use std::fmt;

/// A validated, non-empty credential for exactly one request.
///
/// Not `Clone`: it moves from the prompt into the request that uses it and is
/// cleared when dropped.
pub struct Credential(String);

impl Credential {
    /// Accept `raw` unless it is empty or whitespace only.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The credential text, exactly as entered.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.0.clear();
        self.0.shrink_to_fit();
    }
}
