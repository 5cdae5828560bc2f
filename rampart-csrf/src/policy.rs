/// Whether a request method needs a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    /// Exempt from verification; a token is issued instead
    Safe,
    /// State-changing; must carry a valid token
    Unsafe,
}

/// Fixed set of methods exempt from token verification.
///
/// Method names compare ASCII case-insensitively. Anything not in the set
/// is unsafe, including methods the policy has never heard of.
#[derive(Debug, Clone)]
pub struct MethodPolicy {
    ignored: Vec<String>,
}

impl MethodPolicy {
    pub fn new<I, S>(ignored_methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ignored: ignored_methods
                .into_iter()
                .map(|m| m.as_ref().trim().to_ascii_uppercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn classify(&self, method: &str) -> MethodClass {
        if self.ignored.iter().any(|m| m.eq_ignore_ascii_case(method)) {
            MethodClass::Safe
        } else {
            MethodClass::Unsafe
        }
    }

    pub fn is_safe(&self, method: &str) -> bool {
        self.classify(method) == MethodClass::Safe
    }
}

impl Default for MethodPolicy {
    fn default() -> Self {
        Self::new(["GET", "HEAD", "OPTIONS"])
    }
}
