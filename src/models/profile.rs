//! Structural facts extracted for one class region.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Access section a line falls under, tracked lexically.
pub enum AccessState {
    Public,
    Private,
    Protected,
}

impl AccessState {
    /// Recognize an access label at the start of a trimmed line.
    ///
    /// Accepts `public:`, `private :`, `public slots:` and trailing content
    /// such as comments, but not `public::`.
    pub fn from_label(trimmed: &str) -> Option<AccessState> {
        for (word, state) in [
            ("public", AccessState::Public),
            ("private", AccessState::Private),
            ("protected", AccessState::Protected),
        ] {
            let Some(rest) = trimmed.strip_prefix(word) else {
                continue;
            };
            let rest = rest.trim_start();
            let rest = match rest.strip_prefix("slots") {
                Some(r) => r.trim_start(),
                None => rest,
            };
            if rest.starts_with(':') && !rest.starts_with("::") {
                return Some(state);
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A public method found to acquire a lock.
pub struct MethodLockInfo {
    pub method_name: String,
    /// 1-based line of the signature.
    pub line_number: usize,
    /// Tags of the lock constructs found in the method window.
    pub matched_lock_constructs: Vec<&'static str>,
    /// Last line (inclusive, 1-based) of the forward window searched.
    #[serde(skip)]
    pub window_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Structural extraction result for one class or struct.
pub struct ClassProfile {
    pub name: String,
    pub source_file: String,
    pub start_line: usize,
    /// Mutex-typed members in declaration order, without duplicates.
    pub mutex_members: Vec<String>,
    pub public_lock_methods: Vec<MethodLockInfo>,
    /// Private `*_unlocked` methods in declaration order, without duplicates.
    pub private_unlocked_methods: Vec<String>,
}

impl ClassProfile {
    /// A profile is threading-relevant when it declares a mutex or has a
    /// public method that locks.
    pub fn is_relevant(&self) -> bool {
        !self.mutex_members.is_empty() || !self.public_lock_methods.is_empty()
    }

    pub fn has_unlocked(&self, name: &str) -> bool {
        self.private_unlocked_methods.iter().any(|m| m == name)
    }
}
