//! Recognized lock, guard, unlock, and mutex-declaration constructs.
//!
//! Each table is matched as a class of phrases rather than one library's
//! literal spelling: standard names may appear without `std::` (after a
//! using-declaration), guard templates may omit their arguments (CTAD) and
//! may be brace-initialized. Tags are stable and appear in profiles and JSON.

use regex::Regex;
use std::sync::LazyLock;

/// A compiled construct pattern with its display tag.
pub struct Construct {
    pub tag: &'static str,
    pub re: Regex,
}

fn construct(tag: &'static str, pattern: &str) -> Construct {
    Construct {
        tag,
        re: Regex::new(pattern).unwrap_or_else(|e| panic!("invalid construct pattern {tag}: {e}")),
    }
}

/// Lock-acquisition constructs.
pub static LOCK_ACQUISITION: LazyLock<Vec<Construct>> = LazyLock::new(|| {
    vec![
        construct("mutex.lock()", r"\w+\.lock\(\)"),
        construct(
            "lock_guard",
            r"(?:\bstd::)?\b(?:lock_guard|scoped_lock)(?:\s*<[^>]+>)?\s+\w+\s*[({][^)}]+[)}]",
        ),
        construct(
            "unique_lock",
            r"(?:\bstd::)?\bunique_lock(?:\s*<[^>]+>)?\s+\w+\s*[({][^)}]+[)}]",
        ),
        construct(
            "shared_lock",
            r"(?:\bstd::)?\bshared_lock(?:\s*<[^>]+>)?\s+\w+\s*[({][^)}]+[)}]",
        ),
        construct("pthread_mutex_lock", r"\bpthread_mutex_lock\s*\([^)]+\)"),
        construct("SDL_LockMutex", r"\bSDL_LockMutex\s*\([^)]+\)"),
        construct("SDL_LockSurface", r"\bSDL_LockSurface\s*\([^)]+\)"),
    ]
});

/// Manual unlock calls.
pub static MANUAL_UNLOCK: LazyLock<Vec<Construct>> = LazyLock::new(|| {
    vec![
        construct("mutex.unlock()", r"\w+\.unlock\(\)"),
        construct("pthread_mutex_unlock", r"\bpthread_mutex_unlock\s*\([^)]+\)"),
        construct("SDL_UnlockMutex", r"\bSDL_UnlockMutex\s*\([^)]+\)"),
        construct("SDL_UnlockSurface", r"\bSDL_UnlockSurface\s*\([^)]+\)"),
    ]
});

/// Any RAII guard type mentioned on a line.
pub static RAII_GUARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bstd::)?\b(?:lock_guard|scoped_lock|unique_lock|shared_lock)\b")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Mutex-typed declarations; each pattern captures the member name as `name`.
pub static MUTEX_DECLARATION: LazyLock<Vec<Construct>> = LazyLock::new(|| {
    vec![
        construct(
            "std::mutex",
            r"(?:\bstd::)?\b(?:mutex|shared_mutex|recursive_mutex)\s+(?P<name>\w+)",
        ),
        construct("pthread_mutex_t", r"\bpthread_mutex_t\s+(?P<name>\w+)"),
        construct("SDL_mutex", r"\bSDL_mutex\s*\*\s*(?P<name>\w+)"),
    ]
});

/// Tags of every lock construct found in `text`, in table order.
pub fn lock_tags(text: &str) -> Vec<&'static str> {
    LOCK_ACQUISITION
        .iter()
        .filter(|c| c.re.is_match(text))
        .map(|c| c.tag)
        .collect()
}

pub fn has_lock(text: &str) -> bool {
    LOCK_ACQUISITION.iter().any(|c| c.re.is_match(text))
}

/// Number of separate lock-acquisition matches on one line.
pub fn lock_count(line: &str) -> usize {
    LOCK_ACQUISITION
        .iter()
        .map(|c| c.re.find_iter(line).count())
        .sum()
}

pub fn has_manual_unlock(line: &str) -> bool {
    MANUAL_UNLOCK.iter().any(|c| c.re.is_match(line))
}

pub fn has_raii_guard(text: &str) -> bool {
    RAII_GUARD.is_match(text)
}

/// Declared mutex member names in order of appearance, deduplicated.
pub fn mutex_members(text: &str) -> Vec<String> {
    let mut hits: Vec<(usize, String)> = Vec::new();
    for c in MUTEX_DECLARATION.iter() {
        for caps in c.re.captures_iter(text) {
            if let Some(m) = caps.name("name") {
                hits.push((m.start(), m.as_str().to_string()));
            }
        }
    }
    hits.sort_by_key(|(pos, _)| *pos);
    let mut names: Vec<String> = Vec::new();
    for (_, n) in hits {
        if !names.contains(&n) {
            names.push(n);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_tags_recognizes_guard_forms() {
        assert_eq!(
            lock_tags("std::lock_guard<std::mutex> lock(m_mutex);"),
            vec!["lock_guard"]
        );
        assert_eq!(lock_tags("std::scoped_lock lk{a};"), vec!["lock_guard"]);
        assert_eq!(
            lock_tags("std::unique_lock<std::mutex> lk(m);"),
            vec!["unique_lock"]
        );
        assert_eq!(
            lock_tags("std::shared_lock<std::shared_mutex> r(m);"),
            vec!["shared_lock"]
        );
        assert_eq!(lock_tags("m_mutex.lock();"), vec!["mutex.lock()"]);
        assert_eq!(
            lock_tags("pthread_mutex_lock(&m);"),
            vec!["pthread_mutex_lock"]
        );
        assert_eq!(lock_tags("SDL_LockMutex(mtx);"), vec!["SDL_LockMutex"]);
        assert_eq!(lock_tags("SDL_LockSurface(screen);"), vec!["SDL_LockSurface"]);
        assert!(lock_tags("m_mutex.unlock();").is_empty());
    }

    #[test]
    fn test_lock_count_counts_each_match() {
        assert_eq!(lock_count("a.lock(); b.lock();"), 2);
        assert_eq!(
            lock_count("std::lock_guard<std::mutex> g(a); pthread_mutex_lock(&b);"),
            2
        );
        assert_eq!(lock_count("std::lock_guard<std::mutex> g(a);"), 1);
    }

    #[test]
    fn test_manual_unlock_and_guard() {
        assert!(has_manual_unlock("m.unlock();"));
        assert!(has_manual_unlock("pthread_mutex_unlock(&m);"));
        assert!(has_manual_unlock("SDL_UnlockSurface(s);"));
        assert!(!has_manual_unlock("std::lock_guard<std::mutex> g(m);"));
        assert!(has_raii_guard("std::unique_lock<std::mutex> lk(m);"));
        assert!(!has_raii_guard("std::mutex m;"));
    }

    #[test]
    fn test_mutex_members_in_order_and_deduplicated() {
        let text = "SDL_mutex *surface_lock;\nstd::mutex a;\nmutable std::shared_mutex b;\npthread_mutex_t c;\nstd::mutex a;\n";
        assert_eq!(mutex_members(text), vec!["surface_lock", "a", "b", "c"]);
    }

    #[test]
    fn test_unqualified_standard_names_are_recognized() {
        assert_eq!(mutex_members("mutex a; mutex b;"), vec!["a", "b"]);
        assert_eq!(
            mutex_members("mutable shared_mutex rw;\nrecursive_mutex r;"),
            vec!["rw", "r"]
        );
        assert_eq!(lock_tags("lock_guard<mutex> lock(m);"), vec!["lock_guard"]);
        assert_eq!(lock_tags("unique_lock<mutex> lk(m);"), vec!["unique_lock"]);
        assert_eq!(lock_tags("shared_lock lk{rw};"), vec!["shared_lock"]);
        assert!(has_raii_guard("scoped_lock both(a, b);"));
        assert!(mutex_members("lock_guard<mutex> g(m);").is_empty());
        assert!(mutex_members("mutex_count = 2; my_mutex x;").is_empty());
    }

    #[test]
    fn test_mutex_members_ignores_guard_template_arguments() {
        assert!(mutex_members("std::lock_guard<std::mutex> g(m);").is_empty());
        assert!(mutex_members("void f(std::mutex& m);").is_empty());
    }
}
