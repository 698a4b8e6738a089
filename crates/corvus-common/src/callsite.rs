//! Call-site resolution for diagnostics.
//!
//! Resolving and trimming a source location is cheap but not free, and the
//! same locations are resolved over and over when errors are constructed
//! in hot paths. This module provides a process-wide, lazily initialized,
//! thread-safe cache mapping each code location to its workspace-relative
//! rendering.
//!
//! The workspace root is determined once at first use from this module's
//! own compile-time location. When the root cannot be determined (for
//! example when the crate is vendored under an unexpected layout), the
//! resolver falls back to stripping nothing and paths are reported as the
//! compiler recorded them.

use std::collections::HashMap;
use std::panic::Location;
use std::sync::OnceLock;

use parking_lot::Mutex;

/// This module's path relative to the workspace root. Must be kept in
/// sync with the actual file location; `CallResolver::new` falls back to
/// stripping nothing if the two disagree.
const SELF_PATH: &str = "crates/corvus-common/src/callsite.rs";

/// Cache key identifying one code location.
///
/// The file component uses pointer identity: `Location::file` returns a
/// `'static` string baked into the binary, so its address is stable and
/// cheaper to hash than its contents.
type CacheKey = (usize, u32, u32);

/// A caching resolver from code locations to trimmed path strings.
struct CallResolver {
    /// Path prefix stripped from every resolved location. Empty when the
    /// workspace root could not be determined.
    prefix: &'static str,
    /// Previously resolved locations.
    cache: Mutex<HashMap<CacheKey, String>>,
}

impl CallResolver {
    fn new() -> Self {
        // The compiler records this module's own path; everything before
        // the known workspace-relative suffix is the workspace root.
        let prefix = file!().strip_suffix(SELF_PATH).unwrap_or("");
        Self {
            prefix,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn resolve(&self, loc: &Location<'_>) -> String {
        let key = (loc.file().as_ptr() as usize, loc.line(), loc.column());

        let mut cache = self.cache.lock();
        if let Some(resolved) = cache.get(&key) {
            return resolved.clone();
        }

        let file = if self.prefix.is_empty() {
            loc.file()
        } else {
            loc.file().strip_prefix(self.prefix).unwrap_or(loc.file())
        };
        let resolved = format!("{}:{}", file, loc.line());
        cache.insert(key, resolved.clone());
        resolved
    }
}

fn resolver() -> &'static CallResolver {
    static RESOLVER: OnceLock<CallResolver> = OnceLock::new();
    RESOLVER.get_or_init(CallResolver::new)
}

/// Resolves the caller's source location to a trimmed `file:line` string.
///
/// # Example
///
/// ```rust
/// let origin = corvus_common::callsite::caller();
/// assert!(origin.contains(':'));
/// ```
#[must_use]
#[track_caller]
pub fn caller() -> String {
    resolver().resolve(Location::caller())
}

/// Resolves an explicit source location to a trimmed `file:line` string.
#[must_use]
pub fn resolve(loc: &Location<'_>) -> String {
    resolver().resolve(loc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_points_here() {
        let origin = caller();
        assert!(
            origin.contains("callsite.rs"),
            "unexpected origin: {origin}"
        );
    }

    #[test]
    fn test_workspace_prefix_stripped() {
        let origin = caller();
        // Whatever the build layout, the resolved path should start at
        // the workspace-relative crates/ directory once trimming applies.
        if file!().ends_with(SELF_PATH) && file!() != SELF_PATH {
            assert!(origin.starts_with("crates/"), "not trimmed: {origin}");
        }
    }

    #[test]
    fn test_repeated_lookups_are_stable() {
        #[track_caller]
        fn lookup() -> String {
            caller()
        }

        // Two calls from distinct lines resolve to distinct locations.
        let a = lookup();
        let b = lookup();
        assert_ne!(a, b);

        // The same location resolves identically every time (cache hit path).
        let loc = Location::caller();
        assert_eq!(resolve(loc), resolve(loc));
    }

    #[test]
    fn test_threaded_resolution() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| caller()))
            .collect();
        for handle in handles {
            let origin = handle.join().expect("thread panicked");
            assert!(origin.contains("callsite.rs"));
        }
    }
}
