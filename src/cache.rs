//! Read-view invalidation.
//!
//! Entity state lives in Postgres only; what this module tracks is a
//! generation counter per read-view path. Mutations bump the paths they
//! affect and read handlers stamp responses with an `ETag` derived from the
//! current generation, so the serving layer in front of this process can
//! cache views and drop exactly the ones that went stale.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::RwLock;

lazy_static! {
    static ref GENERATIONS: RwLock<HashMap<String, u64>> = RwLock::new(HashMap::new());
}

pub fn revalidate(path: &str) {
    let mut generations = GENERATIONS.write().unwrap();
    *generations.entry(path.to_string()).or_insert(0) += 1;
}

pub fn generation(path: &str) -> u64 {
    let generations = GENERATIONS.read().unwrap();
    generations.get(path).copied().unwrap_or(0)
}

pub fn etag(path: &str) -> String {
    let tag = path.trim_matches('/').replace('/', "-");
    format!("W/\"{}-{}\"", tag, generation(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_path_starts_at_zero() {
        assert_eq!(generation("/never-touched"), 0);
    }

    #[test]
    fn revalidate_bumps_generation() {
        let before = generation("/bump-me");
        revalidate("/bump-me");
        revalidate("/bump-me");

        assert_eq!(generation("/bump-me"), before + 2);
    }

    #[test]
    fn etag_changes_after_revalidate() {
        let stale = etag("/etag-path");
        revalidate("/etag-path");

        assert_ne!(etag("/etag-path"), stale);
    }

    #[test]
    fn etag_is_a_weak_validator() {
        let tag = etag("/benchmarks/python-agent");

        assert!(tag.starts_with("W/\""));
        assert!(!tag["W/".len()..].contains('/'));
    }
}
