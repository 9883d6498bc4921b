//! Slug and excerpt derivation for posts.
//!
//! A slug is the lowercased title with whitespace runs collapsed to `-` and
//! everything outside `[A-Za-z0-9_-]` stripped, followed by a 6-hex-char
//! random suffix. The suffix makes collisions unlikely; the database still
//! carries a UNIQUE constraint and the service retries on conflict.

const EXCERPT_LEN: usize = 200;

/// Deterministic part of the slug: normalize a title into a URL-safe base.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.trim().chars() {
        if ch.is_whitespace() {
            pending_dash = !out.is_empty();
            continue;
        }
        for lower in ch.to_lowercase() {
            if lower.is_ascii_alphanumeric() || lower == '_' || lower == '-' {
                if pending_dash {
                    out.push('-');
                    pending_dash = false;
                }
                out.push(lower);
            }
        }
    }

    out
}

/// 3 random bytes rendered as 6 lowercase hex characters.
pub fn random_suffix() -> String {
    let bytes: [u8; 3] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Full slug: normalized title plus a fresh random suffix.
pub fn generate(title: &str) -> String {
    format!("{}-{}", slugify(title), random_suffix())
}

/// First 200 characters of the content plus an ellipsis. Cuts mid-word,
/// but never mid-character.
pub fn derive_excerpt(content: &str) -> String {
    let truncated: String = content.chars().take(EXCERPT_LEN).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn slugify_strips_punctuation() {
        assert_eq!(slugify("Hello World!"), "hello-world");
        assert_eq!(slugify("C++ & Rust: a story"), "c-rust-a-story");
    }

    #[test]
    fn slugify_collapses_whitespace_runs() {
        assert_eq!(slugify("a  \t b\n c"), "a-b-c");
    }

    #[test]
    fn slugify_keeps_underscores_and_dashes() {
        assert_eq!(slugify("snake_case and-dash"), "snake_case-and-dash");
    }

    #[test]
    fn generate_matches_expected_pattern() {
        let slug = generate("Hello World!");
        let (base, suffix) = slug.rsplit_once('-').unwrap();
        assert_eq!(base, "hello-world");
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn generate_uses_fresh_suffix_each_call() {
        // 24 bits of randomness; two identical draws in a row would be rare
        // enough to flag a broken RNG.
        assert_ne!(generate("same title"), generate("same title"));
    }

    #[test]
    fn excerpt_truncates_to_200_chars() {
        let content = "x".repeat(500);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), 203);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn excerpt_appends_ellipsis_to_short_content() {
        assert_eq!(derive_excerpt("short"), "short...");
    }

    #[test]
    fn excerpt_respects_char_boundaries() {
        let content = "é".repeat(300);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), 203);
    }
}
