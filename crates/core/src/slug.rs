//! URL-safe slug derivation for published article URLs.

/// Maximum slug length. Long titles are cut at the last full word that fits.
const MAX_SLUG_LEN: usize = 80;

/// Derive a URL-safe slug from a title.
///
/// Lowercases ASCII, keeps alphanumeric runs, and joins them with single
/// hyphens. Non-ASCII characters (e.g. an Arabic title) contribute nothing,
/// which is why article slugs are always derived from the English title.
/// Returns `"untitled"` when nothing survives.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.len() > MAX_SLUG_LEN {
        let cut = slug[..MAX_SLUG_LEN]
            .rfind('-')
            .unwrap_or(MAX_SLUG_LEN);
        slug.truncate(cut);
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Commercial Lease Renewals"), "commercial-lease-renewals");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("What's new -- in 2026?"), "what-s-new-in-2026");
    }

    #[test]
    fn strips_non_ascii() {
        assert_eq!(slugify("تجديد عقود الإيجار"), "untitled");
        assert_eq!(slugify("Lease تجديد Renewals"), "lease-renewals");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  ...hello world!  "), "hello-world");
    }

    #[test]
    fn empty_title_falls_back() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn caps_length_at_word_boundary() {
        let title = "word ".repeat(40);
        let slug = slugify(&title);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }
}
