//! Slug derivation for event titles
//!
//! `"My Workshop!"` becomes `"my-workshop-a7b2"`: the title is lowercased,
//! stripped to `[a-z0-9\s-]`, whitespace runs become a hyphen, hyphen runs
//! collapse, edges are trimmed and a random 4-character suffix is appended.
//! The suffix makes collisions unlikely, not impossible.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

/// Length of the random disambiguating suffix.
pub const SUFFIX_LEN: usize = 4;

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Base used when nothing of the title survives stripping.
const FALLBACK_BASE: &str = "event";

static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").expect("invalid slug strip regex"));

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

static HYPHENS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("invalid hyphen regex"));

/// Full slug grammar: hyphen-separated alphanumeric words plus the suffix.
static SLUG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*-[a-z0-9]{4}$").expect("invalid slug regex")
});

/// URL-safe base derived from a title, without the random suffix.
///
/// May be empty when the title holds no ASCII letters or digits.
pub fn slug_base(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let stripped = DISALLOWED_RE.replace_all(&lowered, "");
    let hyphenated = WHITESPACE_RE.replace_all(&stripped, "-");
    let collapsed = HYPHENS_RE.replace_all(&hyphenated, "-");
    collapsed.trim_matches('-').to_owned()
}

/// Random lowercase alphanumeric suffix of [`SUFFIX_LEN`] characters.
pub fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Derive a slug for `title` using the thread-local RNG.
///
/// # Example
/// ```
/// use devevent_core::slug::{generate_slug, is_slug};
///
/// let slug = generate_slug("My Workshop!");
/// assert!(slug.starts_with("my-workshop-"));
/// assert!(is_slug(&slug));
/// ```
pub fn generate_slug(title: &str) -> String {
    generate_slug_with(title, &mut rand::thread_rng())
}

/// Derive a slug for `title` drawing the suffix from `rng`.
pub fn generate_slug_with<R: Rng + ?Sized>(title: &str, rng: &mut R) -> String {
    let base = slug_base(title);
    let base = if base.is_empty() {
        FALLBACK_BASE.to_owned()
    } else {
        base
    };
    format!("{}-{}", base, random_suffix(rng))
}

/// Whether `s` matches the derived-slug grammar.
pub fn is_slug(s: &str) -> bool {
    SLUG_RE.is_match(s)
}
