//! Forum short codes: URL-friendly alternate identifiers.
//!
//! A short code is derived from the forum name by [`normalize`] and made
//! unique by [`resolve_short_code`], which consults the store for forums
//! already holding the candidate:
//!
//! ```text
//! "General Chat"                -> general_chat
//! taken in another category     -> {category}_general_chat
//! taken in the same category,
//! or the prefixed code is taken -> {category}_general_chat_1, _2, ...
//! ```
//!
//! The resolver only proposes a code. Uniqueness is enforced by the store
//! when the forum is written, so two concurrent resolutions that propose the
//! same code cannot both be persisted.

use crate::board::forum::Forum;
use crate::board::store::BoardStore;
use crate::board::types::{CategoryId, ForumId};
use crate::error::{BoardError, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Separator used between code segments.
const SEPARATOR: char = '_';

/// Length of the canonical hyphenated UUID text form.
const CANONICAL_ID_LENGTH: usize = 36;

/// Byte offsets of the hyphens in a canonical id.
const CANONICAL_ID_HYPHENS: [usize; 4] = [8, 13, 18, 23];

/// Whitespace as matched by ECMAScript `\s`. Unlike `char::is_whitespace` this
/// excludes U+0085 and includes U+FEFF.
const WHITESPACE_CLASS: &str =
    r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

/// Compiled normalization patterns.
struct NormalizeRules {
    /// Everything that is neither kept nor a separator.
    disallowed: Regex,
    /// Runs of whitespace, hyphens and underscores.
    separators: Regex,
}

fn rules() -> &'static NormalizeRules {
    static RULES: OnceLock<NormalizeRules> = OnceLock::new();
    RULES.get_or_init(|| NormalizeRules {
        disallowed: Regex::new(&format!(r"[^a-z0-9_\-{}]+", WHITESPACE_CLASS))
            .expect("disallowed character pattern is valid"),
        separators: Regex::new(&format!(r"[_\-{}]+", WHITESPACE_CLASS))
            .expect("separator pattern is valid"),
    })
}

/// Converts a display name into a short code candidate.
///
/// Lowercases the name, drops everything except ASCII letters, digits,
/// whitespace, hyphens and underscores, then turns every run of
/// whitespace/hyphens/underscores into a single `_`. Leading and trailing
/// separators are removed.
///
/// ```
/// use bbforum::board::shortcode::normalize;
///
/// assert_eq!(normalize("Forum Title"), "forum_title");
/// assert_eq!(normalize("Hello---World!!"), "hello_world");
/// assert_eq!(normalize("   ___Mixed_Case-123   "), "mixed_case_123");
/// ```
///
/// The result only contains `[a-z0-9_]` and may be empty.
pub fn normalize(name: &str) -> String {
    let rules = rules();
    let lowered = name.to_lowercase();
    let kept = rules.disallowed.replace_all(&lowered, "");
    let joined = rules.separators.replace_all(&kept, "_");
    joined.trim_matches(SEPARATOR).to_string()
}

/// Resolves a short code for a forum named `forum_name` in `category_id`.
///
/// `exclude` names a forum whose own current code must not count as a
/// conflict, which is what re-resolving an existing forum after a rename
/// needs.
///
/// # Errors
/// - `BoardError::Validation` if the name normalizes to an empty string.
///   Callers decide what to do with such forums; see
///   `BoardService::create_forum`.
/// - `BoardError::ShortCode` if any store read fails. The underlying error
///   is kept in the message and nothing is retried.
pub fn resolve_short_code<S: BoardStore + ?Sized>(
    store: &S,
    forum_name: &str,
    category_id: &CategoryId,
    exclude: Option<&ForumId>,
) -> Result<String> {
    let base = normalize(forum_name);
    if base.is_empty() {
        return Err(BoardError::validation(format!(
            "Forum name {:?} has no characters usable in a short code",
            forum_name
        )));
    }

    let prefix = category_prefix(store, category_id)?;

    let conflicts: Vec<Forum> = store
        .find_forums_by_short_code(&base)
        .map_err(generation_failed)?
        .into_iter()
        .filter(|f| Some(&f.id) != exclude)
        .collect();

    if conflicts.is_empty() {
        debug!(code = %base, "short_code: base code is free");
        return Ok(base);
    }

    let same_category = conflicts.iter().any(|f| &f.category_id == category_id);

    // A category prefix cannot separate two forums of the same category.
    if !same_category {
        if let Some(prefix) = prefix.as_deref() {
            let prefixed = format!("{}{}{}", prefix, SEPARATOR, base);
            if is_free(store, &prefixed, exclude)? {
                debug!(code = %prefixed, "short_code: using category prefix");
                return Ok(prefixed);
            }
        }
    }

    let stem = match prefix.as_deref() {
        Some(prefix) => format!("{}{}{}", prefix, SEPARATOR, base),
        None => base,
    };

    let mut counter: u64 = 1;
    loop {
        let candidate = format!("{}{}{}", stem, SEPARATOR, counter);
        if is_free(store, &candidate, exclude)? {
            debug!(
                code = %candidate,
                candidates = counter,
                same_category,
                "short_code: using numeric suffix"
            );
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Normalized name of the category, if it exists and normalizes to
/// something non-empty.
fn category_prefix<S: BoardStore + ?Sized>(
    store: &S,
    category_id: &CategoryId,
) -> Result<Option<String>> {
    match store
        .find_category_by_id(category_id)
        .map_err(generation_failed)?
    {
        Some(category) => {
            let prefix = normalize(&category.name);
            Ok((!prefix.is_empty()).then_some(prefix))
        }
        None => {
            warn!(
                category = %category_id,
                "short_code: category not found, resolving without prefix"
            );
            Ok(None)
        }
    }
}

fn is_free<S: BoardStore + ?Sized>(
    store: &S,
    code: &str,
    exclude: Option<&ForumId>,
) -> Result<bool> {
    let holders = store
        .find_forums_by_short_code(code)
        .map_err(generation_failed)?;
    Ok(holders.iter().all(|f| Some(&f.id) == exclude))
}

fn generation_failed(err: BoardError) -> BoardError {
    BoardError::short_code(format!("could not generate identifier: {}", err))
}

/// Returns the identifier to use in URLs: the short code when set and
/// non-empty, otherwise the raw forum id.
pub fn url_identifier(forum: &Forum) -> String {
    match forum.short_code.as_deref() {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => forum.id.to_string(),
    }
}

/// Returns true if `s` has the shape of a canonical forum id: the
/// 36-character hyphenated UUID form, hex digits in either case.
pub fn is_canonical_identifier(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == CANONICAL_ID_LENGTH
        && bytes.iter().enumerate().all(|(i, b)| {
            if CANONICAL_ID_HYPHENS.contains(&i) {
                *b == b'-'
            } else {
                b.is_ascii_hexdigit()
            }
        })
}

/// Finds a forum by short code or raw id.
///
/// Identifiers shaped like a canonical id are only ever looked up by id,
/// even if some forum's short code happens to equal the same text. Anything
/// else is tried as a short code first and then as an id, so old links that
/// embed an id in another accepted UUID form keep working.
pub fn find_forum_by_identifier<S: BoardStore + ?Sized>(
    store: &S,
    identifier: &str,
) -> Result<Option<Forum>> {
    if !is_canonical_identifier(identifier) {
        if let Some(forum) = store.find_forums_by_short_code(identifier)?.into_iter().next() {
            return Ok(Some(forum));
        }
    }

    match ForumId::parse(identifier) {
        Ok(id) => store.find_forum_by_id(&id),
        Err(_) => Ok(None),
    }
}
