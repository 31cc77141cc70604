//! Short code resolution and identifier lookup tests.
//!
//! These run the resolver against the in-memory store with hand-placed
//! short codes, plus a store whose reads always fail.

use bbforum::board::{
    find_forum_by_identifier, normalize, resolve_short_code, url_identifier, BoardStore, Category,
    CategoryId, Forum, ForumId, MemoryStore, Post, Thread, ThreadId, UserId, UserProfile,
};
use bbforum::{BoardError, Result};

/// Helper to create and store a category.
fn seed_category(store: &MemoryStore, name: &str) -> Category {
    let category = Category::new(name, None, 0).expect("valid category");
    store.insert_category(&category).expect("insert category");
    category
}

/// Helper to store a forum holding an explicit short code.
fn seed_forum(store: &MemoryStore, category: &Category, name: &str, code: &str) -> Forum {
    let mut forum = Forum::new(category.id, name, None, 0).expect("valid forum");
    forum.short_code = Some(code.to_string());
    store.insert_forum(&forum).expect("insert forum");
    forum
}

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn test_normalize_documented_examples() {
    assert_eq!(normalize("Forum Title"), "forum_title");
    assert_eq!(normalize("Hello---World!!"), "hello_world");
    assert_eq!(normalize("   ___Mixed_Case-123   "), "mixed_case_123");
}

#[test]
fn test_normalize_degenerate_names() {
    assert_eq!(normalize(""), "");
    assert_eq!(normalize("   "), "");
    assert_eq!(normalize("!!!"), "");
    assert_eq!(normalize("--__--"), "");
    assert_eq!(normalize("日本語"), "");
}

#[test]
fn test_normalize_drops_punctuation_without_separating() {
    assert_eq!(normalize("C++ & Rust"), "c_rust");
    assert_eq!(normalize("don't panic"), "dont_panic");
    assert_eq!(normalize("Café Talk"), "caf_talk");
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_free_base_is_returned_as_is() {
    let store = MemoryStore::new();
    let music = seed_category(&store, "Music");

    let code = resolve_short_code(&store, "General Chat", &music.id, None).unwrap();
    assert_eq!(code, "general_chat");
}

#[test]
fn test_cross_category_conflict_uses_prefix() {
    let store = MemoryStore::new();
    let gaming = seed_category(&store, "Gaming");
    let music = seed_category(&store, "Music");
    seed_forum(&store, &gaming, "General", "general");

    let code = resolve_short_code(&store, "General", &music.id, None).unwrap();
    assert_eq!(code, "music_general");
}

#[test]
fn test_same_category_conflict_uses_suffix() {
    let store = MemoryStore::new();
    // Normalizes to nothing, so there is no prefix to add.
    let unnamed = seed_category(&store, "***");
    seed_forum(&store, &unnamed, "General", "general");

    let code = resolve_short_code(&store, "General", &unnamed.id, None).unwrap();
    assert_eq!(code, "general_1");
}

#[test]
fn test_same_category_conflict_ignores_free_prefix() {
    let store = MemoryStore::new();
    let music = seed_category(&store, "Music");
    let gaming = seed_category(&store, "Gaming");
    seed_forum(&store, &music, "General", "general");
    seed_forum(&store, &gaming, "General", "gaming_general");

    // `music_general` is free, but a prefix cannot separate forums of the
    // same category.
    let code = resolve_short_code(&store, "General", &music.id, None).unwrap();
    assert_eq!(code, "music_general_1");
}

#[test]
fn test_suffix_counts_up_past_taken_codes() {
    let store = MemoryStore::new();
    let gaming = seed_category(&store, "Gaming");
    let music = seed_category(&store, "Music");
    seed_forum(&store, &gaming, "General", "general");
    seed_forum(&store, &gaming, "Other", "music_general");
    seed_forum(&store, &gaming, "Another", "music_general_1");

    let code = resolve_short_code(&store, "General", &music.id, None).unwrap();
    assert_eq!(code, "music_general_2");
}

#[test]
fn test_missing_category_resolves_without_prefix() {
    let store = MemoryStore::new();
    let gaming = seed_category(&store, "Gaming");
    seed_forum(&store, &gaming, "General", "general");
    seed_forum(&store, &gaming, "General Two", "general_1");

    let code = resolve_short_code(&store, "General", &CategoryId::new(), None).unwrap();
    assert_eq!(code, "general_2");
}

#[test]
fn test_self_exclusion_keeps_own_code() {
    let store = MemoryStore::new();
    let music = seed_category(&store, "Music");
    let forum = seed_forum(&store, &music, "General", "general");

    let code = resolve_short_code(&store, "General", &music.id, Some(&forum.id)).unwrap();
    assert_eq!(code, "general");

    // Without the exclusion the forum collides with itself.
    let code = resolve_short_code(&store, "General", &music.id, None).unwrap();
    assert_eq!(code, "music_general_1");
}

#[test]
fn test_empty_base_is_rejected() {
    let store = MemoryStore::new();
    let music = seed_category(&store, "Music");

    let err = resolve_short_code(&store, "?!", &music.id, None).unwrap_err();
    assert!(matches!(err, BoardError::Validation(_)));
}

#[test]
fn test_resolution_does_not_write() {
    let store = MemoryStore::new();
    let music = seed_category(&store, "Music");

    resolve_short_code(&store, "General", &music.id, None).unwrap();
    resolve_short_code(&store, "General", &music.id, None).unwrap();
    assert!(store.find_forums_by_short_code("general").unwrap().is_empty());
    assert!(store.list_forums_in_category(&music.id).unwrap().is_empty());
}

// =============================================================================
// Store failures
// =============================================================================

/// A store that fails every read.
struct UnavailableStore;

fn unavailable<T>() -> Result<T> {
    Err(BoardError::storage("connection refused"))
}

impl BoardStore for UnavailableStore {
    fn insert_category(&self, _: &Category) -> Result<()> {
        unavailable()
    }
    fn find_category_by_id(&self, _: &CategoryId) -> Result<Option<Category>> {
        unavailable()
    }
    fn list_categories(&self) -> Result<Vec<Category>> {
        unavailable()
    }
    fn delete_category(&self, _: &CategoryId) -> Result<()> {
        unavailable()
    }
    fn insert_forum(&self, _: &Forum) -> Result<()> {
        unavailable()
    }
    fn update_forum(&self, _: &Forum) -> Result<()> {
        unavailable()
    }
    fn find_forum_by_id(&self, _: &ForumId) -> Result<Option<Forum>> {
        unavailable()
    }
    fn find_forums_by_short_code(&self, _: &str) -> Result<Vec<Forum>> {
        unavailable()
    }
    fn list_forums_in_category(&self, _: &CategoryId) -> Result<Vec<Forum>> {
        unavailable()
    }
    fn delete_forum(&self, _: &ForumId) -> Result<()> {
        unavailable()
    }
    fn insert_thread(&self, _: &Thread, _: &Post) -> Result<()> {
        unavailable()
    }
    fn find_thread_by_id(&self, _: &ThreadId) -> Result<Option<Thread>> {
        unavailable()
    }
    fn list_threads_in_forum(&self, _: &ForumId) -> Result<Vec<Thread>> {
        unavailable()
    }
    fn modify_thread(
        &self,
        _: &ThreadId,
        _: &mut dyn FnMut(&mut Thread),
    ) -> Result<Option<Thread>> {
        unavailable()
    }
    fn delete_thread(&self, _: &ThreadId) -> Result<usize> {
        unavailable()
    }
    fn insert_post(&self, _: &Post) -> Result<()> {
        unavailable()
    }
    fn list_posts_in_thread(&self, _: &ThreadId) -> Result<Vec<Post>> {
        unavailable()
    }
    fn insert_user(&self, _: &UserProfile) -> Result<()> {
        unavailable()
    }
    fn find_user_by_id(&self, _: &UserId) -> Result<Option<UserProfile>> {
        unavailable()
    }
    fn find_user_by_username(&self, _: &str) -> Result<Option<UserProfile>> {
        unavailable()
    }
}

#[test]
fn test_store_failure_surfaces_as_generation_error() {
    let err = resolve_short_code(&UnavailableStore, "General", &CategoryId::new(), None)
        .unwrap_err();
    match err {
        BoardError::ShortCode(msg) => {
            assert!(msg.contains("could not generate identifier"));
            assert!(msg.contains("connection refused"));
        }
        other => panic!("expected short code error, got {:?}", other),
    }
}

#[test]
fn test_store_failure_propagates_from_lookup() {
    assert!(find_forum_by_identifier(&UnavailableStore, "general").is_err());
}

// =============================================================================
// Identifier selection and lookup
// =============================================================================

#[test]
fn test_url_identifier_prefers_short_code() {
    let store = MemoryStore::new();
    let music = seed_category(&store, "Music");
    let coded = seed_forum(&store, &music, "General", "general");
    assert_eq!(url_identifier(&coded), "general");

    let mut uncoded = Forum::new(music.id, "???", None, 0).unwrap();
    assert_eq!(url_identifier(&uncoded), uncoded.id.to_string());

    uncoded.short_code = Some(String::new());
    assert_eq!(url_identifier(&uncoded), uncoded.id.to_string());
}

#[test]
fn test_lookup_by_code_and_by_id() {
    let store = MemoryStore::new();
    let music = seed_category(&store, "Music");
    let forum = seed_forum(&store, &music, "General", "general");

    let by_code = find_forum_by_identifier(&store, "general").unwrap();
    assert_eq!(by_code.map(|f| f.id), Some(forum.id));

    let by_id = find_forum_by_identifier(&store, &forum.id.to_string()).unwrap();
    assert_eq!(by_id.map(|f| f.id), Some(forum.id));

    let upper = forum.id.to_string().to_uppercase();
    let by_upper_id = find_forum_by_identifier(&store, &upper).unwrap();
    assert_eq!(by_upper_id.map(|f| f.id), Some(forum.id));

    assert!(find_forum_by_identifier(&store, "nothing_here").unwrap().is_none());
    assert!(find_forum_by_identifier(&store, "").unwrap().is_none());
}

#[test]
fn test_canonical_shaped_identifier_never_matches_short_code() {
    let store = MemoryStore::new();
    let music = seed_category(&store, "Music");
    let target = seed_forum(&store, &music, "Target", "target");

    // A forum whose short code looks like another forum's id.
    let decoy_code = ForumId::new().to_string();
    seed_forum(&store, &music, "Decoy", &decoy_code);
    assert!(find_forum_by_identifier(&store, &decoy_code).unwrap().is_none());

    let impostor = seed_forum(&store, &music, "Impostor", "impostor");
    let mut lying = impostor.clone();
    lying.short_code = Some(target.id.to_string());
    store.update_forum(&lying).unwrap();

    let found = find_forum_by_identifier(&store, &target.id.to_string()).unwrap();
    assert_eq!(found.map(|f| f.id), Some(target.id));
}
