//! Property tests for short code normalization and resolution.
//!
//! Inputs are generated randomly from alphabets weighted towards the
//! characters the normalizer treats specially.

use bbforum::board::{
    find_forum_by_identifier, normalize, resolve_short_code, BoardStore, Category, Forum,
    MemoryStore,
};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

const ALPHABET: &[char] = &[
    'a', 'Z', 'q', '0', '7', ' ', '\t', '\n', '-', '_', '!', '.', '\'', 'é', 'ß', 'İ', '日', '\u{feff}',
    '\u{a0}',
];

fn random_name(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..40);
    (0..len)
        .map(|_| *ALPHABET.choose(rng).unwrap_or(&'a'))
        .collect()
}

/// Property: output only uses [a-z0-9_] and has no stray separators
#[test]
fn property_normalize_output_shape() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..2000 {
        let name = random_name(&mut rng);
        let code = normalize(&name);

        assert!(
            code.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
            "bad character in {:?} from {:?}",
            code,
            name
        );
        assert!(!code.starts_with('_'), "leading underscore from {:?}", name);
        assert!(!code.ends_with('_'), "trailing underscore from {:?}", name);
        assert!(!code.contains("__"), "doubled underscore from {:?}", name);
    }
}

/// Property: normalize(normalize(s)) == normalize(s)
#[test]
fn property_normalize_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..2000 {
        let name = random_name(&mut rng);
        let once = normalize(&name);
        assert_eq!(normalize(&once), once, "not idempotent for {:?}", name);
    }
}

/// Property: case and surrounding whitespace never change the code
#[test]
fn property_normalize_ignores_case_and_padding() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let name: String = (0..rng.gen_range(1..20))
            .map(|_| *['a', 'B', 'c', '1', ' ', '-'].choose(&mut rng).unwrap_or(&'a'))
            .collect();
        let padded = format!("  \t{}  ", name.to_uppercase());
        assert_eq!(normalize(&padded), normalize(&name));
    }
}

/// Property: resolving and storing many similar names never yields a
/// duplicate, and every stored code finds its own forum again
#[test]
fn property_resolved_codes_are_unique() {
    let mut rng = StdRng::seed_from_u64(1234);
    let store = MemoryStore::new();

    let categories: Vec<Category> = ["Music", "Gaming", "Off Topic", "!!!"]
        .iter()
        .map(|name| {
            let category = Category::new(name, None, 0).unwrap();
            store.insert_category(&category).unwrap();
            category
        })
        .collect();
    let names = ["General", "general", "GENERAL!", "Off-Topic", "music general", "Chat"];

    let mut forums = Vec::new();
    for _ in 0..60 {
        let category = categories.choose(&mut rng).unwrap();
        let name = names.choose(&mut rng).unwrap();

        let code = resolve_short_code(&store, name, &category.id, None).unwrap();
        let mut forum = Forum::new(category.id, name, None, 0).unwrap();
        forum.short_code = Some(code);
        store.insert_forum(&forum).unwrap();
        forums.push(forum);
    }

    let mut codes: Vec<&str> = forums
        .iter()
        .filter_map(|f| f.short_code.as_deref())
        .collect();
    codes.sort_unstable();
    let before = codes.len();
    codes.dedup();
    assert_eq!(codes.len(), before, "duplicate short code resolved");

    for forum in &forums {
        let code = forum.short_code.as_deref().unwrap();
        let found = find_forum_by_identifier(&store, code).unwrap();
        assert_eq!(found.map(|f| f.id), Some(forum.id));
    }
}
