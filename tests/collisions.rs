//! Unit tests: hash-collision tolerance via quadratic probing.
//!
//! "Aa" and "B@" are equal-length keys with identical DJB2 hashes
//! (33·'A' + 'a' == 33·'B' + '@'), and concatenating such pairs yields
//! arbitrarily large families of equal-hash keys.

use lite3::buffer::{get_str, set_i64, set_str};
use lite3::{count, exists, init_obj, key_hash, Error};

/// 4-byte-aligned scratch buffer for the buffer API.
fn aligned(words: &mut Vec<u32>) -> &mut [u8] {
    // SAFETY: a u32 is four initialized bytes; the slice borrows the Vec.
    unsafe { std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut u8, words.len() * 4) }
}

/// All 2^n concatenations of the colliding pair, each sharing one hash.
fn colliding_family(pairs: usize) -> Vec<String> {
    let mut keys = vec![String::new()];
    for _ in 0..pairs {
        let mut next = Vec::with_capacity(keys.len() * 2);
        for k in &keys {
            next.push(format!("{k}Aa"));
            next.push(format!("{k}B@"));
        }
        keys = next;
    }
    keys
}

// ─────────────────────────────────────────────────────────────────────────────
// Pairwise collision
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn colliding_pair_stores_distinct_values() {
    assert_eq!(key_hash("Aa"), key_hash("B@"));

    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_str(buf, &mut buflen, 0, "Aa", "first").unwrap();
    set_str(buf, &mut buflen, 0, "B@", "second").unwrap();

    assert_eq!(
        get_str(buf, buflen, 0, "Aa").unwrap().resolve(buf),
        Some("first")
    );
    assert_eq!(
        get_str(buf, buflen, 0, "B@").unwrap().resolve(buf),
        Some("second")
    );
    assert_eq!(count(buf, buflen, 0).unwrap(), 2);
}

#[test]
fn colliding_key_overwrite_targets_the_right_entry() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_i64(buf, &mut buflen, 0, "Aa", 1).unwrap();
    set_i64(buf, &mut buflen, 0, "B@", 2).unwrap();
    set_i64(buf, &mut buflen, 0, "B@", 22).unwrap();
    assert_eq!(lite3::buffer::get_i64(buf, buflen, 0, "Aa").unwrap(), 1);
    assert_eq!(lite3::buffer::get_i64(buf, buflen, 0, "B@").unwrap(), 22);
    assert_eq!(count(buf, buflen, 0).unwrap(), 2);
}

// ─────────────────────────────────────────────────────────────────────────────
// Collision storms
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn sixteen_way_collision_family_is_fully_retrievable() {
    let keys = colliding_family(4); // 16 keys, one shared hash
    let h = key_hash(&keys[0]);
    for k in &keys {
        assert_eq!(key_hash(k), h);
    }

    let mut backing = vec![0u32; 64 * 1024 / 4];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    for (i, k) in keys.iter().enumerate() {
        set_i64(buf, &mut buflen, 0, k, i as i64).unwrap();
    }
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(lite3::buffer::get_i64(buf, buflen, 0, k).unwrap(), i as i64);
    }
    assert_eq!(count(buf, buflen, 0).unwrap(), keys.len() as u32);
}

#[test]
fn probe_limit_boundary() {
    // 2^8 = 256 keys sharing a hash; only 128 probe positions exist.
    let keys = colliding_family(8);

    let mut backing = vec![0u32; 256 * 1024 / 4];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    for k in keys.iter().take(128) {
        set_i64(buf, &mut buflen, 0, k, 1).unwrap();
    }
    // The 129th equal-hash key exhausts every probe position.
    assert_eq!(
        set_i64(buf, &mut buflen, 0, &keys[128], 1),
        Err(Error::InvalidArgument)
    );
    // Lookups of the stored 128 still succeed; an absent equal-hash key
    // reports probe exhaustion rather than plain absence.
    for k in keys.iter().take(128) {
        assert!(exists(buf, buflen, 0, k));
    }
    assert_eq!(
        lite3::buffer::get(buf, buflen, 0, &keys[129]),
        Err(Error::InvalidArgument)
    );
}

#[test]
fn non_colliding_lookup_misses_are_not_found() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_i64(buf, &mut buflen, 0, "Aa", 1).unwrap();
    // Different hash entirely: plain NotFound, no probe exhaustion.
    assert_eq!(
        lite3::buffer::get(buf, buflen, 0, "zz"),
        Err(Error::NotFound)
    );
}
