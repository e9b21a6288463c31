//! E2E Suite: whole-document scenarios through both API layers.
//!
//! - Basic object round-trip (book record)
//! - Array overwrite (animal list)
//! - Auto-grow under sustained insertion
//! - Deeply structured person record across nested containers
//! - Fill-byte determinism of padding under the default build

extern crate lite3;

use lite3::buffer::{
    arr_append_str, arr_get_str, arr_set_str, get_f64, get_str, set_bool, set_f64, set_i64,
    set_null, set_str,
};
use lite3::{count, exists, init_arr, init_obj, Lite3Ctx, TypeTag};

/// 4-byte-aligned scratch buffer for the buffer API.
fn aligned(words: &mut Vec<u32>) -> &mut [u8] {
    // SAFETY: a u32 is four initialized bytes; the slice borrows the Vec.
    unsafe { std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut u8, words.len() * 4) }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: basic object round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn book_record_roundtrip() {
    let mut backing = vec![0u32; 16 * 1024 / 4];
    let buf = aligned(&mut backing);
    let mut buflen = 0;

    init_obj(buf, &mut buflen).unwrap();
    set_str(buf, &mut buflen, 0, "title", "C Programming").unwrap();
    set_f64(buf, &mut buflen, 0, "price", 60.30).unwrap();
    set_i64(buf, &mut buflen, 0, "pages", 272).unwrap();
    set_bool(buf, &mut buflen, 0, "in_stock", true).unwrap();
    set_null(buf, &mut buflen, 0, "reviews").unwrap();

    assert_eq!(count(buf, buflen, 0).unwrap(), 5);
    assert_eq!(
        get_str(buf, buflen, 0, "title").unwrap().resolve(buf),
        Some("C Programming")
    );
    assert_eq!(get_f64(buf, buflen, 0, "price").unwrap(), 60.30);
    assert_eq!(lite3::buffer::get_i64(buf, buflen, 0, "pages").unwrap(), 272);
    assert!(lite3::buffer::get_bool(buf, buflen, 0, "in_stock").unwrap());
    assert!(lite3::buffer::is_null(buf, buflen, 0, "reviews"));
    assert!(!exists(buf, buflen, 0, "isbn"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: array overwrite
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn animal_list_overwrite() {
    let mut backing = vec![0u32; 16 * 1024 / 4];
    let buf = aligned(&mut backing);
    let mut buflen = 0;

    init_arr(buf, &mut buflen).unwrap();
    for animal in ["zebra", "giraffe", "buffalo", "lion", "rhino", "elephant"] {
        arr_append_str(buf, &mut buflen, 0, animal).unwrap();
    }
    assert_eq!(count(buf, buflen, 0).unwrap(), 6);
    assert_eq!(
        arr_get_str(buf, buflen, 0, 2).unwrap().resolve(buf),
        Some("buffalo")
    );

    arr_set_str(buf, &mut buflen, 0, 2, "gnu").unwrap();
    assert_eq!(
        arr_get_str(buf, buflen, 0, 2).unwrap().resolve(buf),
        Some("gnu")
    );
    assert_eq!(count(buf, buflen, 0).unwrap(), 6);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: auto-grow
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn context_grows_through_sustained_insertion() {
    let mut ctx = Lite3Ctx::new();
    ctx.init_obj().unwrap();
    assert_eq!(ctx.capacity(), 1024);

    let value = "sustained insertion payload ".repeat(4);
    let total = 300u32;
    for i in 0..total {
        ctx.set_str(0, &format!("field_{i:04}"), &value).unwrap();
    }
    assert!(ctx.capacity() > 1024, "growth must have happened");
    assert_eq!(ctx.count(0).unwrap(), total);
    for i in 0..total {
        let s = ctx.get_str(0, &format!("field_{i:04}")).unwrap();
        assert_eq!(s.resolve(ctx.as_bytes()), Some(value.as_str()));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: structured person record
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn person_record_with_nested_containers() {
    let mut ctx = Lite3Ctx::new();
    ctx.init_obj().unwrap();
    ctx.set_str(0, "first_name", "John").unwrap();
    ctx.set_str(0, "last_name", "Doe").unwrap();
    ctx.set_i64(0, "age", 30).unwrap();
    ctx.set_bool(0, "is_employed", true).unwrap();

    let address = ctx.set_obj(0, "address").unwrap();
    ctx.set_str(address, "street", "Main Street 1").unwrap();
    ctx.set_str(address, "city", "Springfield").unwrap();
    ctx.set_str(address, "postal_code", "12345").unwrap();

    let phones = ctx.set_arr(0, "phone_numbers").unwrap();
    ctx.arr_append_str(phones, "+1-202-555-0100").unwrap();
    ctx.arr_append_str(phones, "+1-202-555-0199").unwrap();

    let grades = ctx.set_arr(0, "grades").unwrap();
    for g in [8i64, 7, 9, 10] {
        ctx.arr_append_i64(grades, g).unwrap();
    }

    // Re-resolve the child offsets through getters and verify content.
    let address2 = ctx.get_obj(0, "address").unwrap();
    assert_eq!(address2, address);
    assert_eq!(
        ctx.get_str(address2, "city").unwrap().resolve(ctx.as_bytes()),
        Some("Springfield")
    );
    let phones2 = ctx.get_arr(0, "phone_numbers").unwrap();
    assert_eq!(ctx.count(phones2).unwrap(), 2);
    assert_eq!(
        ctx.arr_get_str(phones2, 1).unwrap().resolve(ctx.as_bytes()),
        Some("+1-202-555-0199")
    );
    assert_eq!(ctx.count(grades).unwrap(), 4);
    assert_eq!(ctx.arr_get_i64(grades, 3).unwrap(), 10);
    assert_eq!(ctx.count(0).unwrap(), 7);

    // The whole record survives an export/import cycle.
    let image = ctx.as_bytes().to_vec();
    let copy = Lite3Ctx::from_bytes(&image).unwrap();
    assert_eq!(copy.get_i64(0, "age").unwrap(), 30);
    let addr3 = copy.get_obj(0, "address").unwrap();
    assert_eq!(
        copy.get_str(addr3, "street").unwrap().resolve(copy.as_bytes()),
        Some("Main Street 1")
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: deterministic padding under the default build
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(feature = "zero-extra", not(feature = "debug-print")))]
#[test]
fn alignment_padding_is_zero_filled() {
    let mut backing = vec![0u32; 16 * 1024 / 4];
    // Poison the scratch area so stale bytes would be visible.
    backing.iter_mut().for_each(|w| *w = 0xAAAA_AAAA);
    let buf = aligned(&mut backing);
    let mut buflen = 0;

    init_obj(buf, &mut buflen).unwrap();
    // Odd-length string payload forces padding before the nested node.
    set_str(buf, &mut buflen, 0, "pad", "abc").unwrap();
    let before_child = buflen;
    let child = lite3::buffer::set_obj(buf, &mut buflen, 0, "child").unwrap();
    assert_eq!(child % 4, 0);

    // Every byte between the recorded end and the child's key record must
    // be the fill byte, never leftover scratch garbage.
    let key_record = child - ("child".len() + 1) - 1;
    for (i, &b) in buf[before_child..key_record].iter().enumerate() {
        assert_eq!(b, 0x00, "padding byte {i} not zero-filled");
    }
}

#[test]
fn root_and_nested_types_are_consistent() {
    let mut ctx = Lite3Ctx::new();
    ctx.init_obj().unwrap();
    let arr = ctx.set_arr(0, "list").unwrap();
    let obj = ctx.arr_append_obj(arr).unwrap();
    ctx.set_str(obj, "leaf", "deep").unwrap();

    assert_eq!(ctx.root_type().unwrap(), TypeTag::Object);
    assert_eq!(ctx.get_type(0, "list").unwrap(), TypeTag::Array);
    assert_eq!(ctx.arr_get_type(arr, 0).unwrap(), TypeTag::Object);
    assert_eq!(ctx.get_type(obj, "leaf").unwrap(), TypeTag::Str);
}
