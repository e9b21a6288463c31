//! Unit tests: owning auto-growing context.

use lite3::{Error, Lite3Ctx, TypeTag, CONTEXT_BUF_SIZE_MIN, NODE_SIZE};

// ─────────────────────────────────────────────────────────────────────────────
// Construction
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn new_context_has_minimum_capacity() {
    let ctx = Lite3Ctx::new();
    assert_eq!(ctx.capacity(), CONTEXT_BUF_SIZE_MIN);
    assert_eq!(ctx.len(), 0);
    assert!(ctx.is_empty());
}

#[test]
fn small_size_requests_are_clamped_up() {
    let ctx = Lite3Ctx::with_size(16).unwrap();
    assert!(ctx.capacity() >= CONTEXT_BUF_SIZE_MIN);
}

#[test]
fn oversized_request_is_rejected() {
    assert_eq!(
        Lite3Ctx::with_size(lite3::BUF_SIZE_MAX + 1).unwrap_err(),
        Error::InvalidArgument
    );
}

#[test]
fn from_bytes_copies_a_message() {
    let mut src = Lite3Ctx::new();
    src.init_obj().unwrap();
    src.set_i64(0, "x", 42).unwrap();

    let ctx = Lite3Ctx::from_bytes(src.as_bytes()).unwrap();
    assert_eq!(ctx.get_i64(0, "x").unwrap(), 42);
    assert_eq!(ctx.len(), src.len());
    assert!(ctx.capacity().is_power_of_two() || ctx.capacity() == CONTEXT_BUF_SIZE_MIN);
}

#[test]
fn from_empty_bytes_is_invalid_argument() {
    assert_eq!(Lite3Ctx::from_bytes(&[]).unwrap_err(), Error::InvalidArgument);
}

// ─────────────────────────────────────────────────────────────────────────────
// Auto-grow
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn grow_is_transparent_and_quadruples() {
    let mut ctx = Lite3Ctx::new();
    ctx.init_obj().unwrap();
    assert_eq!(ctx.capacity(), 1024);

    let filler = "x".repeat(200);
    let mut inserted = 0u32;
    while ctx.capacity() == 1024 {
        ctx.set_str(0, &format!("k{inserted}"), &filler).unwrap();
        inserted += 1;
        assert!(inserted < 100, "grow never triggered");
    }
    assert_eq!(ctx.capacity(), 4096);
    assert_eq!(ctx.count(0).unwrap(), inserted);
    for i in 0..inserted {
        let s = ctx.get_str(0, &format!("k{i}")).unwrap();
        assert_eq!(s.resolve(ctx.as_bytes()), Some(filler.as_str()));
    }
}

#[test]
fn repeated_growth_keeps_everything_readable() {
    let mut ctx = Lite3Ctx::new();
    ctx.init_arr().unwrap();
    let filler = "y".repeat(500);
    for _ in 0..200 {
        ctx.arr_append_str(0, &filler).unwrap();
    }
    assert!(ctx.capacity() >= 64 * 1024);
    assert_eq!(ctx.count(0).unwrap(), 200);
    for i in 0..200 {
        let s = ctx.arr_get_str(0, i).unwrap();
        assert_eq!(s.resolve(ctx.as_bytes()), Some(filler.as_str()));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Import / export
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn export_feeds_the_buffer_api() {
    let mut ctx = Lite3Ctx::new();
    ctx.init_obj().unwrap();
    ctx.set_str(0, "title", "exported").unwrap();

    // The exported image is directly readable by the buffer API.
    let image = ctx.as_bytes().to_vec();
    let mut words = vec![0u32; image.len().div_ceil(4)];
    // SAFETY: word-backed scratch keeps the copy 4-byte aligned.
    let buf = unsafe {
        std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut u8, words.len() * 4)
    };
    buf[..image.len()].copy_from_slice(&image);
    let s = lite3::buffer::get_str(buf, image.len(), 0, "title").unwrap();
    assert_eq!(s.resolve(buf), Some("exported"));
}

#[test]
fn import_reuses_capacity_when_possible() {
    let mut src = Lite3Ctx::new();
    src.init_obj().unwrap();
    src.set_i64(0, "n", 1).unwrap();

    let mut ctx = Lite3Ctx::with_size(64 * 1024).unwrap();
    let cap_before = ctx.capacity();
    ctx.import_from_bytes(src.as_bytes()).unwrap();
    assert_eq!(ctx.capacity(), cap_before, "no reallocation needed");
    assert_eq!(ctx.get_i64(0, "n").unwrap(), 1);
}

#[test]
fn import_grows_when_needed() {
    let mut src = Lite3Ctx::new();
    src.init_arr().unwrap();
    let filler = "z".repeat(100);
    for _ in 0..50 {
        src.arr_append_str(0, &filler).unwrap();
    }

    let mut ctx = Lite3Ctx::new();
    ctx.import_from_bytes(src.as_bytes()).unwrap();
    assert!(ctx.capacity() >= src.len());
    assert_eq!(ctx.count(0).unwrap(), 50);
}

// ─────────────────────────────────────────────────────────────────────────────
// Mirror surface
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn context_mirrors_the_buffer_operations() {
    let mut ctx = Lite3Ctx::new();
    ctx.init_obj().unwrap();
    ctx.set_bool(0, "flag", true).unwrap();
    ctx.set_null(0, "nothing").unwrap();
    ctx.set_f64(0, "ratio", 0.25).unwrap();
    ctx.set_bytes(0, "raw", &[1, 2]).unwrap();
    let inner = ctx.set_obj(0, "inner").unwrap();
    ctx.set_i64(inner, "depth", 1).unwrap();
    let list = ctx.set_arr(0, "list").unwrap();
    ctx.arr_append_i64(list, 10).unwrap();
    ctx.arr_append_i64(list, 20).unwrap();

    assert!(ctx.get_bool(0, "flag").unwrap());
    assert!(ctx.is_null(0, "nothing"));
    assert_eq!(ctx.get_f64(0, "ratio").unwrap(), 0.25);
    assert_eq!(ctx.get_type(0, "raw").unwrap(), TypeTag::Bytes);
    assert_eq!(ctx.get_type_size(0, "raw").unwrap(), 2);
    assert_eq!(ctx.get_obj(0, "inner").unwrap(), inner);
    assert_eq!(ctx.get_i64(inner, "depth").unwrap(), 1);
    assert_eq!(ctx.get_arr(0, "list").unwrap(), list);
    assert_eq!(ctx.arr_get_i64(list, 1).unwrap(), 20);
    assert_eq!(ctx.count(0).unwrap(), 6);
    assert_eq!(ctx.root_type().unwrap(), TypeTag::Object);
    assert!(ctx.exists(0, "flag"));
    assert!(!ctx.exists(0, "absent"));

    let mut it = ctx.iter_create(0).unwrap();
    let mut n = 0;
    while ctx.iter_next(&mut it).unwrap().is_some() {
        n += 1;
    }
    assert_eq!(n, 6);
}

#[test]
fn operations_before_init_fail_cleanly() {
    let mut ctx = Lite3Ctx::new();
    assert_eq!(ctx.set_i64(0, "k", 1).unwrap_err(), Error::InvalidArgument);
    assert_eq!(ctx.count(0).unwrap_err(), Error::InvalidArgument);
}

#[test]
fn reset_after_use() {
    let mut ctx = Lite3Ctx::new();
    ctx.init_obj().unwrap();
    ctx.set_i64(0, "a", 1).unwrap();
    ctx.init_arr().unwrap();
    assert_eq!(ctx.root_type().unwrap(), TypeTag::Array);
    assert_eq!(ctx.count(0).unwrap(), 0);
    assert_eq!(ctx.len(), NODE_SIZE);
}
