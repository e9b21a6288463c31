//! Feed arbitrary bytes to every read path as an untrusted buffer.
//! Any outcome is acceptable except a panic or unbounded loop.
#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Copy into 4-byte-aligned storage; misalignment is rejected up front
    // and uninteresting to fuzz.
    let mut words = vec![0u32; data.len().div_ceil(4).max(1)];
    let buf = unsafe {
        std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut u8, words.len() * 4)
    };
    buf[..data.len()].copy_from_slice(data);
    let buflen = data.len();

    let _ = lite3::root_type(buf, buflen);
    let _ = lite3::count(buf, buflen, 0);
    let _ = lite3::buffer::get(buf, buflen, 0, "key");
    let _ = lite3::buffer::arr_get_i64(buf, buflen, 0, 0);
    if let Ok(mut it) = lite3::iter_create(buf, buflen, 0) {
        while let Ok(Some(item)) = lite3::iter_next(buf, buflen, &mut it) {
            let _ = lite3::value::val_type(buf, buflen, item.val_ofs);
            if let Some(key) = item.key {
                let _ = key.resolve(buf);
            }
        }
    }

    // Mutations on the hostile image must also stay bounded.
    let mut len = buflen;
    let _ = lite3::buffer::set_i64(buf, &mut len, 0, "key", 1);
});
