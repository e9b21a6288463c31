//! Decode arbitrary text as JSON into a context, then re-encode whatever
//! was accepted. Neither direction may panic.
#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let mut ctx = lite3::Lite3Ctx::new();
    if ctx.json_dec(text).is_ok() {
        let _ = ctx.json_enc(0);
        let _ = ctx.json_enc_pretty(0);
    }
});
