//! Raw buffer dump (feature `debug-print`).
//!
//! Renders the used portion of a buffer byte by byte: printable ASCII as
//! the character itself, everything else as two hex digits, grouped in
//! 4-byte words with a running offset every 64 bytes. With the `zero-extra`
//! fill byte switched to `_` under this feature, node boundaries and dead
//! regions stand out.

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Renders `buf[..buflen]` as a word-grouped hex/ASCII listing.
pub fn dump(buf: &[u8], buflen: usize) -> String {
    let buflen = buflen.min(buf.len());
    let mut out = String::with_capacity(buflen * 4);
    for (i, &c) in buf[..buflen].iter().enumerate() {
        if (0x20..=0x7E).contains(&c) {
            out.push(c as char);
            out.push(' ');
        } else {
            out.push(HEX[(c >> 4) as usize] as char);
            out.push(HEX[(c & 0xF) as usize] as char);
        }
        if (i + 1) % 4 == 0 {
            if (i + 1) % 64 == 0 {
                out.push('\t');
                out.push_str(&(i + 1).to_string());
                out.push_str("\n\n");
            } else if (i + 1) % 32 == 0 {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
    }
    out.push('\n');
    out
}

/// Prints [`dump`] output to stdout.
pub fn print(buf: &[u8], buflen: usize) {
    println!("{}", dump(buf, buflen));
}
