/// Calculate the MD5 digest of one or more byte slices concatenated.
#[macro_export]
macro_rules! md5 {
    ( $( $x:expr ),+ ) => {{
        use md5::{Digest, Md5};
        let mut h = Md5::new();
        $( h.update($x); )+
        let out: [u8; 16] = h.finalize().into();
        out
    }};
}

/// Lowercase hex MD5 of `data`.
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(md5!(data))
}

/// `"0x"` followed by the hex MD5 of `data`, ready for the magic encoder.
pub fn md5_hex_literal(data: &[u8]) -> String {
    format!("0x{}", md5_hex(data))
}
