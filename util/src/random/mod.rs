use rand::{thread_rng, Rng};

/// The character set for tokens that must survive SDP and STUN
/// attribute grammars unescaped.
pub const RUNES_ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// ice-char = ALPHA / DIGIT / "+" / "/"
pub const RUNES_ICE_CHAR: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789/+";

pub fn generate_crypto_random_string(n: usize, runes: &[u8]) -> String {
    let mut rng = thread_rng();

    (0..n)
        .map(|_| {
            let idx = rng.gen_range(0..runes.len());
            runes[idx] as char
        })
        .collect()
}

/// A random numeric token of `n` digits without a leading zero, usable
/// where a protocol wants a decimal identifier.
pub fn generate_numeric_string(n: usize) -> String {
    let mut rng = thread_rng();

    (0..n)
        .map(|i| {
            let low = usize::from(i == 0);
            char::from_digit(rng.gen_range(low..10) as u32, 10).unwrap_or('0')
        })
        .collect()
}
