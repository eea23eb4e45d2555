use bytes::BufMut;

/// Number of zero bytes needed to bring `len` up to a 32-bit boundary.
pub(crate) fn get_padding_size(len: usize) -> usize {
    if len % 4 == 0 {
        0
    } else {
        4 - (len % 4)
    }
}

pub(crate) fn put_padding(buf: &mut impl BufMut, len: usize) {
    for _ in 0..get_padding_size(len) {
        buf.put_u8(0);
    }
}

#[cfg(test)]
mod util_test {
    use super::*;

    #[test]
    fn test_get_padding_size() {
        let tests = vec![(0usize, 0usize), (1, 3), (2, 2), (3, 1), (4, 0), (100, 0), (500, 0)];
        for (len, want) in tests {
            assert_eq!(get_padding_size(len), want, "padding({len})");
        }
    }
}
