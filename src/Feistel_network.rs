use std::ops::BitXor;

/// Runs `(left, right) = (right, left ^ f(right, key))` once per key.
pub(crate) fn classic_feistel_network_encrypt<const ROUND: usize, KEY, H, F>(
    left: H,
    right: H,
    keys: &[KEY; ROUND],
    round_function: F,
) -> (H, H)
where
    H: Copy + BitXor<Output = H>,
    F: Fn(H, &KEY) -> H,
{
    let mut left = left;
    let mut right = right;
    for key in keys {
        (left, right) = (right, left ^ round_function(right, key));
    }
    (left, right)
}

/// Undoes [`classic_feistel_network_encrypt`] by walking the keys backwards.
/// Takes the halves it produced and returns the original `(left, right)`.
pub(crate) fn classic_feistel_network_decrypt<const ROUND: usize, KEY, H, F>(
    right: H,
    left: H,
    keys: &[KEY; ROUND],
    round_function: F,
) -> (H, H)
where
    H: Copy + BitXor<Output = H>,
    F: Fn(H, &KEY) -> H,
{
    let mut left = left;
    let mut right = right;
    for key in keys.iter().rev() {
        (right, left) = (left, right ^ round_function(left, key));
    }
    (left, right)
}

#[cfg(test)]
mod feistel_tests {
    use super::*;
    use rand::prelude::*;

    fn toy_round(half: u32, key: &u32) -> u32 {
        half.wrapping_mul(0x9e37_79b9).rotate_left(7) ^ key
    }

    #[test]
    fn network_round_trip_test() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..64 {
            let keys: [u32; 16] = rng.gen();
            let (left, right): (u32, u32) = rng.gen();
            let (enc_left, enc_right) =
                classic_feistel_network_encrypt(left, right, &keys, toy_round);
            assert_ne!((enc_left, enc_right), (left, right));
            let decrypted = classic_feistel_network_decrypt(enc_right, enc_left, &keys, toy_round);
            assert_eq!(decrypted, (left, right));
        }
    }

    #[test]
    fn single_round_test() {
        let (left, right) = classic_feistel_network_encrypt(1u32, 2u32, &[5u32], |half, key| half + key);
        assert_eq!((left, right), (2, 1 ^ 7));
    }
}
