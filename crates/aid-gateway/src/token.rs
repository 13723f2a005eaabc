use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub const TOKEN_LEN: usize = 12;

/// Random base-36 subscription identity. 36^12 values, so two views never
/// collide in practice.
pub fn correlation_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}
