use rand::{distributions::Alphanumeric, seq::SliceRandom, Rng};

pub const VERIFICATION_TOKEN_LEN: usize = 21;
pub const TEMP_PASSWORD_LEN: usize = 10;

const TEMP_PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";

/// Single-use random token mailed out to prove control of an email address.
pub fn verification_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Temporary password issued on restore, drawn from a restricted alphabet so
/// it is typeable everywhere.
pub fn temp_password() -> String {
    let mut rng = rand::thread_rng();
    (0..TEMP_PASSWORD_LEN)
        .map(|_| *TEMP_PASSWORD_ALPHABET.choose(&mut rng).unwrap() as char)
        .collect()
}
