pub mod ip;
pub mod password;

/// Generate a cryptographically-random token string (for JWT secrets)
pub fn generate_secure_token(length: usize) -> String {
    use argon2::password_hash::rand_core::{OsRng, RngCore};

    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = OsRng;

    (0..length)
        .map(|_| chars[(rng.next_u32() as usize) % chars.len()] as char)
        .collect()
}
