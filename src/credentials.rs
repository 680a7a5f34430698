//! Initial credential generation for provisioned accounts.

use rand::Rng;

use crate::secret::SecretString;

/// Letters, digits and punctuation, matching what provisioning hands out as
/// one-time admin passwords.
const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Default generated password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

/// Generate a random password of the given length.
///
/// The result is returned once, wrapped in [`SecretString`]; it is never
/// stored by this crate. Hashing and storage of credentials belong to the
/// host's identity layer.
pub fn generate_password(length: usize) -> SecretString {
    let mut rng = rand::thread_rng();
    let password: String = (0..length)
        .map(|_| PASSWORD_CHARSET[rng.gen_range(0..PASSWORD_CHARSET.len())] as char)
        .collect();
    SecretString::new(password)
}

/// Generate a password of [`DEFAULT_PASSWORD_LENGTH`].
pub fn generate_password_default() -> SecretString {
    generate_password(DEFAULT_PASSWORD_LENGTH)
}
