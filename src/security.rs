// ==============================================================================
// security.rs - Password Hashing (Argon2id)
// ==============================================================================
// Description: Argon2id hashing and verification for account passwords
// Author: Matt Barham
// Created: 2026-07-27
// Modified: 2026-07-27
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Hashes a password using Argon2id with secure parameters
///
/// Uses Argon2id algorithm (winner of Password Hashing Competition 2015):
/// - Memory: 47104 KiB (46 MiB)
/// - Iterations: 3
/// - Parallelism: 4
/// - Salt: 16 bytes (cryptographically random)
///
/// The returned hash string is in PHC format and contains the algorithm,
/// parameters, salt, and hash.
///
/// # Errors
///
/// Returns an error if:
/// - Salt generation fails (extremely rare)
/// - Password hashing fails (extremely rare)
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a random salt
    let salt = SaltString::generate(&mut OsRng);

    // Configure Argon2id with secure parameters
    // Memory: 47104 KiB (46 MiB), Iterations: 3, Parallelism: 4
    let params = Params::new(47104, 3, 4, None).context("Failed to create Argon2 parameters")?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    // Hash the password
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .context("Failed to hash password")?
        .to_string();

    Ok(password_hash)
}

/// Verifies a password against an Argon2id hash
///
/// # Errors
///
/// Returns an error if the hash string is malformed. A wrong password is not
/// an error; it returns `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).context("Failed to parse password hash")?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "pw1234";
        let hash = hash_password(password).unwrap();

        // Hash should start with Argon2id identifier
        assert!(hash.starts_with("$argon2id$"));

        // Hash should contain version, parameters, salt, and hash
        assert!(hash.contains("$v=19$"));
        assert!(hash.contains("$m=47104,t=3,p=4$"));

        // Two hashes of same password should be different (different salts)
        let hash2 = hash_password(password).unwrap();
        assert_ne!(hash, hash2);
    }

    #[test]
    fn test_verify_password() {
        let password = "CorrectPassword123!";
        let hash = hash_password(password).unwrap();

        // Correct password should verify
        assert!(verify_password(password, &hash).unwrap());

        // Incorrect password should not verify
        assert!(!verify_password("WrongPassword", &hash).unwrap());

        // Case sensitivity matters
        assert!(!verify_password("correctpassword123!", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(result.is_err());
    }
}
