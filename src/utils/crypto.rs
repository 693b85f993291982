use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use crate::error::{Error, Result};

#[derive(Clone)]
pub struct PasswordService {
    params: Params,
}

impl PasswordService {
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| Error::Config(format!("Invalid argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash_password(&self, plain: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2().hash_password(plain.as_bytes(), &salt)?.to_string();
        Ok(hash)
    }

    /// A malformed stored hash never matches.
    pub fn verify_password(&self, plain: &str, hashed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return false;
        };
        self.argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let service = PasswordService::new(1024, 1).unwrap();
        let hash = service.hash_password("s3cret-pass").unwrap();
        assert!(service.verify_password("s3cret-pass", &hash));
        assert!(!service.verify_password("other", &hash));
    }

    #[test]
    fn garbage_hash_does_not_verify() {
        let service = PasswordService::new(1024, 1).unwrap();
        assert!(!service.verify_password("x", "not-a-phc-string"));
    }
}
