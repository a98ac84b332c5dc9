use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

pub struct PasswordService;

impl PasswordService {
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
        verify(password, hash)
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {e}")))
    }

    /// Passwords must contain an uppercase character, a lowercase
    /// character and a number.
    pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if !has_upper || !has_lower || !has_digit {
            return Err(AppError::validation(
                "password",
                "Password must contain an uppercase character, a lowercase character and a number",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_mixed_case_with_digit() {
        assert!(PasswordService::validate_password_strength("Password123").is_ok());
    }

    #[test]
    fn rejects_missing_character_classes() {
        assert!(PasswordService::validate_password_strength("password123").is_err());
        assert!(PasswordService::validate_password_strength("PASSWORD123").is_err());
        assert!(PasswordService::validate_password_strength("Passwordabc").is_err());
        assert!(PasswordService::validate_password_strength("").is_err());
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hashed = PasswordService::hash_password("Password123").unwrap();
        assert!(PasswordService::verify_password("Password123", &hashed).unwrap());
        assert!(!PasswordService::verify_password("Password124", &hashed).unwrap());
    }
}
