//! Field-level input checks, mirroring the limits enforced by the
//! storage schema so bad input is rejected before it reaches a query.

use chrono::NaiveDate;

use crate::error::AppError;

pub const MAX_STATEMENT_LEN: usize = 520;
pub const MAX_BIO_LEN: usize = 520;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_CLUB_NAME_LEN: usize = 20;
pub const MAX_CLUB_LOCATION_LEN: usize = 40;
pub const MAX_DESCRIPTION_LEN: usize = 520;
pub const MIN_CAPACITY: i32 = 2;
pub const MAX_CAPACITY: i32 = 96;

pub fn required(field: &'static str, value: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, format!("{field} must not be blank")));
    }
    max_len_check(field, value, max_len)
}

pub fn optional(field: &'static str, value: &str, max_len: usize) -> Result<(), AppError> {
    max_len_check(field, value, max_len)
}

fn max_len_check(field: &'static str, value: &str, max_len: usize) -> Result<(), AppError> {
    if value.chars().count() > max_len {
        return Err(AppError::validation(
            field,
            format!("{field} must be at most {max_len} characters"),
        ));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), AppError> {
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };
    if !well_formed {
        return Err(AppError::validation("email", "enter a valid email address"));
    }
    Ok(())
}

pub fn capacity(value: i32) -> Result<(), AppError> {
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&value) {
        return Err(AppError::validation(
            "capacity",
            format!("The capacity must be between {MIN_CAPACITY} and {MAX_CAPACITY}"),
        ));
    }
    Ok(())
}

pub fn deadline(value: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if value < today {
        return Err(AppError::validation(
            "deadline",
            "The deadline cannot be in the past!",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_fields_are_rejected() {
        assert!(required("name", "", MAX_CLUB_NAME_LEN).is_err());
        assert!(required("name", "   ", MAX_CLUB_NAME_LEN).is_err());
        assert!(required("name", "Kerbal Chess Club", MAX_CLUB_NAME_LEN).is_ok());
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let long = "x".repeat(MAX_STATEMENT_LEN + 1);
        assert!(required("statement", &long, MAX_STATEMENT_LEN).is_err());
        let at_limit = "x".repeat(MAX_STATEMENT_LEN);
        assert!(required("statement", &at_limit, MAX_STATEMENT_LEN).is_ok());
        assert!(optional("bio", "", MAX_BIO_LEN).is_ok());
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(email("jeb@example.org").is_ok());
        assert!(email("not-an-email").is_err());
        assert!(email("@example.org").is_err());
        assert!(email("jeb@org").is_err());
    }

    #[test]
    fn capacity_bounds_are_inclusive() {
        assert!(capacity(2).is_ok());
        assert!(capacity(96).is_ok());
        assert!(capacity(1).is_err());
        assert!(capacity(97).is_err());
    }

    #[test]
    fn deadlines_may_not_be_in_the_past() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert!(deadline(today, today).is_ok());
        assert!(deadline(today.succ_opt().unwrap(), today).is_ok());
        assert!(deadline(today.pred_opt().unwrap(), today).is_err());
    }
}
