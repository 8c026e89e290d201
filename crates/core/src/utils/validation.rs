//! Shape and range checks shared by the record models.

use rust_decimal::Decimal;

use crate::errors::{Error, Result, ValidationError};

/// Rejects negative monetary amounts.
pub fn ensure_non_negative(field: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(Error::Validation(ValidationError::NegativeAmount {
            field: field.to_string(),
            value: value.to_string(),
        }));
    }
    Ok(())
}

/// Rejects blank required text fields.
pub fn ensure_present(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            field.to_string(),
        )));
    }
    Ok(())
}

/// Like [`ensure_present`], for fields a patch may leave unset.
pub fn ensure_present_if_set(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => ensure_present(field, value),
        None => Ok(()),
    }
}

/// Like [`ensure_non_negative`], for fields a patch may leave unset.
pub fn ensure_non_negative_if_set(field: &str, value: Option<Decimal>) -> Result<()> {
    match value {
        Some(value) => ensure_non_negative(field, value),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_amount_rejected() {
        let err = ensure_non_negative("amount", dec!(-0.01)).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::NegativeAmount { .. })
        ));
        assert!(ensure_non_negative("amount", Decimal::ZERO).is_ok());
        assert!(ensure_non_negative("amount", dec!(12.5)).is_ok());
    }

    #[test]
    fn test_blank_text_rejected() {
        assert!(ensure_present("title", "   ").is_err());
        assert!(ensure_present("title", "Oil change").is_ok());
        assert!(ensure_present_if_set("title", None).is_ok());
        assert!(ensure_present_if_set("title", Some("")).is_err());
    }
}
