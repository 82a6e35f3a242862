//! CUIT (Clave Única de Identificación Tributaria) validation.
//!
//! A CUIT is written `AA-NNNNNNNN-C`: a taxpayer-type prefix, the document
//! number and a modulo-11 check digit computed over the first ten digits.

use std::borrow::Cow;

use thiserror::Error;
use validator::ValidationError;

const TAXPAYER_TYPES: [u32; 7] = [20, 23, 24, 27, 30, 33, 34];
const WEIGHTS: [u32; 10] = [5, 4, 3, 2, 7, 6, 5, 4, 3, 2];

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CuitError {
  #[error("El CUIT debe ser en formato XX-XXXXXXXX-X")]
  Format,
  #[error("El tipo de contribuyente no es válido")]
  TaxpayerType,
  #[error("El dígito de control del CUIT no es válido")]
  CheckDigit,
}

impl CuitError {
  pub fn code(&self) -> &'static str {
    match self {
      CuitError::Format => "cuit_format",
      CuitError::TaxpayerType => "cuit_taxpayer_type",
      CuitError::CheckDigit => "cuit_check_digit",
    }
  }
}

/// Checks format, taxpayer type and check digit, in that order.
pub fn validate(cuit: &str) -> Result<(), CuitError> {
  let digits = parse_digits(cuit).ok_or(CuitError::Format)?;

  let taxpayer_type = digits[0] * 10 + digits[1];
  if !TAXPAYER_TYPES.contains(&taxpayer_type) {
    return Err(CuitError::TaxpayerType);
  }

  if check_digit(&digits[..10]) != digits[10] {
    return Err(CuitError::CheckDigit);
  }
  Ok(())
}

/// Expected check digit for the first ten digits of a CUIT.
pub fn check_digit(digits: &[u32]) -> u32 {
  let sum: u32 = digits.iter().zip(WEIGHTS).map(|(d, w)| d * w).sum();
  match 11 - sum % 11 {
    11 => 0,
    10 => 9,
    digit => digit,
  }
}

fn parse_digits(cuit: &str) -> Option<[u32; 11]> {
  let bytes = cuit.as_bytes();
  if bytes.len() != 13 || bytes[2] != b'-' || bytes[11] != b'-' {
    return None;
  }
  let mut digits = [0u32; 11];
  let positions = (0..2).chain(3..11).chain(12..13);
  for (slot, position) in digits.iter_mut().zip(positions) {
    let byte = bytes[position];
    if !byte.is_ascii_digit() {
      return None;
    }
    *slot = u32::from(byte - b'0');
  }
  Some(digits)
}

/// Adapter for `#[validate(custom(function = ...))]`.
pub fn validate_cuit(cuit: &str) -> Result<(), ValidationError> {
  validate(cuit).map_err(|error| {
    ValidationError::new(error.code()).with_message(Cow::Owned(error.to_string()))
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_valid_cuits() {
    for cuit in [
      "20-12345678-6",
      "27-11111111-7",
      "30-71234567-1",
      "23-00000000-0",
    ] {
      assert_eq!(validate(cuit), Ok(()), "{cuit} should be valid");
    }
  }

  #[test]
  fn test_check_digit_edge_cases() {
    // 11 - (sum % 11) == 11
    assert_eq!(check_digit(&[2, 0, 1, 2, 3, 0, 0, 0, 0, 3]), 0);
    assert_eq!(validate("20-12300003-0"), Ok(()));
    // 11 - (sum % 11) == 10
    assert_eq!(check_digit(&[2, 0, 1, 2, 3, 0, 0, 0, 0, 9]), 9);
    assert_eq!(validate("20-12300009-9"), Ok(()));
  }

  #[test]
  fn test_invalid_format() {
    for cuit in [
      "123-456-789",
      "",
      "20123456786",
      "20-1234567-86",
      "2O-12345678-6",
      "20-12345678-６",
      " 20-12345678-6",
    ] {
      assert_eq!(validate(cuit), Err(CuitError::Format), "{cuit:?}");
    }
  }

  #[test]
  fn test_invalid_taxpayer_type() {
    assert_eq!(validate("99-12345678-9"), Err(CuitError::TaxpayerType));
    assert_eq!(validate("21-12345678-6"), Err(CuitError::TaxpayerType));
  }

  #[test]
  fn test_invalid_check_digit() {
    assert_eq!(validate("20-12345678-0"), Err(CuitError::CheckDigit));
    assert_eq!(validate("20-12345678-9"), Err(CuitError::CheckDigit));
  }

  #[test]
  fn test_validation_error_codes_and_messages() {
    let error = validate_cuit("123-456-789").unwrap_err();
    assert_eq!(error.code, "cuit_format");
    assert!(error
      .message
      .unwrap()
      .starts_with("El CUIT debe ser en formato"));

    let error = validate_cuit("99-12345678-9").unwrap_err();
    assert_eq!(error.code, "cuit_taxpayer_type");

    let error = validate_cuit("20-12345678-0").unwrap_err();
    assert_eq!(error.code, "cuit_check_digit");
    assert_eq!(
      error.message.unwrap(),
      "El dígito de control del CUIT no es válido"
    );
  }
}
