// Validation utilities module
// Custom validation functions used by request DTOs

use validator::ValidationError;

/// Validates that a text field carries something other than whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("must_not_be_blank"))
    } else {
        Ok(())
    }
}
