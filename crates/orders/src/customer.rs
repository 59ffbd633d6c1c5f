use serde::{Deserialize, Serialize};

use bodega_core::{DomainError, DomainResult, ValueObject};

/// Customer contact details captured at checkout.
///
/// Name, email and address line are required; city, state and postal code
/// are optional. Compared by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl CustomerDetails {
    /// Check the required fields; whitespace-only counts as missing.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.address_line.trim().is_empty()
        {
            return Err(DomainError::validation(
                "name, email and address are required",
            ));
        }
        Ok(())
    }

    /// Copy with surrounding whitespace stripped from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            address_line: self.address_line.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
        }
    }
}

impl ValueObject for CustomerDetails {}
