use serde::{Deserialize, Serialize};

use crate::error::PurchaseError;

/// Buyer details collected in the first workflow step.
///
/// A closed record: required fields are plain `String`s, everything else is
/// `Option`. Validated once at the boundary (`validate`); after that the
/// workflow treats the value as well-formed. Not persisted on its own;
/// folded into the purchase row and used for the profile sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
}

impl BuyerDetails {
    /// Names of required fields that are empty (whitespace counts as empty).
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let required = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
        ];

        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    pub fn validate(&self) -> Result<(), PurchaseError> {
        let missing = self.missing_required_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PurchaseError::validation(missing))
        }
    }
}
