//! Checkout delivery form.

use serde::{Deserialize, Serialize};

use super::forms::FieldErrors;
use super::order::PaymentMethod;

/// A required delivery field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryField {
    Name,
    Phone,
    Address,
    City,
    PostalCode,
}

impl DeliveryField {
    /// Every required field, in form order.
    pub const REQUIRED: [Self; 5] = [
        Self::Name,
        Self::Phone,
        Self::Address,
        Self::City,
        Self::PostalCode,
    ];

    /// Wire name of the field.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "delivery_name",
            Self::Phone => "delivery_phone",
            Self::Address => "delivery_address",
            Self::City => "delivery_city",
            Self::PostalCode => "delivery_postal_code",
        }
    }

    /// Inline message shown when the field is blank.
    #[must_use]
    pub const fn required_message(self) -> &'static str {
        match self {
            Self::Name => "Name is required",
            Self::Phone => "Phone is required",
            Self::Address => "Address is required",
            Self::City => "City is required",
            Self::PostalCode => "Postal code is required",
        }
    }
}

/// Body of `POST /checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliveryForm {
    pub delivery_name: String,
    pub delivery_phone: String,
    pub delivery_address: String,
    pub delivery_city: String,
    pub delivery_postal_code: String,
    #[serde(default)]
    pub delivery_notes: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl DeliveryForm {
    /// Current value of a required field.
    #[must_use]
    pub fn value(&self, field: DeliveryField) -> &str {
        match field {
            DeliveryField::Name => &self.delivery_name,
            DeliveryField::Phone => &self.delivery_phone,
            DeliveryField::Address => &self.delivery_address,
            DeliveryField::City => &self.delivery_city,
            DeliveryField::PostalCode => &self.delivery_postal_code,
        }
    }

    /// Check every required field is non-blank.
    ///
    /// # Errors
    ///
    /// Returns one error per blank field, keyed by its wire name.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for field in DeliveryField::REQUIRED {
            if self.value(field).trim().is_empty() {
                errors.insert(field.key(), field.required_message());
            }
        }
        errors.into_result(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> DeliveryForm {
        DeliveryForm {
            delivery_name: "Juan Dela Cruz".to_string(),
            delivery_phone: "+63 912 345 6789".to_string(),
            delivery_address: "123 Luxury Avenue".to_string(),
            delivery_city: "Cagayan de Oro".to_string(),
            delivery_postal_code: "9000".to_string(),
            ..DeliveryForm::default()
        }
    }

    #[test]
    fn test_filled_form_is_valid() {
        assert!(filled().validate().is_ok());
    }

    #[test]
    fn test_blank_name_is_field_error() {
        let form = DeliveryForm {
            delivery_name: String::new(),
            ..filled()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("delivery_name"), Some("Name is required"));
    }

    #[test]
    fn test_whitespace_counts_as_blank() {
        let form = DeliveryForm {
            delivery_city: "   ".to_string(),
            delivery_postal_code: "\t".to_string(),
            ..filled()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("delivery_city"), Some("City is required"));
        assert_eq!(errors.get("delivery_postal_code"), Some("Postal code is required"));
    }

    #[test]
    fn test_notes_are_optional() {
        let form = DeliveryForm {
            delivery_notes: String::new(),
            ..filled()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_serializes_wire_names() {
        let json = serde_json::to_value(filled()).unwrap();
        assert_eq!(json["delivery_postal_code"], "9000");
        assert_eq!(json["payment_method"], "cod");
    }
}
