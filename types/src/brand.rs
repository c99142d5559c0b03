//! Brand records.

use serde::{Deserialize, Serialize};

use crate::{AcpError, BrandId, Timestamp};

/// A registered manufacturer or label whose products can be verified.
///
/// `name` is unique across the catalogue; verification requests refer to
/// brands by name, not id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub description: String,
    pub logo: Option<String>,
    pub official_site: Option<String>,
    /// Category tags such as "Cognac" or "Luxury".
    pub tags: Vec<String>,
    pub created_at: Timestamp,
}

/// Admin-supplied fields for creating or editing a brand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandDraft {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub official_site: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BrandDraft {
    /// Name and description are required.
    pub fn validate(&self) -> Result<(), AcpError> {
        if self.name.trim().is_empty() {
            return Err(AcpError::MissingField("name"));
        }
        if self.description.trim().is_empty() {
            return Err(AcpError::MissingField("description"));
        }
        Ok(())
    }

    /// Materialise the draft with a store-assigned id.
    pub fn into_brand(self, id: BrandId, created_at: Timestamp) -> Brand {
        Brand {
            id,
            name: self.name.trim().to_string(),
            description: self.description,
            logo: self.logo,
            official_site: self.official_site,
            tags: self.tags,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, description: &str) -> BrandDraft {
        BrandDraft {
            name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_name_rejected() {
        assert_eq!(
            draft("  ", "French cognac").validate(),
            Err(AcpError::MissingField("name"))
        );
    }

    #[test]
    fn blank_description_rejected() {
        assert_eq!(
            draft("Hennessy", "").validate(),
            Err(AcpError::MissingField("description"))
        );
    }

    #[test]
    fn into_brand_trims_name() {
        let brand = draft(" Dior ", "Fashion house").into_brand(BrandId::new(7), Timestamp::new(5));
        assert_eq!(brand.name, "Dior");
        assert_eq!(brand.id, BrandId::new(7));
        assert!(brand.tags.is_empty());
    }

    #[test]
    fn draft_json_defaults_optional_fields() {
        let parsed: BrandDraft =
            serde_json::from_str(r#"{"name":"Martell","description":"Cognac house"}"#).unwrap();
        assert_eq!(parsed.logo, None);
        assert!(parsed.tags.is_empty());
    }
}
