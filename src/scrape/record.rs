use crate::scrape::contacts::ContactInfo;
use crate::scrape::extract::CardFields;
use serde::{Deserialize, Serialize};

/// One business row of the output table
///
/// Field order is column order. String fields hold either extracted text or
/// a sentinel; both are ordinary values as far as persistence is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    #[serde(rename = "ID")]
    pub sequence_id: u64,

    #[serde(rename = "Company Name")]
    pub name: String,

    #[serde(rename = "Domain")]
    pub domain_slug: String,

    #[serde(rename = "Score")]
    pub rating_summary: String,

    #[serde(rename = "Location")]
    pub location: String,

    #[serde(rename = "Address")]
    pub address: String,

    #[serde(rename = "Phone")]
    pub phone: String,

    #[serde(rename = "Email")]
    pub email: String,

    #[serde(rename = "Website")]
    pub website: String,
}

impl BusinessRecord {
    /// Assembles a record from a card and its resolved contacts
    pub fn from_parts(sequence_id: u64, card: &CardFields, contacts: ContactInfo) -> Self {
        Self {
            sequence_id,
            name: card.name(),
            domain_slug: card.domain_slug().to_string(),
            rating_summary: card.rating_summary(),
            location: card.location(),
            address: contacts.address,
            phone: contacts.phone,
            email: contacts.email,
            website: contacts.website,
        }
    }
}
