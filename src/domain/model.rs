use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Customer record as returned by the external CRM `ClientData` endpoint.
///
/// Every field is a string. Missing fields and JSON `null` both read as an
/// empty string; field names are accepted in camelCase or PascalCase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default, alias = "ClientId", deserialize_with = "null_as_empty")]
    pub client_id: String,
    #[serde(default, alias = "EditApproval", deserialize_with = "null_as_empty")]
    pub edit_approval: String,
    #[serde(default, alias = "Dba", deserialize_with = "null_as_empty")]
    pub dba: String,
    #[serde(default, alias = "ClientLegalName", deserialize_with = "null_as_empty")]
    pub client_legal_name: String,
    #[serde(default, alias = "ComplianceHold", deserialize_with = "null_as_empty")]
    pub compliance_hold: String,
    #[serde(default, alias = "Level", deserialize_with = "null_as_empty")]
    pub level: String,
    #[serde(
        default,
        rename = "paymentTermID",
        alias = "PaymentTermID",
        alias = "paymentTermId",
        deserialize_with = "null_as_empty"
    )]
    pub payment_term_id: String,
    #[serde(default, alias = "PaymentMethod", deserialize_with = "null_as_empty")]
    pub payment_method: String,
    #[serde(default, alias = "Status", deserialize_with = "null_as_empty")]
    pub status: String,
}

impl Customer {
    /// True when the CRM answered 2xx but every field is empty.
    pub fn is_placeholder(&self) -> bool {
        [
            &self.client_id,
            &self.edit_approval,
            &self.dba,
            &self.client_legal_name,
            &self.compliance_hold,
            &self.level,
            &self.payment_term_id,
            &self.payment_method,
            &self.status,
        ]
        .iter()
        .all(|field| field.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// How outbound CRM requests are authorised. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Fixed configured bearer token.
    Static,
    /// Token obtained from the OAuth token endpoint, static token as fallback.
    Dynamic,
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::Static => f.write_str("static"),
            OperatingMode::Dynamic => f.write_str("dynamic"),
        }
    }
}
