//! Response DTOs

use serde::{Deserialize, Serialize};

use crate::domain::model::Customer;

/// Customer information returned to inbound callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfoResponse {
    pub client_id: String,
    pub edit_approval: String,
    pub dba: String,
    pub client_legal_name: String,
    pub compliance_hold: String,
    pub level: String,
    #[serde(rename = "paymentTermID")]
    pub payment_term_id: String,
    pub payment_method: String,
    pub status: String,
}

impl From<Customer> for CustomerInfoResponse {
    fn from(customer: Customer) -> Self {
        Self {
            client_id: customer.client_id,
            edit_approval: customer.edit_approval,
            dba: customer.dba,
            client_legal_name: customer.client_legal_name,
            compliance_hold: customer.compliance_hold,
            level: customer.level,
            payment_term_id: customer.payment_term_id,
            payment_method: customer.payment_method,
            status: customer.status,
        }
    }
}
