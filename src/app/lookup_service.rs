use crate::domain::model::Customer;
use crate::domain::ports::CrmClient;
use crate::utils::error::{InvalidIdReason, LookupFailure};
use std::sync::Arc;

#[derive(Clone)]
pub struct CustomerLookupService {
    crm: Arc<dyn CrmClient>,
}

impl CustomerLookupService {
    pub fn new(crm: Arc<dyn CrmClient>) -> Self {
        Self { crm }
    }

    /// Validates `raw_id`, then fetches the customer from the CRM.
    ///
    /// The CRM is not contacted when validation fails. A 2xx response whose
    /// fields are all empty is reported as [`LookupFailure::NoData`].
    pub async fn get_customer_info(&self, raw_id: &str) -> Result<Customer, LookupFailure> {
        let id = parse_customer_id(raw_id)?;

        let customer = self.crm.fetch_customer(id).await?;

        if customer.is_placeholder() {
            tracing::warn!(customer_id = id, "CRM returned an empty customer record");
            return Err(LookupFailure::NoData);
        }

        Ok(customer)
    }
}

/// Empty, then integer, then positive; the first failing check wins.
pub fn parse_customer_id(raw_id: &str) -> Result<u32, LookupFailure> {
    let trimmed = raw_id.trim();
    if trimmed.is_empty() {
        return Err(LookupFailure::InvalidIdentifier(InvalidIdReason::Empty));
    }

    let parsed: i32 = trimmed
        .parse()
        .map_err(|_| LookupFailure::InvalidIdentifier(InvalidIdReason::NotAnInteger))?;

    u32::try_from(parsed)
        .ok()
        .filter(|id| *id > 0)
        .ok_or(LookupFailure::InvalidIdentifier(InvalidIdReason::NotPositive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(raw: &str) -> Option<InvalidIdReason> {
        match parse_customer_id(raw) {
            Err(LookupFailure::InvalidIdentifier(reason)) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn test_parse_valid_ids() {
        assert_eq!(parse_customer_id("12345").unwrap(), 12345);
        assert_eq!(parse_customer_id(" 42 ").unwrap(), 42);
        assert_eq!(parse_customer_id("1").unwrap(), 1);
        assert_eq!(parse_customer_id("2147483647").unwrap(), i32::MAX as u32);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(reason(""), Some(InvalidIdReason::Empty));
        assert_eq!(reason("   "), Some(InvalidIdReason::Empty));
        assert_eq!(reason("\t\n"), Some(InvalidIdReason::Empty));
    }

    #[test]
    fn test_parse_rejects_non_integers() {
        for raw in ["abc", "12.34", "12345abc", "1e5", "0x10", "2147483648"] {
            assert_eq!(reason(raw), Some(InvalidIdReason::NotAnInteger), "{}", raw);
        }
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        for raw in ["0", "-1", "-0", "-2147483648"] {
            assert_eq!(reason(raw), Some(InvalidIdReason::NotPositive), "{}", raw);
        }
    }
}
