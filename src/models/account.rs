use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account summary as the upstream bank would report it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub currency: String,
    pub masked_number: String,
    pub balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub account_id: String,
    pub balance: f64,
    pub available: f64,
    pub currency: String,
    pub as_of: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub amount: f64,
    pub currency: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_field_name_on_wire() {
        let account = Account {
            account_id: "acc-001".to_string(),
            account_type: "checking".to_string(),
            currency: "RUB".to_string(),
            masked_number: "**** 1234".to_string(),
            balance: 15000.50,
            account_name: None,
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["type"], "checking");
        assert_eq!(json["maskedNumber"], "**** 1234");
        assert!(json.get("accountName").is_none());
    }
}
