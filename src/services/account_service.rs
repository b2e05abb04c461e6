// Mocked account data, standing in for upstream bank API calls.
//
// The data is static and identical for every bot and user. Session
// validation happens at the handler boundary before any of these
// methods run.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::{Account, AccountBalance, Transaction};
use crate::utils::validation::{is_valid_iso_date, is_valid_limit};

const DEFAULT_TRANSACTION_LIMIT: i64 = 50;

/// Filters accepted by the transaction listing endpoint. `from`/`to` are
/// inclusive ISO-date bounds; `kind` keeps debits (negative amounts) or
/// credits (positive amounts).
#[derive(Debug, Default)]
pub struct TransactionFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
    pub kind: Option<String>,
}

/// Serves account data for authorized bot sessions.
#[derive(Clone, Default)]
pub struct AccountService;

impl AccountService {
    pub fn new() -> Self {
        Self
    }

    /// The user's accounts as the bank would report them.
    pub fn accounts(&self, bot_id: Uuid) -> Vec<Account> {
        debug!(bot_id = %bot_id, "Listing accounts");

        vec![
            Account {
                account_id: "acc-001".to_string(),
                account_type: "checking".to_string(),
                currency: "RUB".to_string(),
                masked_number: "**** 1234".to_string(),
                balance: 15000.50,
                account_name: Some("Текущий счет".to_string()),
            },
            Account {
                account_id: "acc-002".to_string(),
                account_type: "savings".to_string(),
                currency: "RUB".to_string(),
                masked_number: "**** 5678".to_string(),
                balance: 50000.00,
                account_name: Some("Сберегательный счет".to_string()),
            },
        ]
    }

    /// Balance snapshot for one account, `as_of` the moment of the call.
    pub fn balance(&self, bot_id: Uuid, account_id: &str) -> AccountBalance {
        debug!(bot_id = %bot_id, account_id = %account_id, "Fetching balance");

        AccountBalance {
            account_id: account_id.to_string(),
            balance: 15000.50,
            available: 14000.00,
            currency: "RUB".to_string(),
            as_of: Utc::now().timestamp(),
        }
    }

    /// Transaction history with date, type and limit filters applied in
    /// that order.
    pub fn transactions(
        &self,
        bot_id: Uuid,
        account_id: &str,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>> {
        debug!(bot_id = %bot_id, account_id = %account_id, "Listing transactions");

        for bound in [&filter.from, &filter.to].into_iter().flatten() {
            if !is_valid_iso_date(bound) {
                return Err(ApiError::BadRequest(format!(
                    "Invalid date filter: {} (expected YYYY-MM-DD)",
                    bound
                )));
            }
        }

        let keep_kind = match filter.kind.as_deref() {
            None => None,
            Some("debit") => Some(false),
            Some("credit") => Some(true),
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "Invalid type filter: {} (expected debit or credit)",
                    other
                )));
            }
        };

        let limit = filter.limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT);
        if !is_valid_limit(limit) {
            return Err(ApiError::BadRequest("Invalid limit parameter".to_string()));
        }

        // ISO dates compare correctly as strings, so the inclusive bounds
        // are plain string comparisons.
        let transactions = mock_transactions()
            .into_iter()
            .filter(|txn| {
                filter
                    .from
                    .as_deref()
                    .is_none_or(|from| txn.date.as_str() >= from)
            })
            .filter(|txn| filter.to.as_deref().is_none_or(|to| txn.date.as_str() <= to))
            .filter(|txn| keep_kind.is_none_or(|credit| (txn.amount > 0.0) == credit))
            .take(limit as usize)
            .collect();

        Ok(transactions)
    }
}

fn mock_transactions() -> Vec<Transaction> {
    vec![
        Transaction {
            transaction_id: "txn-001".to_string(),
            date: "2025-04-29".to_string(),
            amount: -250.00,
            currency: "RUB".to_string(),
            description: "Оплата в магазине".to_string(),
            merchant: Some("Пятерочка".to_string()),
            category: Some("Продукты".to_string()),
            status: Some("completed".to_string()),
        },
        Transaction {
            transaction_id: "txn-002".to_string(),
            date: "2025-04-28".to_string(),
            amount: -500.00,
            currency: "RUB".to_string(),
            description: "Интернет-покупка".to_string(),
            merchant: Some("Ozon".to_string()),
            category: Some("Покупки".to_string()),
            status: Some("completed".to_string()),
        },
        Transaction {
            transaction_id: "txn-003".to_string(),
            date: "2025-04-27".to_string(),
            amount: 25000.00,
            currency: "RUB".to_string(),
            description: "Зачисление заработной платы".to_string(),
            merchant: Some("ООО Компания".to_string()),
            category: Some("Доход".to_string()),
            status: Some("completed".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AccountService {
        AccountService::new()
    }

    #[test]
    fn test_accounts_are_stable() {
        let accounts = service().accounts(Uuid::new_v4());
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].account_id, "acc-001");
        assert_eq!(accounts[1].account_type, "savings");
    }

    #[test]
    fn test_balance_echoes_account_id() {
        let balance = service().balance(Uuid::new_v4(), "acc-xyz");
        assert_eq!(balance.account_id, "acc-xyz");
        assert_eq!(balance.currency, "RUB");
        assert!(balance.as_of <= Utc::now().timestamp());
    }

    #[test]
    fn test_transactions_unfiltered() {
        let txns = service()
            .transactions(Uuid::new_v4(), "acc-001", TransactionFilter::default())
            .unwrap();
        assert_eq!(txns.len(), 3);
    }

    #[test]
    fn test_credit_filter_keeps_positive_amounts() {
        let filter = TransactionFilter {
            kind: Some("credit".to_string()),
            ..Default::default()
        };
        let txns = service()
            .transactions(Uuid::new_v4(), "acc-001", filter)
            .unwrap();
        assert_eq!(txns.len(), 1);
        assert!(txns[0].amount > 0.0);
    }

    #[test]
    fn test_debit_filter_keeps_negative_amounts() {
        let filter = TransactionFilter {
            kind: Some("debit".to_string()),
            ..Default::default()
        };
        let txns = service()
            .transactions(Uuid::new_v4(), "acc-001", filter)
            .unwrap();
        assert_eq!(txns.len(), 2);
        assert!(txns.iter().all(|t| t.amount < 0.0));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let filter = TransactionFilter {
            from: Some("2025-04-28".to_string()),
            to: Some("2025-04-29".to_string()),
            ..Default::default()
        };
        let txns = service()
            .transactions(Uuid::new_v4(), "acc-001", filter)
            .unwrap();
        assert_eq!(txns.len(), 2);
        assert!(txns.iter().any(|t| t.date == "2025-04-28"));
        assert!(txns.iter().any(|t| t.date == "2025-04-29"));
    }

    #[test]
    fn test_malformed_date_rejected() {
        let filter = TransactionFilter {
            from: Some("29-04-2025".to_string()),
            ..Default::default()
        };
        let err = service()
            .transactions(Uuid::new_v4(), "acc-001", filter)
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let filter = TransactionFilter {
            kind: Some("refund".to_string()),
            ..Default::default()
        };
        assert!(service()
            .transactions(Uuid::new_v4(), "acc-001", filter)
            .is_err());
    }

    #[test]
    fn test_limit_bounds() {
        let filter = TransactionFilter {
            limit: Some(2),
            ..Default::default()
        };
        let txns = service()
            .transactions(Uuid::new_v4(), "acc-001", filter)
            .unwrap();
        assert_eq!(txns.len(), 2);

        let filter = TransactionFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert!(service()
            .transactions(Uuid::new_v4(), "acc-001", filter)
            .is_err());

        let filter = TransactionFilter {
            limit: Some(101),
            ..Default::default()
        };
        assert!(service()
            .transactions(Uuid::new_v4(), "acc-001", filter)
            .is_err());
    }
}
