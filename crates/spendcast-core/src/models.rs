//! Domain models for Spendcast

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction exactly as delivered by a data source
///
/// Nothing here is validated: the type label and the date are whatever the
/// store holds. Records are typed by the forecast filter, which drops the
/// ones it cannot parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub uid: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: f64,
    pub date: String,
    #[serde(rename = "walletId", default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
}

/// A validated transaction that passed the forecast filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub amount: f64,
    pub date: NaiveDate,
    pub tx_type: TransactionType,
    pub wallet_id: Option<String>,
    pub uid: String,
}

/// A transaction to be written to the store
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub uid: String,
    pub tx_type: TransactionType,
    pub amount: f64,
    pub date: NaiveDate,
    pub wallet_id: Option<String>,
    pub description: Option<String>,
    /// Content hash for import deduplication (None for manual entries)
    pub import_hash: Option<String>,
}

impl NewTransaction {
    /// Validate a transaction before it is written
    ///
    /// Amounts must be positive and finite; the direction is carried by the
    /// type, never by the sign.
    pub fn validate(&self) -> crate::Result<()> {
        if self.uid.trim().is_empty() {
            return Err(crate::Error::InvalidData("uid must not be empty".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(crate::Error::InvalidData(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}

/// A transaction row read back from the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: i64,
    pub uid: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: f64,
    pub date: String,
    pub wallet_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Sum of one user's expenses for a single calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregate {
    /// Year-month label, e.g. "2024-03"
    pub month: String,
    pub total: f64,
    /// Calendar month number (1-12); the year is not part of the feature
    pub month_ordinal: u32,
}

/// Income and expense totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    /// Year-month label, e.g. "2024-03"
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

/// Whether next month is expected to cost more than the historical average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    Stable,
    HigherExpense,
}

impl ForecastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::HigherExpense => "higher_expense",
        }
    }
}

impl std::fmt::Display for ForecastStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Next-month expense forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub next_month: u32,
    pub prediction: f64,
    pub mean: f64,
    pub status: ForecastStatus,
}

/// Result of a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    Forecast(ForecastResult),
    /// The user has no usable expense records
    NoData,
}

impl ForecastOutcome {
    pub fn forecast(&self) -> Option<&ForecastResult> {
        match self {
            Self::Forecast(result) => Some(result),
            Self::NoData => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!(
            " Expense ".parse::<TransactionType>().unwrap(),
            TransactionType::Expense
        );
        assert_eq!(
            "income".parse::<TransactionType>().unwrap(),
            TransactionType::Income
        );
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_forecast_status_serializes_snake_case() {
        let json = serde_json::to_string(&ForecastStatus::HigherExpense).unwrap();
        assert_eq!(json, "\"higher_expense\"");
        let json = serde_json::to_string(&ForecastStatus::Stable).unwrap();
        assert_eq!(json, "\"stable\"");
    }

    #[test]
    fn test_raw_transaction_wire_names() {
        let raw: RawTransaction = serde_json::from_value(serde_json::json!({
            "uid": "u1",
            "type": "expense",
            "amount": 12.5,
            "date": "2024-01-15",
            "walletId": "w1"
        }))
        .unwrap();
        assert_eq!(raw.tx_type, "expense");
        assert_eq!(raw.wallet_id.as_deref(), Some("w1"));
    }

    #[test]
    fn test_new_transaction_validation() {
        let mut tx = NewTransaction {
            uid: "u1".into(),
            tx_type: TransactionType::Expense,
            amount: 10.0,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            wallet_id: None,
            description: None,
            import_hash: None,
        };
        assert!(tx.validate().is_ok());

        tx.amount = 0.0;
        assert!(tx.validate().is_err());

        tx.amount = f64::NAN;
        assert!(tx.validate().is_err());

        tx.amount = 5.0;
        tx.uid = "  ".into();
        assert!(tx.validate().is_err());
    }
}
