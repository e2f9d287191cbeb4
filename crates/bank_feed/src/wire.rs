//! JSON shapes of the aggregator's `/transactions/get` endpoint.
//!
//! The aggregator reports outflows as positive amounts; the engine expects
//! the opposite sign, so amounts are negated on the way in.

use chrono::NaiveDate;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

use engine::{FeedPage, FeedTransaction, Money};

use crate::FeedError;

#[derive(Debug, Serialize)]
pub(crate) struct TransactionsRequest<'a> {
    pub client_id: &'a str,
    pub secret: &'a str,
    pub access_token: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub options: RequestOptions<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestOptions<'a> {
    pub account_ids: [&'a str; 1],
    pub count: usize,
    pub offset: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionsResponse {
    pub transactions: Vec<serde_json::Value>,
    pub total_transactions: usize,
}

#[derive(Debug, Deserialize)]
struct WireTransaction {
    transaction_id: String,
    date: NaiveDate,
    amount: f64,
    name: Option<String>,
    merchant_name: Option<String>,
    #[serde(default)]
    pending: bool,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn message(self) -> String {
        match (self.error_code, self.error_message) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            (None, Some(message)) => message,
            (Some(code), None) => code,
            (None, None) => "feed error".to_string(),
        }
    }
}

/// Outflow-positive float to engine cents, outflow negative.
fn to_money(amount: f64) -> Result<Money, FeedError> {
    let cents = Decimal::from_f64_retain(amount)
        .map(|d| (d * Decimal::ONE_HUNDRED).round())
        .and_then(|d| d.to_i64())
        .ok_or_else(|| FeedError::Malformed(format!("amount out of range: {amount}")))?;
    Ok(Money::new(-cents))
}

fn to_feed_transaction(raw: serde_json::Value) -> Result<FeedTransaction, FeedError> {
    let wire: WireTransaction = serde_json::from_value(raw.clone())
        .map_err(|err| FeedError::Malformed(format!("transaction: {err}")))?;
    let description = wire
        .merchant_name
        .filter(|m| !m.trim().is_empty())
        .or(wire.name)
        .unwrap_or_default();
    Ok(FeedTransaction {
        external_id: wire.transaction_id,
        date: wire.date,
        amount: to_money(wire.amount)?,
        description,
        pending: wire.pending,
        raw,
    })
}

/// Converts one response into a page. The cursor is the next offset.
pub(crate) fn into_page(
    response: TransactionsResponse,
    offset: usize,
) -> Result<FeedPage, FeedError> {
    let received = response.transactions.len();
    let transactions = response
        .transactions
        .into_iter()
        .map(to_feed_transaction)
        .collect::<Result<Vec<_>, _>>()?;
    let next = offset + received;
    let next_cursor = (received > 0 && next < response.total_transactions).then(|| next.to_string());
    Ok(FeedPage {
        transactions,
        next_cursor,
    })
}

pub(crate) fn parse_cursor(cursor: Option<&str>) -> Result<usize, FeedError> {
    match cursor {
        None => Ok(0),
        Some(raw) => raw
            .parse()
            .map_err(|_| FeedError::Malformed(format!("invalid cursor: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: serde_json::Value) -> TransactionsResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn outflows_become_negative_cents() {
        let page = into_page(
            response(json!({
                "transactions": [
                    {
                        "transaction_id": "tx-1",
                        "account_id": "acc-1",
                        "date": "2024-03-02",
                        "amount": 42.5,
                        "name": "GROCER 123",
                        "merchant_name": "Grocer",
                        "pending": false
                    },
                    {
                        "transaction_id": "tx-2",
                        "date": "2024-03-03",
                        "amount": -2500.1,
                        "name": "PAYROLL",
                        "merchant_name": null
                    }
                ],
                "total_transactions": 2
            })),
            0,
        )
        .unwrap();

        assert_eq!(page.next_cursor, None);
        assert_eq!(page.transactions[0].amount, Money::new(-4_250));
        assert_eq!(page.transactions[0].description, "Grocer");
        assert_eq!(page.transactions[1].amount, Money::new(250_010));
        assert_eq!(page.transactions[1].description, "PAYROLL");
        assert!(!page.transactions[1].pending);
        assert_eq!(page.transactions[0].raw["account_id"], "acc-1");
    }

    #[test]
    fn cursor_advances_by_received_count() {
        let page = into_page(
            response(json!({
                "transactions": [
                    { "transaction_id": "a", "date": "2024-03-02", "amount": 1.0, "pending": true }
                ],
                "total_transactions": 10
            })),
            4,
        )
        .unwrap();
        assert_eq!(page.next_cursor.as_deref(), Some("5"));
        assert!(page.transactions[0].pending);
        assert_eq!(parse_cursor(page.next_cursor.as_deref()).unwrap(), 5);
    }

    #[test]
    fn malformed_items_are_reported() {
        let err = into_page(
            response(json!({
                "transactions": [{ "transaction_id": "a", "date": "yesterday", "amount": 1.0 }],
                "total_transactions": 1
            })),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
        assert!(parse_cursor(Some("abc")).is_err());
    }

    #[test]
    fn error_body_message_prefers_code_and_text() {
        let body: ErrorBody = serde_json::from_value(json!({
            "error_code": "ITEM_LOGIN_REQUIRED",
            "error_message": "the login details of this item have changed"
        }))
        .unwrap();
        assert_eq!(
            body.message(),
            "ITEM_LOGIN_REQUIRED: the login details of this item have changed"
        );
    }
}
