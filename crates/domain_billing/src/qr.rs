//! QR payment requests
//!
//! A QR payment is a pending payment plus a text payload the payer's banking
//! app scans. The payload is a `|`-separated record:
//!
//! ```text
//! UNIVIDA-PAGO|<payment uuid>|<invoice number>|<amount>|<currency>
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, PaymentId};

use crate::invoice::Invoice;
use crate::payment::Payment;

const SCHEME: &str = "UNIVIDA-PAGO";

/// Scannable description of a pending payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    pub payment_id: PaymentId,
    pub invoice_number: String,
    pub amount: Decimal,
    pub currency: String,
}

impl QrPayload {
    pub fn for_payment(payment: &Payment, invoice: &Invoice, currency: &str) -> Self {
        Self {
            payment_id: payment.id,
            invoice_number: invoice.invoice_number.clone(),
            amount: payment.amount,
            currency: currency.to_string(),
        }
    }
}

impl fmt::Display for QrPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{:.2}|{}",
            SCHEME,
            self.payment_id.as_uuid(),
            self.invoice_number,
            self.amount,
            self.currency
        )
    }
}

impl FromStr for QrPayload {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoreError::validation(format!("malformed QR payload: {s}"));

        let parts: Vec<&str> = s.split('|').collect();
        let [scheme, payment_id, invoice_number, amount, currency] = parts[..] else {
            return Err(malformed());
        };
        if scheme != SCHEME {
            return Err(malformed());
        }

        Ok(Self {
            payment_id: payment_id.parse().map_err(|_| malformed())?,
            invoice_number: invoice_number.to_string(),
            amount: amount.parse().map_err(|_| malformed())?,
            currency: currency.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use core_kernel::PolicyId;
    use crate::payment::PaymentMethod;

    #[test]
    fn test_payload_text_and_parse() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let invoice =
            Invoice::with_due_window(PolicyId::new(), "FAC-20250201-0042".into(), dec!(350.5), day, 15)
                .unwrap();
        let payment = Payment::pending(invoice.id, dec!(350.5), PaymentMethod::Qr).unwrap();

        let payload = QrPayload::for_payment(&payment, &invoice, "BOB");
        let text = payload.to_string();
        assert!(text.starts_with("UNIVIDA-PAGO|"));
        assert!(text.ends_with("|FAC-20250201-0042|350.50|BOB"));

        let parsed: QrPayload = text.parse().unwrap();
        assert_eq!(parsed.payment_id, payment.id);
        assert_eq!(parsed.amount, dec!(350.50));
    }

    #[test]
    fn test_rejects_foreign_payload() {
        assert!("OTRO|x|y|1|BOB".parse::<QrPayload>().is_err());
        assert!("UNIVIDA-PAGO|only-two".parse::<QrPayload>().is_err());
    }
}
