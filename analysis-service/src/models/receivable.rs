use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Invoice,
    CreditNote,
}

impl RecordKind {
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Invoice => "invoices",
            RecordKind::CreditNote => "credit_notes",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            RecordKind::Invoice => "/invoice",
            RecordKind::CreditNote => "/creditnote",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Invoice => "Invoice",
            RecordKind::CreditNote => "CreditNote",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Invoice => "invoice",
            RecordKind::CreditNote => "credit_note",
        }
    }
}

/// Read model of a stored receivable. Dates serialise as `yyyy-MM-dd`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Receivable {
    pub reference: String,
    pub currency_code: String,
    pub issue_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub opening_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_value: Decimal,
    pub due_date: NaiveDate,
    pub closed_date: Option<NaiveDate>,
    pub cancelled: Option<bool>,
    pub debtor_name: String,
    pub debtor_reference: String,
    pub debtor_country_code: String,
    pub debtor_address1: Option<String>,
    pub debtor_address2: Option<String>,
    pub debtor_town: Option<String>,
    pub debtor_state: Option<String>,
    pub debtor_zip: Option<String>,
    pub debtor_registration_number: Option<String>,
}

impl Receivable {
    pub fn is_open(&self) -> bool {
        self.closed_date.is_none()
    }
}
