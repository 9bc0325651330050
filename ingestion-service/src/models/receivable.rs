//! Receivable documents (invoices and credit notes) in their storage form.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::FromRow;
use thiserror::Error;

/// Which receivable table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
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

    /// Route prefix the kind is served under.
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

/// Business-rule violations collected for one record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join(", "))]
pub struct RuleViolations {
    pub reference: String,
    pub messages: Vec<String>,
}

/// A receivable document as persisted. `reference` is the primary key and never changes.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Receivable {
    pub reference: String,
    pub currency_code: String,
    pub issue_date: NaiveDate,
    pub opening_value: Decimal,
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

    /// Check the date invariants. Every rule runs; all failures are reported.
    pub fn validate(&self, kind: RecordKind) -> Result<(), RuleViolations> {
        let messages: Vec<String> = [self.check_due_date(kind), self.check_closed_date(kind)]
            .into_iter()
            .flatten()
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            Err(RuleViolations {
                reference: self.reference.clone(),
                messages,
            })
        }
    }

    fn check_due_date(&self, kind: RecordKind) -> Option<String> {
        (self.due_date < self.issue_date).then(|| {
            format!(
                "{}:{} - DueDate should not be lower than IssueDate",
                kind.label(),
                self.reference
            )
        })
    }

    fn check_closed_date(&self, kind: RecordKind) -> Option<String> {
        match self.closed_date {
            Some(closed) if closed < self.issue_date => Some(format!(
                "{}:{} - ClosedDate should not be lower than IssueDate",
                kind.label(),
                self.reference
            )),
            _ => None,
        }
    }
}
