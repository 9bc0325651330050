//! Wire representation of a receivable: camelCase JSON with `yyyy-MM-dd` date strings.

use std::borrow::Cow;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::{Validate, ValidationError};

use super::Receivable;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReceivableDto {
    #[validate(custom(function = "validate_not_blank", message = "Reference is required"))]
    pub reference: String,

    #[validate(length(equal = 3, message = "CurrencyCode must be exactly 3 characters"))]
    pub currency_code: String,

    #[validate(custom(function = "validate_date"))]
    pub issue_date: String,

    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_non_negative"))]
    pub opening_value: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_non_negative"))]
    pub paid_value: Decimal,

    #[validate(custom(function = "validate_date"))]
    pub due_date: String,

    #[serde(default)]
    #[validate(custom(function = "validate_date"))]
    pub closed_date: Option<String>,

    #[serde(default)]
    pub cancelled: Option<bool>,

    #[validate(custom(function = "validate_not_blank", message = "DebtorName is required"))]
    pub debtor_name: String,

    #[validate(custom(function = "validate_not_blank", message = "DebtorReference is required"))]
    pub debtor_reference: String,

    #[validate(length(equal = 2, message = "DebtorCountryCode must be exactly 2 characters"))]
    pub debtor_country_code: String,

    #[serde(default)]
    pub debtor_address1: Option<String>,
    #[serde(default)]
    pub debtor_address2: Option<String>,
    #[serde(default)]
    pub debtor_town: Option<String>,
    #[serde(default)]
    pub debtor_state: Option<String>,
    #[serde(default)]
    pub debtor_zip: Option<String>,
    #[serde(default)]
    pub debtor_registration_number: Option<String>,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn validate_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| {
            let mut err = ValidationError::new("date_format");
            err.message = Some(Cow::from(
                "Invalid date format. Expected format: yyyy-MM-dd",
            ));
            err
        })
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some(Cow::from("Value must not be negative"));
        return Err(err);
    }
    Ok(())
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        AppError::bad_request(format!(
            "{} '{}' is not a valid yyyy-MM-dd date",
            field, value
        ))
    })
}

impl TryFrom<ReceivableDto> for Receivable {
    type Error = AppError;

    fn try_from(dto: ReceivableDto) -> Result<Self, Self::Error> {
        Ok(Self {
            issue_date: parse_date("IssueDate", &dto.issue_date)?,
            due_date: parse_date("DueDate", &dto.due_date)?,
            closed_date: dto
                .closed_date
                .as_deref()
                .map(|d| parse_date("ClosedDate", d))
                .transpose()?,
            reference: dto.reference,
            currency_code: dto.currency_code,
            opening_value: dto.opening_value,
            paid_value: dto.paid_value,
            cancelled: dto.cancelled,
            debtor_name: dto.debtor_name,
            debtor_reference: dto.debtor_reference,
            debtor_country_code: dto.debtor_country_code,
            debtor_address1: dto.debtor_address1,
            debtor_address2: dto.debtor_address2,
            debtor_town: dto.debtor_town,
            debtor_state: dto.debtor_state,
            debtor_zip: dto.debtor_zip,
            debtor_registration_number: dto.debtor_registration_number,
        })
    }
}

impl From<Receivable> for ReceivableDto {
    fn from(record: Receivable) -> Self {
        Self {
            reference: record.reference,
            currency_code: record.currency_code,
            issue_date: record.issue_date.format(DATE_FORMAT).to_string(),
            opening_value: record.opening_value,
            paid_value: record.paid_value,
            due_date: record.due_date.format(DATE_FORMAT).to_string(),
            closed_date: record
                .closed_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            cancelled: record.cancelled,
            debtor_name: record.debtor_name,
            debtor_reference: record.debtor_reference,
            debtor_country_code: record.debtor_country_code,
            debtor_address1: record.debtor_address1,
            debtor_address2: record.debtor_address2,
            debtor_town: record.debtor_town,
            debtor_state: record.debtor_state,
            debtor_zip: record.debtor_zip,
            debtor_registration_number: record.debtor_registration_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "reference": "74283561-ba83-43b2-91da-3b2444cd44aa",
            "currencyCode": "EUR",
            "issueDate": "2023-11-01",
            "openingValue": 1001,
            "paidValue": 1000,
            "dueDate": "2023-11-30",
            "closedDate": "2023-11-30",
            "cancelled": false,
            "debtorName": "Random Bank",
            "debtorReference": "3d811c09-c951-446e-a976-3cc176aaa28c",
            "debtorCountryCode": "RO",
            "debtorAddress1": "Bucharest",
            "debtorTown": "Bucharest",
            "debtorZip": "123456"
        })
    }

    fn dto_with(field: &str, value: serde_json::Value) -> ReceivableDto {
        let mut body = payload();
        body[field] = value;
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn well_formed_payload_passes_validation() {
        let dto: ReceivableDto = serde_json::from_value(payload()).unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.debtor_address2, None);
    }

    #[test]
    fn optional_fields_may_be_omitted() {
        let mut body = payload();
        let map = body.as_object_mut().unwrap();
        map.remove("closedDate");
        map.remove("cancelled");
        map.remove("debtorAddress1");

        let dto: ReceivableDto = serde_json::from_value(body).unwrap();

        assert!(dto.validate().is_ok());
        assert!(dto.closed_date.is_none());
    }

    #[test]
    fn currency_code_must_be_three_characters() {
        let err = dto_with("currencyCode", json!("EURO")).validate().unwrap_err();
        assert!(err.to_string().contains("CurrencyCode must be exactly 3 characters"));
    }

    #[test]
    fn country_code_must_be_two_characters() {
        let err = dto_with("debtorCountryCode", json!("ROU"))
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("DebtorCountryCode"));
    }

    #[test]
    fn blank_reference_is_rejected() {
        assert!(dto_with("reference", json!("")).validate().is_err());
    }

    #[test]
    fn whitespace_only_required_strings_are_rejected() {
        for field in ["reference", "debtorName", "debtorReference"] {
            let err = dto_with(field, json!("   ")).validate().unwrap_err();
            assert!(err.to_string().contains("is required"), "{}: {}", field, err);
        }
        assert!(dto_with("reference", json!(" R1 ")).validate().is_ok());
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(dto_with("openingValue", json!(-1)).validate().is_err());
        assert!(dto_with("paidValue", json!(-0.01)).validate().is_err());
        assert!(dto_with("paidValue", json!(0)).validate().is_ok());
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(dto_with("issueDate", json!("01/11/2023")).validate().is_err());
        assert!(dto_with("dueDate", json!("2023-02-30")).validate().is_err());
        assert!(dto_with("closedDate", json!("tomorrow")).validate().is_err());
        assert!(dto_with("closedDate", serde_json::Value::Null).validate().is_ok());
    }

    #[test]
    fn converts_to_domain_and_back() {
        let dto: ReceivableDto = serde_json::from_value(payload()).unwrap();

        let record = Receivable::try_from(dto.clone()).unwrap();
        assert_eq!(record.issue_date, NaiveDate::from_ymd_opt(2023, 11, 1).unwrap());
        assert_eq!(record.closed_date, NaiveDate::from_ymd_opt(2023, 11, 30));
        assert_eq!(record.opening_value, Decimal::from(1001));

        assert_eq!(ReceivableDto::from(record), dto);
    }

    #[test]
    fn conversion_rejects_unparseable_dates() {
        let dto = dto_with("dueDate", json!("2023-13-01"));
        let err = Receivable::try_from(dto).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn serializes_dates_as_plain_strings() {
        let dto: ReceivableDto = serde_json::from_value(payload()).unwrap();
        let value = serde_json::to_value(&dto).unwrap();

        assert_eq!(value["issueDate"], "2023-11-01");
        assert_eq!(value["openingValue"].as_f64(), Some(1001.0));
        assert_eq!(value["debtorCountryCode"], "RO");
    }
}
