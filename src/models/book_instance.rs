//! Book instance (loanable copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::author::format_date;
use crate::forms::{self, FieldErrors, FieldMeta, ModelForm};

/// Availability of a copy, stored as a one-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[default]
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (TEXT column holding the code)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<Postgres>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.code(), buf)
    }
}

const INSTANCE_FIELDS: &[FieldMeta] = &[
    FieldMeta {
        name: "imprint",
        verbose_name: "imprint",
        max_length: Some(200),
    },
    FieldMeta {
        name: "due_back",
        verbose_name: "due back",
        max_length: None,
    },
    FieldMeta {
        name: "status",
        verbose_name: "status",
        max_length: Some(1),
    },
    FieldMeta {
        name: "borrower",
        verbose_name: "borrower",
        max_length: None,
    },
];

/// Book instance model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    /// Unique ID for this particular book across whole library
    pub id: Uuid,
    pub book_id: Option<i32>,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    /// Book availability
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

impl BookInstance {
    /// A copy is overdue once its due date has passed
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.due_back.map(|due| today > due).unwrap_or(false)
    }
}

/// Book instance joined with its book title and borrower, as shown in lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstanceDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub instance: BookInstance,
    pub book_title: Option<String>,
    pub borrower_username: Option<String>,
    // Computed by the service layer
    #[sqlx(default)]
    #[serde(default)]
    pub is_overdue: bool,
}

impl BookInstanceDetail {
    pub fn with_overdue(mut self, today: NaiveDate) -> Self {
        self.is_overdue = self.instance.is_overdue_on(today);
        self
    }
}

impl std::fmt::Display for BookInstanceDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({})",
            self.instance.id,
            self.book_title.as_deref().unwrap_or("-")
        )
    }
}

/// Filter for availability queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanFilter {
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

impl LoanFilter {
    /// Copies on loan to one borrower
    pub fn on_loan_to(borrower_id: i32) -> Self {
        Self {
            status: LoanStatus::OnLoan,
            borrower_id: Some(borrower_id),
        }
    }

    /// Copies on loan to anyone
    pub fn on_loan() -> Self {
        Self {
            status: LoanStatus::OnLoan,
            borrower_id: None,
        }
    }
}

/// Cleaned book instance fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstanceData {
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i32>,
}

/// Book instance create/update form
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookInstanceForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub imprint: String,
    pub due_back: String,
    pub status: String,
    pub borrower: String,
}

impl Default for BookInstanceForm {
    fn default() -> Self {
        Self {
            imprint: String::new(),
            due_back: String::new(),
            status: LoanStatus::default().code().to_string(),
            borrower: String::new(),
        }
    }
}

impl ModelForm for BookInstanceForm {
    fn fields() -> &'static [FieldMeta] {
        INSTANCE_FIELDS
    }
}

pub const REQUIRED_ON_LOAN: &str = "Required when the copy is on loan.";

impl BookInstanceForm {
    /// Syntactic cleaning plus the on-loan rule; the borrower's existence is checked by the caller
    pub fn clean(&self) -> Result<BookInstanceData, FieldErrors> {
        let mut errors = FieldErrors::new();
        let imprint = forms::clean_text("imprint", &self.imprint, &mut errors);
        errors.extend_validation(
            BookInstanceForm {
                imprint: imprint.clone(),
                ..Default::default()
            }
            .validate(),
        );
        let due_back = forms::clean_optional_date("due_back", &self.due_back, &mut errors);
        let borrower_id = forms::clean_optional_id("borrower", &self.borrower, &mut errors);

        let status = match self.status.trim() {
            "" => {
                errors.add("status", forms::REQUIRED);
                None
            }
            code => match code.parse::<LoanStatus>() {
                Ok(status) => Some(status),
                Err(_) => {
                    errors.add(
                        "status",
                        format!(
                            "Select a valid choice. {} is not one of the available choices.",
                            code
                        ),
                    );
                    None
                }
            },
        };

        if status == Some(LoanStatus::OnLoan) {
            if due_back.is_none() && !errors.has("due_back") {
                errors.add("due_back", REQUIRED_ON_LOAN);
            }
            if borrower_id.is_none() && !errors.has("borrower") {
                errors.add("borrower", REQUIRED_ON_LOAN);
            }
        }

        match status {
            Some(status) if errors.is_empty() => Ok(BookInstanceData {
                imprint,
                due_back,
                status,
                borrower_id,
            }),
            _ => Err(errors),
        }
    }
}

impl From<&BookInstance> for BookInstanceForm {
    fn from(instance: &BookInstance) -> Self {
        Self {
            imprint: instance.imprint.clone(),
            due_back: format_date(instance.due_back),
            status: instance.status.code().to_string(),
            borrower: instance
                .borrower_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Librarian renewal form
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RenewBookForm {
    /// Proposed due-back date
    pub renewal_date: String,
}

impl RenewBookForm {
    pub fn with_date(date: NaiveDate) -> Self {
        Self {
            renewal_date: format_date(Some(date)),
        }
    }
}

/// Renewal page context
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewalPage {
    pub form: RenewBookForm,
    pub errors: FieldErrors,
    pub help_text: String,
    pub bookinst: BookInstanceDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(status: LoanStatus, due_back: Option<NaiveDate>) -> BookInstance {
        BookInstance {
            id: Uuid::new_v4(),
            book_id: Some(1),
            imprint: "Gollancz, 2001".into(),
            due_back,
            status,
            borrower_id: None,
        }
    }

    #[test]
    fn test_loan_status_codes() {
        for status in LoanStatus::ALL {
            assert_eq!(status.code().parse::<LoanStatus>().unwrap(), status);
        }
        assert!("x".parse::<LoanStatus>().is_err());
        assert_eq!(LoanStatus::default(), LoanStatus::Maintenance);
        assert_eq!(serde_json::to_string(&LoanStatus::Available).unwrap(), "\"a\"");
    }

    #[test]
    fn test_is_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let yesterday = today.pred_opt();
        assert!(instance(LoanStatus::OnLoan, yesterday).is_overdue_on(today));
        assert!(!instance(LoanStatus::OnLoan, Some(today)).is_overdue_on(today));
        assert!(!instance(LoanStatus::Available, None).is_overdue_on(today));
    }

    #[test]
    fn test_display_uses_book_title() {
        let detail = BookInstanceDetail {
            instance: instance(LoanStatus::Available, None),
            book_title: Some("Dune".into()),
            borrower_username: None,
            is_overdue: false,
        };
        assert_eq!(detail.to_string(), format!("{} (Dune)", detail.instance.id));
    }

    #[test]
    fn test_on_loan_requires_due_back_and_borrower() {
        let form = BookInstanceForm {
            imprint: "Ace, 1965".into(),
            status: "o".into(),
            ..Default::default()
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("due_back"), Some(&[REQUIRED_ON_LOAN.to_string()][..]));
        assert_eq!(errors.get("borrower"), Some(&[REQUIRED_ON_LOAN.to_string()][..]));

        let form = BookInstanceForm {
            imprint: "Ace, 1965".into(),
            status: "o".into(),
            due_back: "2026-11-01".into(),
            borrower: "7".into(),
        };
        let data = form.clean().unwrap();
        assert_eq!(data.status, LoanStatus::OnLoan);
        assert_eq!(data.borrower_id, Some(7));
    }

    #[test]
    fn test_available_copy_needs_no_borrower() {
        let form = BookInstanceForm {
            imprint: "Ace, 1965".into(),
            status: "a".into(),
            ..Default::default()
        };
        let data = form.clean().unwrap();
        assert_eq!(data.borrower_id, None);
        assert_eq!(data.due_back, None);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let form = BookInstanceForm {
            imprint: "Ace, 1965".into(),
            status: "z".into(),
            ..Default::default()
        };
        assert!(form.clean().unwrap_err().has("status"));
    }
}
