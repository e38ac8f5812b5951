//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book::Book;
use crate::forms::{self, FieldErrors, FieldMeta, ModelForm};

/// Declared author fields, in form order
pub const AUTHOR_FIELDS: &[FieldMeta] = &[
    FieldMeta {
        name: "first_name",
        verbose_name: "first name",
        max_length: Some(100),
    },
    FieldMeta {
        name: "last_name",
        verbose_name: "last name",
        max_length: Some(100),
    },
    FieldMeta {
        name: "date_of_birth",
        verbose_name: "date of birth",
        max_length: None,
    },
    FieldMeta {
        name: "date_of_death",
        verbose_name: "died",
        max_length: None,
    },
];

/// Author model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Canonical detail page
    pub fn get_absolute_url(&self) -> String {
        author_url(self.id)
    }
}

pub fn author_url(id: i32) -> String {
    format!("/catalog/author/{}", id)
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.last_name, self.first_name)
    }
}

/// Author detail page context
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<Book>,
}

/// Cleaned author fields, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorData {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Author create/update form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct AuthorForm {
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub first_name: String,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub last_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl ModelForm for AuthorForm {
    fn fields() -> &'static [FieldMeta] {
        AUTHOR_FIELDS
    }
}

impl AuthorForm {
    /// Blank create form
    pub fn initial() -> Self {
        Self {
            date_of_birth: "1970-01-30".to_string(),
            ..Default::default()
        }
    }

    pub fn clean(&self) -> Result<AuthorData, FieldErrors> {
        let mut errors = FieldErrors::new();
        let first_name = forms::clean_text("first_name", &self.first_name, &mut errors);
        let last_name = forms::clean_text("last_name", &self.last_name, &mut errors);
        errors.extend_validation(
            AuthorForm {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                ..Default::default()
            }
            .validate(),
        );
        let date_of_birth =
            forms::clean_optional_date("date_of_birth", &self.date_of_birth, &mut errors);
        let date_of_death =
            forms::clean_optional_date("date_of_death", &self.date_of_death, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(AuthorData {
            first_name,
            last_name,
            date_of_birth,
            date_of_death,
        })
    }
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: format_date(author.date_of_birth),
            date_of_death: format_date(author.date_of_death),
        }
    }
}

pub(crate) fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big_bob() -> Author {
        Author {
            id: 1,
            first_name: "Big".into(),
            last_name: "Bob".into(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(AuthorForm::field("first_name").unwrap().verbose_name, "first name");
        assert_eq!(AuthorForm::field("last_name").unwrap().verbose_name, "last name");
        assert_eq!(AuthorForm::field("date_of_birth").unwrap().verbose_name, "date of birth");
        assert_eq!(AuthorForm::field("date_of_death").unwrap().verbose_name, "died");
        assert!(AuthorForm::field("nickname").is_none());
    }

    #[test]
    fn test_name_max_length() {
        assert_eq!(AuthorForm::field("first_name").unwrap().max_length, Some(100));
        assert_eq!(AuthorForm::field("last_name").unwrap().max_length, Some(100));
    }

    #[test]
    fn test_object_name_is_last_name_first_name() {
        assert_eq!(big_bob().to_string(), "Bob Big");
    }

    #[test]
    fn test_get_absolute_url() {
        assert_eq!(big_bob().get_absolute_url(), "/catalog/author/1");
    }

    #[test]
    fn test_initial_form_date_of_birth() {
        assert_eq!(AuthorForm::initial().date_of_birth, "1970-01-30");
    }

    #[test]
    fn test_clean_author_form() {
        let form = AuthorForm {
            first_name: " Ursula ".into(),
            last_name: "Le Guin".into(),
            date_of_birth: "1929-10-21".into(),
            date_of_death: "".into(),
        };
        let data = form.clean().unwrap();
        assert_eq!(data.first_name, "Ursula");
        assert_eq!(data.date_of_birth, NaiveDate::from_ymd_opt(1929, 10, 21));
        assert_eq!(data.date_of_death, None);
    }

    #[test]
    fn test_clean_author_form_errors() {
        let form = AuthorForm {
            first_name: "x".repeat(101),
            last_name: "".into(),
            date_of_birth: "yesterday".into(),
            date_of_death: "".into(),
        };
        let errors = form.clean().unwrap_err();
        assert!(errors.has("first_name"));
        assert_eq!(errors.get("last_name"), Some(&[forms::REQUIRED.to_string()][..]));
        assert_eq!(errors.get("date_of_birth"), Some(&[forms::INVALID_DATE.to_string()][..]));
        assert!(!errors.has("date_of_death"));
    }

    #[test]
    fn test_form_from_author() {
        let mut author = big_bob();
        author.date_of_birth = NaiveDate::from_ymd_opt(1950, 3, 1);
        let form = AuthorForm::from(&author);
        assert_eq!(form.date_of_birth, "1950-03-01");
        assert_eq!(form.date_of_death, "");
    }
}
