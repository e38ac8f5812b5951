//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::forms::{self, FieldErrors, FieldMeta, ModelForm};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    /// Book genre (e.g. Science Fiction, French Poetry etc.)
    pub name: String,
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

const FIELDS: &[FieldMeta] = &[FieldMeta {
    name: "name",
    verbose_name: "name",
    max_length: Some(200),
}];

/// Genre create form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct GenreForm {
    #[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
    pub name: String,
}

impl ModelForm for GenreForm {
    fn fields() -> &'static [FieldMeta] {
        FIELDS
    }
}

impl GenreForm {
    /// Trimmed genre name
    pub fn clean(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::new();
        let name = forms::clean_text("name", &self.name, &mut errors);
        errors.extend_validation(GenreForm { name: name.clone() }.validate());
        if errors.is_empty() {
            Ok(name)
        } else {
            Err(errors)
        }
    }
}
