/// User forms: create, update, status change, bulk delete

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{blank_to_none, merge, not_blank, rule_error, FieldError, Form};
use crate::models::user::{CreateUser, Gender, UpdateUser, UserStatus};
use crate::models::ParseEnumError;

fn valid_gender(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Gender>()
        .map(|_| ())
        .map_err(|_| rule_error("in", "Gender must be male or female"))
}

fn valid_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<UserStatus>()
        .map(|_| ())
        .map_err(|_| rule_error("in", "Status must be active, inactive or pending"))
}

/// New user, as submitted in the multipart create form
///
/// The avatar file travels next to these fields and is checked by
/// `storage::upload::validate_image`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateUserForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "Username may not be greater than 50 characters")
    )]
    pub username: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "User code may not be greater than 50 characters")
    )]
    pub user_code: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "First name may not be greater than 50 characters")
    )]
    pub first_name: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "Last name may not be greater than 50 characters")
    )]
    pub last_name: String,

    #[validate(length(max = 50, message = "Phone may not be greater than 50 characters"))]
    pub phone: Option<String>,

    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "Email may not be greater than 50 characters"),
        email(message = "Email must be a valid email address")
    )]
    pub email: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "Password may not be greater than 50 characters")
    )]
    pub password: String,

    #[validate(must_match(other = "password", message = "The passwords do not match"))]
    pub confirm_password: String,

    #[validate(custom(function = "valid_gender"))]
    pub gender: String,

    #[validate(length(max = 255, message = "Address may not be greater than 255 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 100, message = "City may not be greater than 100 characters"))]
    pub city: Option<String>,
}

impl Form for CreateUserForm {}

impl CreateUserForm {
    /// Converts a checked form into the model input
    pub fn into_create_user(
        self,
        password_hash: String,
        avatar: Option<String>,
    ) -> Result<CreateUser, ParseEnumError> {
        let gender: Gender = self.gender.parse()?;
        Ok(CreateUser {
            user_code: self.user_code.trim().to_string(),
            username: self.username.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password_hash,
            gender,
            avatar: avatar.or_else(|| Some(gender.default_avatar())),
            phone: blank_to_none(self.phone),
            address: blank_to_none(self.address),
            city: blank_to_none(self.city),
        })
    }
}

/// Partial profile update
///
/// Absent fields are left alone. For the nullable columns (phone, address,
/// city, state, zip, country) an empty string clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "Username may not be greater than 50 characters")
    )]
    pub username: Option<String>,

    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "User code may not be greater than 50 characters")
    )]
    pub user_code: Option<String>,

    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "First name may not be greater than 50 characters")
    )]
    pub first_name: Option<String>,

    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "Last name may not be greater than 50 characters")
    )]
    pub last_name: Option<String>,

    #[validate(
        length(max = 50, message = "Email may not be greater than 50 characters"),
        email(message = "Email must be a valid email address")
    )]
    pub email: Option<String>,

    #[validate(length(max = 50, message = "Phone may not be greater than 50 characters"))]
    pub phone: Option<String>,

    pub gender: Option<String>,

    #[validate(length(max = 255, message = "Address may not be greater than 255 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 100, message = "City may not be greater than 100 characters"))]
    pub city: Option<String>,

    #[validate(length(max = 100, message = "State may not be greater than 100 characters"))]
    pub state: Option<String>,

    #[validate(length(max = 20, message = "Zip may not be greater than 20 characters"))]
    pub zip: Option<String>,

    #[validate(length(max = 100, message = "Country may not be greater than 100 characters"))]
    pub country: Option<String>,
}

impl Form for UpdateUserForm {
    fn check(&self) -> Result<(), Vec<FieldError>> {
        let mut extra = Vec::new();
        if let Some(gender) = &self.gender {
            if gender.parse::<Gender>().is_err() {
                extra.push(FieldError::new("gender", "Gender must be male or female"));
            }
        }
        merge(self.validate(), extra)
    }
}

impl UpdateUserForm {
    pub fn into_update_user(self) -> Result<UpdateUser, ParseEnumError> {
        let gender = self.gender.as_deref().map(str::parse::<Gender>).transpose()?;
        Ok(UpdateUser {
            user_code: self.user_code.map(|v| v.trim().to_string()),
            username: self.username.map(|v| v.trim().to_string()),
            first_name: self.first_name.map(|v| v.trim().to_string()),
            last_name: self.last_name.map(|v| v.trim().to_string()),
            email: self.email.map(|v| v.trim().to_string()),
            password_hash: None,
            gender,
            phone: self.phone.map(|v| blank_to_none(Some(v))),
            address: self.address.map(|v| blank_to_none(Some(v))),
            city: self.city.map(|v| blank_to_none(Some(v))),
            state: self.state.map(|v| blank_to_none(Some(v))),
            zip: self.zip.map(|v| blank_to_none(Some(v))),
            country: self.country.map(|v| blank_to_none(Some(v))),
        })
    }
}

/// Status toggle
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStatusForm {
    #[validate(custom(function = "valid_status"))]
    pub status: String,
}

impl Form for UpdateStatusForm {}

impl UpdateStatusForm {
    pub fn status(&self) -> Result<UserStatus, ParseEnumError> {
        self.status.parse()
    }
}

/// Bulk soft delete by id set
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkDeleteForm {
    #[validate(length(min = 1, message = "Select at least one user"))]
    pub ids: Vec<Uuid>,
}

impl Form for BulkDeleteForm {}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> CreateUserForm {
        CreateUserForm {
            username: "jdoe".to_string(),
            user_code: "EMP-001".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            email: "john@example.com".to_string(),
            password: "correct horse".to_string(),
            confirm_password: "correct horse".to_string(),
            gender: "male".to_string(),
            address: None,
            city: Some("Pune".to_string()),
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_create_form_passes() {
        assert!(valid_create().check().is_ok());
    }

    #[test]
    fn test_create_form_reports_each_field() {
        let form = CreateUserForm {
            username: "x".repeat(51),
            email: "not-an-email".to_string(),
            confirm_password: "different".to_string(),
            gender: "other".to_string(),
            ..valid_create()
        };

        let errors = form.check().unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["confirm_password", "email", "gender", "username"]
        );
    }

    #[test]
    fn test_create_form_requires_fields() {
        let errors = CreateUserForm::default().check().unwrap_err();
        let fields = fields(&errors);
        for required in ["username", "user_code", "first_name", "last_name", "email", "password", "gender"] {
            assert!(fields.contains(&required), "missing error for {}", required);
        }
    }

    #[test]
    fn test_into_create_user_uses_gender_placeholder() {
        let form = CreateUserForm {
            gender: "female".to_string(),
            phone: Some("   ".to_string()),
            ..valid_create()
        };

        let user = form.into_create_user("hash".to_string(), None).unwrap();
        assert_eq!(user.gender, Gender::Female);
        assert_eq!(user.avatar.as_deref(), Some("avatars/default/female.png"));
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_into_create_user_keeps_uploaded_avatar() {
        let user = valid_create()
            .into_create_user("hash".to_string(), Some("avatars/1-abcd.png".to_string()))
            .unwrap();
        assert_eq!(user.avatar.as_deref(), Some("avatars/1-abcd.png"));
    }

    #[test]
    fn test_update_form_empty_string_clears_nullable() {
        let form = UpdateUserForm {
            city: Some(String::new()),
            first_name: Some("Jane".to_string()),
            ..Default::default()
        };
        assert!(form.check().is_ok());

        let update = form.into_update_user().unwrap();
        assert_eq!(update.city, Some(None));
        assert_eq!(update.first_name.as_deref(), Some("Jane"));
        assert!(update.phone.is_none());
    }

    #[test]
    fn test_update_form_rejects_bad_gender_and_empty_name() {
        let form = UpdateUserForm {
            gender: Some("robot".to_string()),
            username: Some(String::new()),
            ..Default::default()
        };

        let errors = form.check().unwrap_err();
        assert_eq!(fields(&errors), vec!["gender", "username"]);
    }

    #[test]
    fn test_update_form_rejects_whitespace_names() {
        let form = UpdateUserForm {
            username: Some("   ".to_string()),
            user_code: Some("\t".to_string()),
            first_name: Some(" ".to_string()),
            last_name: Some("  ".to_string()),
            ..Default::default()
        };

        let errors = form.check().unwrap_err();
        assert_eq!(fields(&errors), vec!["first_name", "last_name", "user_code", "username"]);
        assert!(errors.iter().all(|e| e.message == "This field is required"));
    }

    #[test]
    fn test_update_form_lengths_follow_columns() {
        let form = UpdateUserForm {
            zip: Some("9".repeat(30)),
            city: Some("c".repeat(101)),
            address: Some("a".repeat(255)),
            ..Default::default()
        };

        let errors = form.check().unwrap_err();
        assert_eq!(fields(&errors), vec!["city", "zip"]);
    }

    #[test]
    fn test_create_form_limits_address() {
        let form = CreateUserForm {
            address: Some("a".repeat(256)),
            ..valid_create()
        };
        assert_eq!(fields(&form.check().unwrap_err()), vec!["address"]);
    }

    #[test]
    fn test_status_form() {
        let ok = UpdateStatusForm {
            status: "inactive".to_string(),
        };
        assert!(ok.check().is_ok());
        assert_eq!(ok.status().unwrap(), UserStatus::Inactive);

        let bad = UpdateStatusForm {
            status: "banned".to_string(),
        };
        assert_eq!(bad.check().unwrap_err()[0].field, "status");
    }

    #[test]
    fn test_bulk_delete_requires_ids() {
        let form = BulkDeleteForm { ids: vec![] };
        let errors = form.check().unwrap_err();
        assert_eq!(errors, vec![FieldError::new("ids", "Select at least one user")]);
    }
}
