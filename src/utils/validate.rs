use std::borrow::Cow;
use std::sync::LazyLock;

use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use regex::Regex;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Optional country code followed by 6 to 15 digits.
pub static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+\d{1,3})?(\d{6,15})$").expect("phone number pattern is valid")
});

pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Password policy: minimum length plus at least one digit, one lowercase
/// letter, one uppercase letter and one non-alphanumeric character.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= PASSWORD_MIN_LENGTH;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lower = password.chars().any(char::is_lowercase);
    let has_upper = password.chars().any(char::is_uppercase);
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    if long_enough && has_digit && has_lower && has_upper && has_symbol {
        return Ok(());
    }
    Err(ValidationError::new("password_policy").with_message(Cow::Owned(format!(
        "Password must be at least {} characters and contain a digit, a lowercase letter, \
         an uppercase letter and a non-alphanumeric character.",
        PASSWORD_MIN_LENGTH
    ))))
}

/// JSON body extractor that runs `validator` rules before the handler sees
/// the value. Malformed JSON becomes `BadRequest`, rule violations become
/// `ValidationErrors`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct TestBody {
        #[validate(length(min = 3, max = 20, message = "Username must be between 3 and 20 characters"))]
        user_name: String,
        #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number."))]
        contact_number: String,
        #[validate(custom(function = "validate_password_strength"))]
        password: String,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_phone_pattern() {
        assert!(PHONE_REGEX.is_match("123456789"));
        assert!(PHONE_REGEX.is_match("+44123456789"));
        assert!(!PHONE_REGEX.is_match("12345"));
        assert!(!PHONE_REGEX.is_match("+1234-5678"));
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password_strength("Secret#123").is_ok());
        assert!(validate_password_strength("Sh#1rt").is_err());
        assert!(validate_password_strength("secret#123").is_err());
        assert!(validate_password_strength("SECRET#123").is_err());
        assert!(validate_password_strength("Secret1234").is_err());
        assert!(validate_password_strength("Secret#abc").is_err());
    }

    #[tokio::test]
    async fn test_valid_body() {
        let request = json_request(
            r#"{"userName":"alice","contactNumber":"123456789","password":"Secret#123"}"#,
        );
        let ValidatedJson(body) = ValidatedJson::<TestBody>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(body.user_name, "alice");
    }

    #[tokio::test]
    async fn test_every_failing_field_is_reported() {
        let request =
            json_request(r#"{"userName":"al","contactNumber":"abc","password":"weak"}"#);
        match ValidatedJson::<TestBody>::from_request(request, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["contactNumber", "password", "userName"]);
            }
            other => panic!("Expected ValidationErrors error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = json_request(r#"{"userName": "#);
        match ValidatedJson::<TestBody>::from_request(request, &()).await {
            Err(AppError::BadRequest { message }) => assert!(!message.is_empty()),
            other => panic!("Expected BadRequest error, got {:?}", other),
        }
    }
}
