/// Store settings forms: profile/locale, GST records, social links

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{blank_to_none, check_batch, merge, not_blank, rule_error, FieldError, Form};
use crate::models::store::{GstNumber, SocialMediaLink, StoreProfile};

lazy_static! {
    static ref GSTIN: Regex =
        Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z]{1}[1-9A-Z]{1}Z[0-9A-Z]{1}$")
            .expect("GSTIN pattern is valid");
    static ref TEN_DIGITS: Regex = Regex::new(r"^[0-9]{10}$").expect("phone pattern is valid");
}

/// True when `number` is a well-formed 15 character GSTIN
pub fn is_valid_gstin(number: &str) -> bool {
    number.len() == 15 && GSTIN.is_match(number)
}

fn valid_store_status(value: &str) -> Result<(), ValidationError> {
    match value {
        "active" | "inactive" => Ok(()),
        _ => Err(rule_error("in", "Status must be active or inactive")),
    }
}

fn valid_placement(value: &str) -> Result<(), ValidationError> {
    match value {
        "before" | "after" => Ok(()),
        _ => Err(rule_error("in", "Currency placement must be before or after")),
    }
}

fn default_placement() -> String {
    "before".to_string()
}

fn default_thousand_separator() -> String {
    ",".to_string()
}

fn default_decimal_separator() -> String {
    ".".to_string()
}

fn default_date_format() -> String {
    "d-m-Y".to_string()
}

fn default_time_format() -> String {
    "H:i:s".to_string()
}

fn default_decimals() -> i32 {
    2
}

/// Profile and locale settings (all tabs of the settings screen)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreProfileForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name may not be greater than 255 characters")
    )]
    pub name: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Slug may not be greater than 255 characters")
    )]
    pub slug: String,

    #[validate(custom(function = "not_blank"))]
    pub description: String,

    #[validate(custom(function = "valid_store_status"))]
    pub status: String,

    #[serde(rename = "type")]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "Type may not be greater than 100 characters")
    )]
    pub store_type: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Address may not be greater than 255 characters")
    )]
    pub address: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "City may not be greater than 100 characters")
    )]
    pub city: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "Country may not be greater than 100 characters")
    )]
    pub country: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 20, message = "Zip may not be greater than 20 characters")
    )]
    pub zip: String,

    pub phone: Option<String>,

    #[validate(length(max = 50, message = "Mobile may not be greater than 50 characters"))]
    pub mobile: Option<String>,

    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Email may not be greater than 255 characters"),
        email(message = "Email must be a valid email address")
    )]
    pub email: String,

    #[validate(
        length(max = 512, message = "Website may not be greater than 512 characters"),
        url(message = "Website must be a valid URL")
    )]
    pub website: Option<String>,

    #[validate(length(max = 64, message = "Time zone may not be greater than 64 characters"))]
    pub time_zone: Option<String>,

    #[validate(
        custom(function = "not_blank"),
        length(max = 10, message = "Currency may not be greater than 10 characters")
    )]
    pub currency: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 10, message = "Currency symbol may not be greater than 10 characters")
    )]
    pub currency_symbol: String,

    #[serde(default = "default_placement")]
    #[validate(custom(function = "valid_placement"))]
    pub currency_placement: String,

    #[serde(default = "default_thousand_separator")]
    #[validate(length(max = 1, message = "Thousand separator must be a single character"))]
    pub thousand_separator: String,

    #[serde(default = "default_decimal_separator")]
    #[validate(length(max = 1, message = "Decimal separator must be a single character"))]
    pub decimal_separator: String,

    #[serde(default = "default_date_format")]
    #[validate(length(max = 32, message = "Date format may not be greater than 32 characters"))]
    pub date_format: String,

    #[serde(default = "default_time_format")]
    #[validate(length(max = 32, message = "Time format may not be greater than 32 characters"))]
    pub time_format: String,

    #[serde(default = "default_decimals")]
    #[validate(range(min = 0, max = 4, message = "Number of decimals must be between 0 and 4"))]
    pub no_of_decimals: i32,
}

impl Form for StoreProfileForm {
    fn check(&self) -> Result<(), Vec<FieldError>> {
        let mut extra = Vec::new();
        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            if !TEN_DIGITS.is_match(phone.trim()) {
                extra.push(FieldError::new("phone", "Phone must be exactly 10 digits"));
            }
        }
        merge(self.validate(), extra)
    }
}

impl StoreProfileForm {
    pub fn into_profile(self) -> StoreProfile {
        StoreProfile {
            name: self.name.trim().to_string(),
            slug: self.slug.trim().to_string(),
            description: self.description,
            status: self.status,
            store_type: self.store_type.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            country: self.country.trim().to_string(),
            zip: self.zip.trim().to_string(),
            phone: blank_to_none(self.phone),
            mobile: blank_to_none(self.mobile),
            email: self.email.trim().to_string(),
            website: blank_to_none(self.website),
            time_zone: blank_to_none(self.time_zone),
            currency: self.currency.trim().to_string(),
            currency_symbol: self.currency_symbol.trim().to_string(),
            currency_placement: self.currency_placement,
            thousand_separator: self.thousand_separator,
            decimal_separator: self.decimal_separator,
            date_format: self.date_format,
            time_format: self.time_format,
            no_of_decimals: self.no_of_decimals,
        }
    }
}

/// One GST record from the GST sub-editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GstNumberForm {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[serde(alias = "value")]
    #[validate(custom(function = "not_blank"))]
    pub number: String,

    #[serde(default, alias = "show_in_invoice")]
    pub show_in_invoice: bool,
}

impl GstNumberForm {
    /// Runs the shared rules, adding the GSTIN format check when `strict`
    pub fn check_with(&self, strict: bool) -> Result<(), Vec<FieldError>> {
        let mut extra = Vec::new();
        let number = self.number.trim();
        if strict && !number.is_empty() && !is_valid_gstin(number) {
            extra.push(FieldError::new(
                "number",
                "GST number must be a valid 15 character GSTIN",
            ));
        }
        merge(self.validate(), extra)
    }
}

impl From<GstNumberForm> for GstNumber {
    fn from(form: GstNumberForm) -> Self {
        GstNumber {
            name: form.name.trim().to_string(),
            number: form.number.trim().to_string(),
            show_in_invoice: form.show_in_invoice,
        }
    }
}

/// One link from the social media sub-editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SocialMediaLinkForm {
    #[serde(alias = "name")]
    #[validate(custom(function = "not_blank"))]
    pub platform: String,

    #[serde(alias = "link")]
    #[validate(
        custom(function = "not_blank"),
        url(message = "Link must be a valid URL")
    )]
    pub url: String,
}

impl Form for SocialMediaLinkForm {}

impl From<SocialMediaLinkForm> for SocialMediaLink {
    fn from(form: SocialMediaLinkForm) -> Self {
        SocialMediaLink {
            platform: form.platform.trim().to_string(),
            url: form.url.trim().to_string(),
        }
    }
}

/// Wholesale replacement of the social list: `{ "socialMediaLinks": [...] }`
///
/// An empty list is allowed and clears every link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMediaLinksForm {
    pub social_media_links: Vec<SocialMediaLinkForm>,
}

impl SocialMediaLinksForm {
    pub fn check(&self) -> Result<(), Vec<FieldError>> {
        if self.social_media_links.is_empty() {
            return Ok(());
        }
        check_batch(&self.social_media_links, "socialMediaLinks", |link| link.check())
    }

    pub fn into_links(self) -> Vec<SocialMediaLink> {
        self.social_media_links.into_iter().map(Into::into).collect()
    }
}
