//! Form schemas shared by the create and edit flows.
//!
//! Forms carry raw user input. `clean` turns them into typed values or a
//! set of per-field messages the page can be redisplayed with.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::{Category, Location, Post};

/// Format used by `datetime-local` inputs.
pub const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

const TITLE_MAX_LEN: usize = 256;
const USERNAME_MAX_LEN: usize = 150;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice.";

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", fields.join("; "))
    }
}

/// Post create/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    /// `YYYY-MM-DDTHH:MM`, seconds and RFC 3339 are accepted too.
    #[serde(default)]
    pub pub_date: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub is_published: bool,
    #[serde(default, deserialize_with = "optional_id")]
    pub category: Option<Uuid>,
    #[serde(default, deserialize_with = "optional_id")]
    pub location: Option<Uuid>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Validated post form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPost {
    pub title: String,
    pub text: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub image: Option<String>,
}

impl PostForm {
    /// Blank form for a new post, dated `now`.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            pub_date: Some(now.format(DATETIME_INPUT_FORMAT).to_string()),
            ..Self::default()
        }
    }

    /// Form prefilled from an existing post.
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: Some(post.pub_date.format(DATETIME_INPUT_FORMAT).to_string()),
            is_published: post.is_published,
            category: post.category_id,
            location: post.location_id,
            image: post.image.clone(),
        }
    }

    /// Validate against the categories and locations authors may pick from.
    pub fn clean(
        &self,
        categories: &[Category],
        locations: &[Location],
    ) -> Result<CleanedPost, FormErrors> {
        let mut errors = FormErrors::default();

        let title = self.title.trim();
        if title.is_empty() {
            errors.add("title", REQUIRED);
        } else if title.chars().count() > TITLE_MAX_LEN {
            errors.add(
                "title",
                format!("Ensure this value has at most {TITLE_MAX_LEN} characters."),
            );
        }

        if self.text.trim().is_empty() {
            errors.add("text", REQUIRED);
        }

        let pub_date = match self.pub_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match parse_datetime(raw) {
                Some(date) => Some(date),
                None => {
                    errors.add("pub_date", "Enter a valid date/time.");
                    None
                }
            },
        };

        let category = choice(self.category, categories, |c| c.id, |c| c.is_published);
        if category.is_err() {
            errors.add("category", INVALID_CHOICE);
        }

        let location = choice(self.location, locations, |l| l.id, |l| l.is_published);
        if location.is_err() {
            errors.add("location", INVALID_CHOICE);
        }

        let image = self
            .image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        errors.into_result(CleanedPost {
            title: title.to_string(),
            text: self.text.clone(),
            pub_date,
            is_published: self.is_published,
            category: category.ok().flatten(),
            location: location.ok().flatten(),
            image,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Checkbox {
    Flag(bool),
    Text(String),
}

/// Accept JSON booleans as well as the `on` an HTML checkbox submits.
fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Checkbox::deserialize(deserializer)? {
        Checkbox::Flag(flag) => flag,
        Checkbox::Text(text) => matches!(text.as_str(), "on" | "true" | "1"),
    })
}

/// An empty `<select>` submits `""`, which means no choice.
fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Uuid>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => Uuid::parse_str(id).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Resolve an optional foreign key against the published choices.
fn choice<T: Clone>(
    selected: Option<Uuid>,
    options: &[T],
    id: impl Fn(&T) -> Uuid,
    is_published: impl Fn(&T) -> bool,
) -> Result<Option<T>, ()> {
    match selected {
        None => Ok(None),
        Some(selected) => options
            .iter()
            .find(|o| id(o) == selected && is_published(o))
            .cloned()
            .map(Some)
            .ok_or(()),
    }
}

/// Parse a submitted date. Naive values are read as UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    [DATETIME_INPUT_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        let text = self.text.trim();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }
        errors.into_result(text.to_string())
    }
}

/// Profile edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl ProfileForm {
    pub fn clean(&self) -> Result<ProfileForm, FormErrors> {
        let mut errors = FormErrors::default();

        let username = self.username.trim();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if !is_valid_username(username) {
            errors.add(
                "username",
                format!(
                    "Enter a valid username: at most {USERNAME_MAX_LEN} letters, digits and @/./+/-/_ characters."
                ),
            );
        }

        let email = self.email.trim();
        if !email.is_empty() && !is_valid_email(email) {
            errors.add("email", "Enter a valid email address.");
        }

        errors.into_result(ProfileForm {
            username: username.to_string(),
            email: email.to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        })
    }
}

pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= USERNAME_MAX_LEN
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
