use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// Column widths of the `adverts` table.
pub const HEADER_MAX_LEN: usize = 64;
pub const DESCRIPTION_MAX_LEN: usize = 128;
pub const OWNER_MAX_LEN: usize = 128;

/// A snapshot of one row of the `adverts` table.
///
/// `id` and `create_date` are assigned by storage on insert and never change
/// afterwards. On the wire `create_date` is a Unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Advert {
    pub id: i32,
    pub header: String,
    pub description: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub create_date: DateTime<Utc>,
    pub owner: Option<String>,
}

/// The fields a client may supply when creating an advert.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAdvert {
    pub header: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl NewAdvert {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_len("header", &self.header, HEADER_MAX_LEN)?;
        check_optional_len("description", self.description.as_deref(), DESCRIPTION_MAX_LEN)?;
        check_optional_len("owner", self.owner.as_deref(), OWNER_MAX_LEN)
    }
}

/// A partial update. Absent fields are left untouched.
///
/// For the nullable columns the outer `Option` says whether the field was
/// sent at all and the inner one carries an explicit `null`. `header` is
/// required by the schema, so `"header": null` fails to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvertChanges {
    #[serde(default, deserialize_with = "non_null")]
    pub header: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub owner: Option<Option<String>>,
}

impl AdvertChanges {
    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.description.is_none() && self.owner.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(header) = &self.header {
            check_len("header", header, HEADER_MAX_LEN)?;
        }
        if let Some(description) = &self.description {
            check_optional_len("description", description.as_deref(), DESCRIPTION_MAX_LEN)?;
        }
        if let Some(owner) = &self.owner {
            check_optional_len("owner", owner.as_deref(), OWNER_MAX_LEN)?;
        }
        Ok(())
    }

    /// Overwrites every provided field on `advert`. `id` and `create_date`
    /// are out of reach.
    pub fn apply_to(&self, advert: &mut Advert) {
        if let Some(header) = &self.header {
            advert.header = header.clone();
        }
        if let Some(description) = &self.description {
            advert.description = description.clone();
        }
        if let Some(owner) = &self.owner {
            advert.owner = owner.clone();
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_null<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}

// VARCHAR(n) counts characters, not bytes, and cannot hold NUL.
fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::NulCharacter(field));
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

fn check_optional_len(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| check_len(field, v, max))
}
