//! The subset of the Google Books `volumes` response we read. Every field
//! is optional; the API omits whatever it doesn't know.
//!
//! A field with an unexpected type is treated as absent, and so is a list
//! element or an item that doesn't parse. One odd volume never costs the
//! rest of the page.

use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use serde_json::Value;

/// `None` instead of an error when the value doesn't fit `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Keeps the elements that fit `T`. `None` when the value isn't a list.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(items.into_iter().filter_map(|item| serde_json::from_value(item).ok()).collect()),
        _ => None,
    })
}

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct VolumesResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) items: Option<Vec<Volume>>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Volume {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VolumeInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) title: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) authors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) language: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) page_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub(crate) categories: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) content_version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) image_links: Option<ImageLinks>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageLinks {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) small_thumbnail: Option<String>,
}
