use crate::wire::Volume;
use serde::{Deserialize, Serialize};

/// A bibliographic record from the remote source, normalised.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub external_id: String,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub page_count: Option<u32>,
    pub categories: Vec<String>,
    pub edition: Option<String>,
    /// Cover image URL.
    pub image: Option<String>,
    pub image_thumbnail: Option<String>,
}

impl ExternalRecord {
    /// `None` for volumes without an id: there is nothing to deduplicate
    /// them on.
    pub(crate) fn from_volume(volume: Volume) -> Option<Self> {
        let external_id = volume.id.filter(|id| !id.trim().is_empty())?;
        let info = volume.volume_info.unwrap_or_default();
        let links = info.image_links.unwrap_or_default();
        Some(Self {
            external_id,
            title: info.title,
            authors: info.authors.unwrap_or_default(),
            description: info.description,
            language: info.language,
            page_count: info.page_count.and_then(|count| u32::try_from(count).ok()),
            categories: info.categories.unwrap_or_default(),
            edition: info.content_version,
            image: links.thumbnail,
            image_thumbnail: links.small_thumbnail,
        })
    }
}

/// Search results, mapped from the wire format only as they are consumed.
pub struct Records {
    inner: Box<dyn Iterator<Item = ExternalRecord> + Send>,
}

impl Records {
    pub fn new(records: impl IntoIterator<Item = ExternalRecord, IntoIter: Send + 'static>) -> Self {
        Self { inner: Box::new(records.into_iter()) }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub(crate) fn from_volumes(volumes: Vec<Volume>) -> Self {
        Self { inner: Box::new(volumes.into_iter().filter_map(ExternalRecord::from_volume)) }
    }
}

impl Iterator for Records {
    type Item = ExternalRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for Records {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Records").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::VolumesResponse;

    fn parse(json: &str) -> Vec<ExternalRecord> {
        let response: VolumesResponse = serde_json::from_str(json).unwrap();
        Records::from_volumes(response.items.unwrap_or_default()).collect()
    }

    #[test]
    fn test_full_volume() {
        let records = parse(
            r#"{"items": [{
                "id": "zyTCAlFPjgYC",
                "volumeInfo": {
                    "title": "The Google Story",
                    "authors": ["David A. Vise", "Mark Malseed"],
                    "description": "Inside the company.",
                    "language": "en",
                    "pageCount": 207,
                    "categories": ["Browsers (Computer programs)"],
                    "contentVersion": "1.1.1.0.preview.2",
                    "imageLinks": {
                        "smallThumbnail": "http://books.google.com/small",
                        "thumbnail": "http://books.google.com/thumb"
                    }
                }
            }]}"#,
        );
        assert_eq!(
            records,
            vec![ExternalRecord {
                external_id: "zyTCAlFPjgYC".to_string(),
                title: Some("The Google Story".to_string()),
                authors: vec!["David A. Vise".to_string(), "Mark Malseed".to_string()],
                description: Some("Inside the company.".to_string()),
                language: Some("en".to_string()),
                page_count: Some(207),
                categories: vec!["Browsers (Computer programs)".to_string()],
                edition: Some("1.1.1.0.preview.2".to_string()),
                image: Some("http://books.google.com/thumb".to_string()),
                image_thumbnail: Some("http://books.google.com/small".to_string()),
            }]
        );
    }

    #[test]
    fn test_missing_image_links() {
        let records = parse(r#"{"items": [{"id": "a", "volumeInfo": {"title": "No Cover"}}]}"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].image, None);
        assert_eq!(records[0].image_thumbnail, None);
        assert!(records[0].authors.is_empty());
        assert!(records[0].categories.is_empty());
    }

    #[test]
    fn test_missing_items() {
        assert!(parse(r#"{"kind": "books#volumes", "totalItems": 0}"#).is_empty());
    }

    #[test]
    fn test_volumes_without_id_are_skipped() {
        let records = parse(r#"{"items": [{"volumeInfo": {"title": "Anonymous"}}, {"id": ""}, {"id": "b"}]}"#);
        let ids: Vec<_> = records.iter().map(|r| r.external_id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn test_negative_page_count_is_dropped() {
        let records = parse(r#"{"items": [{"id": "a", "volumeInfo": {"pageCount": -1}}]}"#);
        assert_eq!(records[0].page_count, None);
    }
}
