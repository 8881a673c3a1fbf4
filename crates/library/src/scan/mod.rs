pub mod error;

use crate::resolve::{Resolution, resolve};
use crate::scan::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Serialize;
use tome_codec::error::ErrorKind as CodecErrorKind;
use tome_codec::{Codec, CodeFamily};
use tome_store::RelationshipStore;
use tracing::instrument;

/// A decoded code and what it resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Scanned {
    pub identifier: String,
    pub resolution: Resolution,
}

/// Decodes a code of `family` from an uploaded image and resolves the
/// identifier it carries.
///
/// Decoding is CPU-bound and runs on the blocking pool.
#[instrument(skip(codec, store, image), fields(family = %family, bytes = image.len()))]
pub async fn scan_code(
    codec: &Codec,
    store: &dyn RelationshipStore,
    image: Vec<u8>,
    family: CodeFamily,
) -> Result<Scanned> {
    let identifier = decode(codec, image, family).await?;
    let resolution = resolve(store, &identifier).await.or_raise(|| ErrorKind::Store)?;
    match &resolution {
        Resolution::Found(book) => tracing::info!(book_id = book.id, "scanned code resolved"),
        Resolution::NotFound(_) => tracing::info!(identifier = %identifier, "scanned code matches no book"),
    }
    Ok(Scanned { identifier, resolution })
}

async fn decode(codec: &Codec, image: Vec<u8>, family: CodeFamily) -> Result<String> {
    let codec = codec.clone();
    let decoded = tokio::task::spawn_blocking(move || codec.decode(&image, family))
        .await
        .or_raise(|| ErrorKind::Join)?;
    decoded.map_err(|err| {
        let kind = match &*err {
            CodecErrorKind::ImageRead => ErrorKind::ImageRead,
            CodecErrorKind::NoCodeDetected => ErrorKind::NoCodeDetected,
            _ => ErrorKind::Decode,
        };
        err.raise(kind)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma};
    use rstest::rstest;
    use std::io::Cursor;
    use tome_store::{Database, NewBook, Repository};

    async fn catalog() -> (Database, Repository) {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        (db, repo)
    }

    fn gradient_png() -> Vec<u8> {
        let image = GrayImage::from_fn(240, 160, |x, y| Luma([((x * 3 + y) % 256) as u8]));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[rstest]
    #[case(CodeFamily::Matrix)]
    #[case(CodeFamily::Linear)]
    #[tokio::test]
    async fn test_scan_resolves_book(#[case] family: CodeFamily) {
        let (_db, repo) = catalog().await;
        let book = repo.create_book(&NewBook { title: Some("Kindred".into()), ..NewBook::default() }).await.unwrap();
        let codec = Codec::default();
        let png = codec.encode(&book.id.to_string(), family).unwrap();

        let scanned = scan_code(&codec, &repo, png, family).await.unwrap();
        assert_eq!(scanned.identifier, book.id.to_string());
        assert_eq!(scanned.resolution, Resolution::Found(book));
    }

    #[rstest]
    #[case("999")]
    #[case("not-a-number")]
    #[tokio::test]
    async fn test_scan_unknown_identifier(#[case] payload: &str) {
        let (_db, repo) = catalog().await;
        let codec = Codec::default();
        let png = codec.encode(payload, CodeFamily::Matrix).unwrap();

        let scanned = scan_code(&codec, &repo, png, CodeFamily::Matrix).await.unwrap();
        assert_eq!(scanned.resolution, Resolution::NotFound(payload.to_string()));
    }

    #[tokio::test]
    async fn test_scan_non_image() {
        let (_db, repo) = catalog().await;
        let err = scan_code(&Codec::default(), &repo, b"definitely not a picture".to_vec(), CodeFamily::Matrix)
            .await
            .unwrap_err();
        assert_eq!(*err, ErrorKind::ImageRead);
    }

    #[rstest]
    #[case(CodeFamily::Matrix)]
    #[case(CodeFamily::Linear)]
    #[tokio::test]
    async fn test_scan_image_without_code(#[case] family: CodeFamily) {
        let (_db, repo) = catalog().await;
        let err = scan_code(&Codec::default(), &repo, gradient_png(), family).await.unwrap_err();
        assert_eq!(*err, ErrorKind::NoCodeDetected);
    }

    #[tokio::test]
    async fn test_scan_store_failure() {
        let (db, repo) = catalog().await;
        let codec = Codec::default();
        let png = codec.encode("1", CodeFamily::Matrix).unwrap();
        db.close().await;
        let err = scan_code(&codec, &repo, png, CodeFamily::Matrix).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Store);
    }
}
