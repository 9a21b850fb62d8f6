//! Tests PNG-only ingestion of candidate image files.

use stego_desk_core::{CoreError, ImageAsset, is_png_media_type};

#[test]
fn asset_validation_tests_accept_declared_png_variants() {
    for media_type in ["image/png", "image/x-png", "IMAGE/PNG", "png"] {
        let asset = ImageAsset::new("photo.png", media_type, vec![0; 16])
            .expect("png media type should be accepted");
        assert_eq!(asset.file_name, "photo.png");
        assert_eq!(asset.media_type, media_type);
        assert_eq!(asset.bytes.len(), 16);
    }
}

#[test]
fn asset_validation_tests_reject_non_png_media_types() {
    for media_type in ["image/jpeg", "image/gif", "application/pdf", ""] {
        let err = ImageAsset::new("photo.jpg", media_type, vec![0; 16])
            .expect_err("non-png media type should be rejected");
        assert!(matches!(err, CoreError::UnsupportedMediaType(_)));
    }
}

#[test]
fn asset_validation_tests_derive_size_label_at_ingestion() {
    let asset = ImageAsset::new("photo.png", "image/png", vec![0; 1536])
        .expect("png media type should be accepted");
    assert_eq!(asset.size_label, "1.5 KB");
}

#[test]
fn asset_validation_tests_media_type_match_is_substring_based() {
    assert!(is_png_media_type("image/png"));
    assert!(is_png_media_type("image/apng"));
    assert!(!is_png_media_type("image/webp"));
}
