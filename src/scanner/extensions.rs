/// Image container formats the scanner can probe and the renderer can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// jpg, jpeg, jpe, jfif
    Jpeg,
    Png,
    Webp,
    Gif,
    Bmp,
}

/// Classify a file extension. Returns None for anything we cannot decode.
pub fn image_kind(ext: &str) -> Option<ImageKind> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "jpe" | "jfif" => Some(ImageKind::Jpeg),
        "png" => Some(ImageKind::Png),
        "webp" => Some(ImageKind::Webp),
        "gif" => Some(ImageKind::Gif),
        "bmp" | "dib" => Some(ImageKind::Bmp),
        _ => None,
    }
}

pub fn is_image_extension(ext: &str) -> bool {
    image_kind(ext).is_some()
}
