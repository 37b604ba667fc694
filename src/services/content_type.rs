//! Content-type resolution for uploaded payloads.

use crate::models::object::APPLICATION_OCTET_STREAM;
use std::path::Path;

/// Extension table for common upload types. Keys are lowercase.
const EXTENSION_TYPES: &[(&str, &str)] = &[
    // images
    ("apng", "image/apng"),
    ("avif", "image/avif"),
    ("bmp", "image/bmp"),
    ("gif", "image/gif"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("ico", "image/vnd.microsoft.icon"),
    ("jfif", "image/jpeg"),
    ("jpe", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("jxl", "image/jxl"),
    ("png", "image/png"),
    ("psd", "image/vnd.adobe.photoshop"),
    ("svg", "image/svg+xml"),
    ("svgz", "image/svg+xml"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("webp", "image/webp"),
    // text
    ("css", "text/css; charset=utf-8"),
    ("csv", "text/csv; charset=utf-8"),
    ("htm", "text/html; charset=utf-8"),
    ("html", "text/html; charset=utf-8"),
    ("ics", "text/calendar; charset=utf-8"),
    ("js", "text/javascript; charset=utf-8"),
    ("log", "text/plain; charset=utf-8"),
    ("md", "text/markdown; charset=utf-8"),
    ("mjs", "text/javascript; charset=utf-8"),
    ("rtf", "application/rtf"),
    ("tsv", "text/tab-separated-values; charset=utf-8"),
    ("txt", "text/plain; charset=utf-8"),
    ("vcf", "text/vcard; charset=utf-8"),
    ("vtt", "text/vtt; charset=utf-8"),
    ("xml", "text/xml; charset=utf-8"),
    ("yaml", "application/yaml"),
    ("yml", "application/yaml"),
    // documents and data
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("epub", "application/epub+zip"),
    ("json", "application/json"),
    ("jsonld", "application/ld+json"),
    ("odp", "application/vnd.oasis.opendocument.presentation"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("pdf", "application/pdf"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("toml", "application/toml"),
    ("wasm", "application/wasm"),
    ("xhtml", "application/xhtml+xml"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    // archives
    ("7z", "application/x-7z-compressed"),
    ("bz2", "application/x-bzip2"),
    ("gz", "application/gzip"),
    ("jar", "application/java-archive"),
    ("rar", "application/vnd.rar"),
    ("tar", "application/x-tar"),
    ("tgz", "application/gzip"),
    ("xz", "application/x-xz"),
    ("zip", "application/zip"),
    ("zst", "application/zstd"),
    // fonts
    ("otf", "font/otf"),
    ("ttf", "font/ttf"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    // audio
    ("aac", "audio/aac"),
    ("flac", "audio/flac"),
    ("m4a", "audio/mp4"),
    ("mid", "audio/midi"),
    ("midi", "audio/midi"),
    ("mp3", "audio/mpeg"),
    ("oga", "audio/ogg"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/opus"),
    ("wav", "audio/wav"),
    ("weba", "audio/webm"),
    // video
    ("3gp", "video/3gpp"),
    ("avi", "video/x-msvideo"),
    ("m4v", "video/mp4"),
    ("mkv", "video/x-matroska"),
    ("mov", "video/quicktime"),
    ("mp4", "video/mp4"),
    ("mpeg", "video/mpeg"),
    ("mpg", "video/mpeg"),
    ("ogv", "video/ogg"),
    ("ts", "video/mp2t"),
    ("webm", "video/webm"),
];

/// Look up a MIME type from the extension of `name`.
pub fn from_extension(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, mime)| *mime)
}

/// Pick the content type to store for an upload.
///
/// A declared type is kept unless it is empty or the generic octet-stream;
/// then the filename extension is consulted, and octet-stream is the last
/// resort.
pub fn resolve(declared: &str, name: &str) -> String {
    let declared = declared.trim();
    if !declared.is_empty() && !declared.eq_ignore_ascii_case(APPLICATION_OCTET_STREAM) {
        return declared.to_string();
    }
    from_extension(name)
        .unwrap_or(APPLICATION_OCTET_STREAM)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_type_wins() {
        assert_eq!(resolve("image/gif", "photo.png"), "image/gif");
    }

    #[test]
    fn octet_stream_falls_back_to_extension() {
        assert_eq!(resolve(APPLICATION_OCTET_STREAM, "photo.png"), "image/png");
        assert_eq!(resolve("", "photo.JPG"), "image/jpeg");
    }

    #[test]
    fn covers_office_archive_font_and_media_types() {
        assert_eq!(
            from_extension("report.docx"),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        );
        assert_eq!(from_extension("backup.tar.gz"), Some("application/gzip"));
        assert_eq!(from_extension("bundle.7z"), Some("application/x-7z-compressed"));
        assert_eq!(from_extension("font.woff2"), Some("font/woff2"));
        assert_eq!(from_extension("song.FLAC"), Some("audio/flac"));
        assert_eq!(from_extension("clip.mov"), Some("video/quicktime"));
        assert_eq!(from_extension("config.yml"), Some("application/yaml"));
        assert_eq!(from_extension("photo.heic"), Some("image/heic"));
    }

    #[test]
    fn table_has_no_duplicate_extensions() {
        let mut seen = std::collections::HashSet::new();
        for (ext, _) in EXTENSION_TYPES {
            assert!(seen.insert(*ext), "duplicate extension {ext}");
            assert_eq!(*ext, ext.to_ascii_lowercase());
        }
    }

    #[test]
    fn unknown_or_missing_extension() {
        assert_eq!(resolve("", "README"), APPLICATION_OCTET_STREAM);
        assert_eq!(resolve("", "archive.xyz"), APPLICATION_OCTET_STREAM);
        assert_eq!(resolve("", ""), APPLICATION_OCTET_STREAM);
    }
}
