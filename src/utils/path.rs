//! Output naming utilities

/// Fallback base name when the source has no usable file name
const DEFAULT_BASE: &str = "video";

/// Characters that cannot appear in a file name on common platforms
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '|', '?', '*', '/', '\\'];

/// Derive the document file name from a video source descriptor.
///
/// Works on the last path segment of `source` (local path or URL), strips the
/// final extension if present and appends `suffix` and `.{extension}`.
/// A leading dot does not start an extension.
pub fn derive_output_filename(source: &str, suffix: &str, extension: &str) -> String {
    let segment = last_segment(source);
    let base = strip_extension(segment);
    let base = sanitize(base);
    let base = if base.is_empty() { DEFAULT_BASE.to_string() } else { base };
    let extension = extension.trim_start_matches('.');

    format!("{}{}.{}", base, suffix, extension)
}

/// Human-readable title for a source: its last segment without the extension
pub fn source_title(source: &str) -> String {
    let base = strip_extension(last_segment(source)).trim();
    if base.is_empty() {
        DEFAULT_BASE.to_string()
    } else {
        base.to_string()
    }
}

fn last_segment(source: &str) -> &str {
    let trimmed = source.trim().trim_end_matches(['/', '\\']);
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => &name[..pos],
        _ => name,
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if INVALID_CHARS.contains(&c) || c.is_control() { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_title() {
        assert_eq!(source_title("/videos/Team sync.mp4"), "Team sync");
        assert_eq!(source_title("C:\\clips\\demo.mkv"), "demo");
        assert_eq!(source_title("  "), "video");
    }

    #[test]
    fn test_strips_extension_and_appends_suffix() {
        assert_eq!(derive_output_filename("lecture.mp4", "_frames", "pdf"), "lecture_frames.pdf");
    }

    #[test]
    fn test_only_last_extension_is_stripped() {
        assert_eq!(
            derive_output_filename("talk.final.mov", "_frames", "pdf"),
            "talk.final_frames.pdf"
        );
    }

    #[test]
    fn test_name_without_extension() {
        assert_eq!(derive_output_filename("recording", "_frames", "pdf"), "recording_frames.pdf");
    }

    #[test]
    fn test_leading_dot_is_not_an_extension() {
        assert_eq!(derive_output_filename(".hidden", "_frames", "pdf"), ".hidden_frames.pdf");
    }

    #[test]
    fn test_directories_are_dropped() {
        assert_eq!(
            derive_output_filename("/data/videos/demo.webm", "_frames", ".pdf"),
            "demo_frames.pdf"
        );
        assert_eq!(
            derive_output_filename("C:\\clips\\intro.avi", "_frames", "pdf"),
            "intro_frames.pdf"
        );
    }

    #[test]
    fn test_url_sources_are_sanitized() {
        assert_eq!(
            derive_output_filename("https://www.youtube.com/watch?v=abc", "_frames", "pdf"),
            "watch_v=abc_frames.pdf"
        );
    }

    #[test]
    fn test_empty_source_uses_fallback() {
        assert_eq!(derive_output_filename("", "_frames", "pdf"), "video_frames.pdf");
        assert_eq!(derive_output_filename("/", "_frames", "pdf"), "video_frames.pdf");
    }
}
