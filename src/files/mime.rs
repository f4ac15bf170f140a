/// File extension, lowercased, or empty when there is none.
fn extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Guess MIME type from filename extension.
pub fn guess_mime_type(filename: &str) -> String {
    match extension(filename).as_str() {
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Whether the file's extension is in `accepted` (compared case-insensitively,
/// with or without a leading dot).
pub fn has_accepted_extension(filename: &str, accepted: &[String]) -> bool {
    let ext = extension(filename);
    if ext.is_empty() {
        return false;
    }
    accepted
        .iter()
        .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}
