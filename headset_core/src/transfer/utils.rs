use crate::transfer::constants::{EXPORT_EXTENSION, MAX_FILENAME_LENGTH};

/// Replace every character that can cause trouble in a file name with `_`.
///
/// ASCII letters, digits, `-` and `_` are kept, as is anything above U+00FF.
/// Everything else in the Latin-1 range (spaces, punctuation, path
/// separators, control characters) is replaced.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || u32::from(c) > 0xFF {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name used for the exported asset of the given primary item
pub fn export_file_name(primary_item: &str) -> String {
    format!("{}.{}", clean_name(primary_item), EXPORT_EXTENSION)
}

/// Sanitize a received file name to prevent path traversal and ensure safety
pub fn sanitize_file_name(file_name: &str) -> String {
    // Keep only the last path component, for both separator styles
    let file_name = file_name
        .split(|c: char| c == '/' || c == '\\')
        .last()
        .unwrap_or("unknown_file");

    let mut clean_name: String = file_name.chars().filter(|c| !c.is_control()).collect();

    // Windows reserved device names
    let reserved_names = [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
        "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    if reserved_names
        .iter()
        .any(|&r| clean_name.eq_ignore_ascii_case(r))
    {
        return "unknown_file".to_string();
    }

    if clean_name == ".." || clean_name == "." || clean_name.trim().is_empty() {
        return "unknown_file".to_string();
    }

    if clean_name.len() > MAX_FILENAME_LENGTH {
        truncate_preserving_extension(&mut clean_name);
    }

    clean_name
}

fn truncate_preserving_extension(name: &mut String) {
    let extension = name
        .rfind('.')
        .filter(|&idx| name.len() - idx < 20)
        .map(|idx| name[idx..].to_string());

    let base_len = MAX_FILENAME_LENGTH - extension.as_ref().map_or(0, String::len);
    let mut cutoff = base_len.min(name.len());
    while !name.is_char_boundary(cutoff) {
        cutoff -= 1;
    }

    if let Some(ext) = extension {
        let idx = name.len() - ext.len();
        name.truncate(cutoff.min(idx));
        name.push_str(&ext);
    } else {
        name.truncate(cutoff);
    }
}
