//! Collision-free final file names.

/// `name.ext` for attempt 0, `name (N).ext` for attempt N.
pub fn candidate_file_name(file_name: &str, extension: &str, attempt: u32) -> String {
    if attempt == 0 {
        format!("{file_name}{extension}")
    } else {
        format!("{file_name} ({attempt}){extension}")
    }
}
