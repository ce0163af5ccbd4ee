use crate::markup::EMPTY_MARKER;

/// Checks whether `name` can be used as a node name.
///
/// Names are runs of word characters, `.` and `-`. The navigation
/// segments `.` and `..` and the empty-directory marker are reserved.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name != EMPTY_MARKER
        && name
            .chars()
            .all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == '-')
}

/// Converts arbitrary text into a valid node name.
///
/// Lowercases, collapses runs of other characters into a single `-` and
/// trims dashes from both ends. Falls back to `item` when nothing usable is
/// left.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() || ch == '_' || ch == '.' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if is_valid_name(&slug) {
        slug
    } else {
        "item".to_owned()
    }
}
