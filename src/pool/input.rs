//! Sanitizing of typed-in numbers before they reach the data model.

/// Parses a typed score, discarding every non-digit character first.
///
/// Returns None for input with no digits at all (an empty field) or for
/// values too large to be a score.
pub fn sanitize_score_input(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u32>().ok()
}

/// Parses a typed axis label. Only the first digit typed counts; anything
/// without a digit clears the slot.
pub fn sanitize_digit_input(text: &str) -> Option<u8> {
    text.chars()
        .find(|c| c.is_ascii_digit())
        .and_then(|c| c.to_digit(10))
        .map(|d| d as u8)
}
