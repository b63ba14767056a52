/// Formats a stored phone number for display.
///
/// Eleven digits become `DDD-DDDD-DDDD`, ten digits `DDD-DDD-DDDD`. Any other
/// length is returned unchanged.
pub fn format_phone_number(digits: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let join = |a: usize, b: usize| -> String {
        format!(
            "{}-{}-{}",
            chars[..a].iter().collect::<String>(),
            chars[a..b].iter().collect::<String>(),
            chars[b..].iter().collect::<String>()
        )
    };

    match chars.len() {
        11 => join(3, 7),
        10 => join(3, 6),
        _ => digits.to_string(),
    }
}
