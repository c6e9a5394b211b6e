use regex::Regex;
use std::sync::OnceLock;

/// URL slug for a company directory name: lowercased, each whitespace run
/// replaced by a single `-`.
///
/// # Examples
///
/// ```
/// use companywise_core::formatting::slugify;
///
/// assert_eq!(slugify("Goldman Sachs"), "goldman-sachs");
/// assert_eq!(slugify("jane-street"), "jane-street");
/// assert_eq!(slugify("Two  Sigma"), "two-sigma");
/// ```
pub fn slugify(name: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("regex is valid"));
    re.replace_all(&name.to_lowercase(), "-").into_owned()
}

/// Human-readable company name: split on `-`, capitalise the first character
/// of every word, join with spaces. The rest of each word is left untouched.
///
/// # Examples
///
/// ```
/// use companywise_core::formatting::display_name;
///
/// assert_eq!(display_name("goldman-sachs"), "Goldman Sachs");
/// assert_eq!(display_name("de-shaw"), "De Shaw");
/// assert_eq!(display_name("eBay"), "EBay");
/// ```
pub fn display_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// One-decimal percentage, e.g. `"47.5%"`.
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Integer with thousands separators.
///
/// # Examples
///
/// ```
/// use companywise_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

/// Calculate `(part / whole) * 100`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("Morgan Stanley"), "morgan-stanley");
        assert_eq!(slugify("Two\t Sigma"), "two-sigma");
        assert_eq!(slugify("amazon"), "amazon");
    }

    #[test]
    fn test_display_name_title_cases_words() {
        assert_eq!(display_name("morgan-stanley"), "Morgan Stanley");
        assert_eq!(display_name("amazon"), "Amazon");
        assert_eq!(display_name("a--b"), "A  B");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(47.53), "47.5%");
        assert_eq!(format_percent(100.0), "100.0%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_format_count_groups_thousands() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(12345), "12,345");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(3, 0), 0.0);
        assert!((percentage(1, 4) - 25.0).abs() < 1e-9);
    }
}
