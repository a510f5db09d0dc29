//! Terminal display helpers for the result list.

use unicode_width::UnicodeWidthChar;

/// Truncate text to fit within the specified width using unicode-aware truncation.
///
/// Appends an ellipsis if truncation occurred.
///
/// # Examples
///
/// ```
/// use scholar_aggregator::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }

    let widths: Vec<(char, usize)> = text
        .chars()
        .map(|c| (c, UnicodeWidthChar::width(c).unwrap_or(1)))
        .collect();

    if widths.iter().map(|(_, w)| *w).sum::<usize>() <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let mut truncated = String::new();
    for (c, w) in widths {
        if used + w > budget {
            break;
        }
        used += w;
        truncated.push(c);
    }

    format!("{}...", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_fits() {
        assert_eq!(truncate_with_ellipsis("Título corto", 20), "Título corto");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
    }

    #[test]
    fn test_truncate_wide_chars() {
        // Each CJK character is two columns wide
        assert_eq!(truncate_with_ellipsis("日本語のタイトル", 9), "日本語...");
    }

    #[test]
    fn test_truncate_zero() {
        assert_eq!(truncate_with_ellipsis("abc", 0), "");
    }
}
