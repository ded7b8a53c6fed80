//! Utility functions and helpers

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Format a monetary value as en-US dollars: `$1,234.56`, `-$50.00`
///
/// Cents come from the exact binary value of the float, so `0.015`
/// (stored as 0.01499...) renders as `$0.01`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return "NaN".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    // -0.004 rounds to zero and must not print a sign
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    format!("{}${}.{}", sign, format_number(whole), frac)
}

/// Render a float the way a browser prints a plain number (`75`, `75.5`, `-0.1`)
pub fn format_plain_number(value: f64) -> String {
    if value == 0.0 {
        // Drops the sign of -0
        return "0".to_string();
    }
    value.to_string()
}

/// Escape text for use inside HTML element content or quoted attributes
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Quote a string as a JavaScript literal that is safe inside an HTML attribute
pub fn js_string_attr(value: &str) -> String {
    let literal = serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string());
    escape_html(&literal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-1234), "-1,234");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(1234.5), "$1,234.50");
        assert_eq!(format_price(-50.0), "-$50.00");
        assert_eq!(format_price(0.005), "$0.01");
        assert_eq!(format_price(-0.001), "$0.00");
        assert_eq!(format_price(1_000_000.0), "$1,000,000.00");
    }

    #[test]
    fn test_format_price_rounds_exact_value() {
        assert_eq!(format_price(0.015), "$0.01");
        assert_eq!(format_price(1.005), "$1.00");
        assert_eq!(format_price(-2.675), "-$2.67");
        assert_eq!(format_price(0.016), "$0.02");
        assert_eq!(format_price(1e20), "$100,000,000,000,000,000,000.00");
    }

    #[test]
    fn test_format_plain_number() {
        assert_eq!(format_plain_number(75.0), "75");
        assert_eq!(format_plain_number(75.5), "75.5");
        assert_eq!(format_plain_number(-50.0), "-50");
        assert_eq!(format_plain_number(-0.0), "0");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b>&'\""), "a&lt;b&gt;&amp;&#39;&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_js_string_attr() {
        assert_eq!(js_string_attr("tx-1"), "&quot;tx-1&quot;");
        assert_eq!(js_string_attr("a'b"), "&quot;a&#39;b&quot;");
    }
}
