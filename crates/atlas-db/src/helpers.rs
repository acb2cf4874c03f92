/// Splits `items` into consecutive slices of `size` elements.
///
/// The last slice may be shorter. A `size` of zero yields no chunks at all.
pub fn chunk<T>(items: &[T], size: usize) -> Vec<&[T]> {
    if size == 0 {
        return Vec::new();
    }
    items.chunks(size).collect()
}

/// Converts a camelCase identifier to snake_case (`countryCode3` -> `country_code3`).
pub fn to_snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Converts a snake_case identifier to camelCase (`country_code3` -> `countryCode3`).
pub fn to_camel_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let mut upper_next = false;
    for ch in ident.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Quotes an SQL identifier, doubling any embedded quote.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk() {
        let items = [1, 2, 3, 4, 5];
        let chunks = chunk(&items, 2);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], &[1, 2]);
        assert_eq!(chunks[2], &[5]);
    }

    #[test]
    fn test_chunk_zero_or_empty() {
        assert!(chunk(&[1, 2, 3], 0).is_empty());
        assert!(chunk::<u8>(&[], 10).is_empty());
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("countryCode3"), "country_code3");
        assert_eq!(to_snake_case("continentId"), "continent_id");
        assert_eq!(to_snake_case("capital"), "capital");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("country_code3"), "countryCode3");
        assert_eq!(to_camel_case("continent_name"), "continentName");
        assert_eq!(to_camel_case("_private"), "private");
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("country"), "\"country\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
