//! Item tokenization — split a raw argument string into items.
//!
//! Items are whitespace-separated; double or single quotes group a
//! multi-word item. `milk "dark chocolate"` → `["milk", "dark chocolate"]`.
//! An unterminated quote consumes the rest of the input.

/// Split `raw` into item tokens, honoring quoted substrings.
pub fn tokenize_items(raw: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in raw.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        items.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            },
        }
    }
    if !current.is_empty() {
        items.push(current);
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_split() {
        assert_eq!(tokenize_items("milk eggs bread"), vec!["milk", "eggs", "bread"]);
    }

    #[test]
    fn test_double_quoted() {
        assert_eq!(
            tokenize_items("milk \"dark chocolate\""),
            vec!["milk", "dark chocolate"]
        );
    }

    #[test]
    fn test_single_quoted() {
        assert_eq!(
            tokenize_items("'olive oil' salt"),
            vec!["olive oil", "salt"]
        );
    }

    #[test]
    fn test_quote_inside_other_quote_kind() {
        assert_eq!(tokenize_items("\"it's here\""), vec!["it's here"]);
    }

    #[test]
    fn test_unterminated_quote_consumes_rest() {
        assert_eq!(tokenize_items("\"dark chocolate"), vec!["dark chocolate"]);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(tokenize_items("").is_empty());
        assert!(tokenize_items("   ").is_empty());
    }

    #[test]
    fn test_adjacent_quotes_join() {
        // Quotes glue to surrounding word characters, shell-style.
        assert_eq!(tokenize_items("pre\"mid\"post"), vec!["premidpost"]);
    }

    #[test]
    fn test_empty_quotes_produce_nothing() {
        assert!(tokenize_items("\"\" ''").is_empty());
    }

    #[test]
    fn test_duplicates_preserved() {
        assert_eq!(tokenize_items("milk milk"), vec!["milk", "milk"]);
    }
}
