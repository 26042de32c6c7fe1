/// Pulls `.tag` tokens out of an annotation.
///
/// The annotation is split on single spaces and every token starting with `.` yields a tag
/// with that dot removed. Order and duplicates are kept; other tokens are dropped.
pub fn extract_tags(annotation: &str) -> Vec<String> {
    annotation
        .split(' ')
        .filter_map(|token| token.strip_prefix('.'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_tags() {
        assert!(extract_tags("Making a note here").is_empty());
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn test_tags_in_order() {
        assert_eq!(
            extract_tags(".stoicism worth rereading .quotes"),
            vec!["stoicism", "quotes"]
        );
    }

    #[test]
    fn test_duplicates_kept() {
        assert_eq!(extract_tags(".a .b .a"), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_only_one_leading_dot_stripped() {
        assert_eq!(extract_tags("..hidden"), vec![".hidden"]);
    }

    #[test]
    fn test_dot_inside_token_is_not_a_tag() {
        assert!(extract_tags("e.g. something").is_empty());
    }

    #[test]
    fn test_splits_on_single_spaces_only() {
        assert_eq!(extract_tags("note\n.tag"), Vec::<String>::new());
        assert_eq!(extract_tags("note  .tag"), vec!["tag"]);
    }
}
