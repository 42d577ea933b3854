// Page access validation shared by create and patch
use crate::types::{PAGE_SEPARATOR, WILDCARD_PAGE};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PageAccessError {
    #[error("No pages defined for access")]
    Empty,

    #[error("Payload Array item pageAccess has illegal char ',' in the {0}th element")]
    IllegalSeparator(usize),

    #[error("Payload Array item pageAccess has an empty page name in the {0}th element")]
    EmptyPageName(usize),

    #[error("Items in pageAccess consist of wildcard '*'. Specifying pages is not required")]
    RedundantWildcard,
}

/// Validate a requested page list and return it trimmed and de-duplicated.
///
/// A wildcard must be the only entry: a `*` after a named page, or any
/// entry after a `*`, is rejected.
pub fn validate_page_access<S: AsRef<str>>(pages: &[S]) -> Result<Vec<String>, PageAccessError> {
    if pages.is_empty() {
        return Err(PageAccessError::Empty);
    }

    let mut has_wildcard = false;
    let mut has_page_entry = false;
    let mut cleaned: Vec<String> = Vec::with_capacity(pages.len());

    for (i, page) in pages.iter().enumerate() {
        let raw = page.as_ref();
        if raw.contains(PAGE_SEPARATOR) {
            return Err(PageAccessError::IllegalSeparator(i));
        }

        let trimmed = raw.trim_matches(' ');
        if trimmed.is_empty() {
            return Err(PageAccessError::EmptyPageName(i));
        }

        let is_wildcard = trimmed == WILDCARD_PAGE;
        if has_wildcard || (is_wildcard && has_page_entry) {
            return Err(PageAccessError::RedundantWildcard);
        }

        if is_wildcard {
            has_wildcard = true;
        } else {
            has_page_entry = true;
        }

        if !cleaned.iter().any(|p| p == trimmed) {
            cleaned.push(trimmed.to_string());
        }
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_named_pages_and_trims_spaces() {
        let pages = validate_page_access(&[" Overview ", "Alarms"]).unwrap();
        assert_eq!(pages, vec!["Overview", "Alarms"]);
    }

    #[test]
    fn accepts_lone_wildcard() {
        assert_eq!(validate_page_access(&["*"]).unwrap(), vec!["*"]);
    }

    #[test]
    fn collapses_duplicate_pages() {
        let pages = validate_page_access(&["Overview", "Overview ", "Alarms"]).unwrap();
        assert_eq!(pages, vec!["Overview", "Alarms"]);
    }

    #[test]
    fn rejects_empty_list() {
        let empty: [&str; 0] = [];
        assert_eq!(validate_page_access(&empty), Err(PageAccessError::Empty));
    }

    #[test]
    fn rejects_separator_inside_page_name() {
        assert_eq!(
            validate_page_access(&["Overview", "Site,Energy"]),
            Err(PageAccessError::IllegalSeparator(1))
        );
    }

    #[test]
    fn rejects_blank_page_name() {
        assert_eq!(
            validate_page_access(&["Overview", "   "]),
            Err(PageAccessError::EmptyPageName(1))
        );
    }

    #[test]
    fn rejects_wildcard_mixed_with_pages() {
        assert_eq!(
            validate_page_access(&["Overview", "*"]),
            Err(PageAccessError::RedundantWildcard)
        );
        assert_eq!(
            validate_page_access(&["*", "Overview"]),
            Err(PageAccessError::RedundantWildcard)
        );
        assert_eq!(
            validate_page_access(&["*", "*"]),
            Err(PageAccessError::RedundantWildcard)
        );
    }

    #[test]
    fn error_messages_name_the_offending_element() {
        let err = validate_page_access(&["a,b"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Payload Array item pageAccess has illegal char ',' in the 0th element"
        );
    }
}
