//! Rendering of [`FileQuery`] into the Drive v3 search language.
//!
//! Every value is emitted as a single-quoted literal with `\` and `'`
//! escaped, so names cannot terminate the literal early.

use bridge_traits::storage::{FileQuery, QueryClause, QueryOrder};

/// Escape a value for use inside a single-quoted Drive query literal
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        if ch == '\\' || ch == '\'' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn render_clause(clause: &QueryClause) -> String {
    match clause {
        QueryClause::MimeTypeEquals(mime) => format!("mimeType = '{}'", escape_literal(mime)),
        QueryClause::NameEquals(name) => format!("name = '{}'", escape_literal(name)),
        QueryClause::NameContains(fragment) => {
            format!("name contains '{}'", escape_literal(fragment))
        }
        QueryClause::InParent(parent) => format!("'{}' in parents", escape_literal(parent)),
        QueryClause::NotTrashed => "trashed = false".to_string(),
    }
}

/// The `q` parameter, or `None` when the query has no clauses
pub fn render_filter(query: &FileQuery) -> Option<String> {
    if query.clauses().is_empty() {
        return None;
    }

    Some(
        query
            .clauses()
            .iter()
            .map(render_clause)
            .collect::<Vec<_>>()
            .join(" and "),
    )
}

/// The `orderBy` parameter
pub fn render_order(order: QueryOrder) -> &'static str {
    match order {
        QueryOrder::ModifiedTimeDesc => "modifiedTime desc",
        QueryOrder::CreatedTimeAsc => "createdTime",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::FOLDER_MIME_TYPE;

    #[test]
    fn test_render_folder_lookup() {
        let query = FileQuery::new()
            .mime_type(FOLDER_MIME_TYPE)
            .name_equals("Reports")
            .not_trashed();

        assert_eq!(
            render_filter(&query).unwrap(),
            "mimeType = 'application/vnd.google-apps.folder' and name = 'Reports' and trashed = false"
        );
    }

    #[test]
    fn test_render_latest_lookup() {
        let query = FileQuery::new().in_parent("F1").name_contains("2025");

        assert_eq!(
            render_filter(&query).unwrap(),
            "'F1' in parents and name contains '2025'"
        );
    }

    #[test]
    fn test_quotes_cannot_escape_literal() {
        let query = FileQuery::new().name_contains("x' or name contains '");

        assert_eq!(
            render_filter(&query).unwrap(),
            r"name contains 'x\' or name contains \''"
        );
    }

    #[test]
    fn test_backslashes_are_escaped() {
        assert_eq!(escape_literal(r"a\b"), r"a\\b");
        assert_eq!(escape_literal(r"\'"), r"\\\'");
        assert_eq!(escape_literal("plain"), "plain");
    }

    #[test]
    fn test_empty_query_has_no_filter() {
        assert_eq!(render_filter(&FileQuery::new()), None);
        assert_eq!(render_filter(&FileQuery::new().name_contains("")), None);
    }

    #[test]
    fn test_render_order() {
        assert_eq!(render_order(QueryOrder::ModifiedTimeDesc), "modifiedTime desc");
        assert_eq!(render_order(QueryOrder::CreatedTimeAsc), "createdTime");
    }
}
