use regex::Regex;
use std::sync::OnceLock;

/// Collapse whitespace in a query and rewrite `?` placeholders into the
/// numbered `$1, $2, ...` form Postgres expects.
pub fn sql(query: &str) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER.get_or_init(|| Regex::new(r"\?").unwrap());

    let cleaned = query.split_whitespace().collect::<Vec<&str>>().join(" ");

    let mut param_index = 0;
    re.replace_all(&cleaned, |_: &regex::Captures| {
        param_index += 1;
        format!("${}", param_index)
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_placeholders_in_order() {
        assert_eq!(
            sql("SELECT * FROM t WHERE a = ? AND b = ?"),
            "SELECT * FROM t WHERE a = $1 AND b = $2"
        );
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sql("SELECT\n    id\nFROM\n    t"), "SELECT id FROM t");
    }
}
