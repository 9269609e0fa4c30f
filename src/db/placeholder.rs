use std::borrow::Cow;

/// Marker the repository code writes for positional parameters.
pub const SOURCE_MARKER: &str = "%s";
/// What sqlx expects for both SQLite and MySQL.
pub const NATIVE_MARKER: &str = "?";

/// Rewrites `%s` markers into `?`.
///
/// Only applied when the statement is executed with parameters and actually
/// contains the marker. Parameterless SQL (DDL, literals containing `%s`) is
/// returned unchanged and unallocated.
pub fn translate_placeholders(sql: &str, has_params: bool) -> Cow<'_, str> {
    if has_params && sql.contains(SOURCE_MARKER) {
        Cow::Owned(sql.replace(SOURCE_MARKER, NATIVE_MARKER))
    } else {
        Cow::Borrowed(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_every_marker_when_params_present() {
        let sql = "INSERT INTO user (name, email) VALUES (%s, %s)";
        assert_eq!(
            translate_placeholders(sql, true),
            "INSERT INTO user (name, email) VALUES (?, ?)"
        );
    }

    #[test]
    fn leaves_sql_alone_without_params() {
        let sql = "SELECT * FROM user WHERE name LIKE 'x%s'";
        let out = translate_placeholders(sql, false);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, sql);
    }

    #[test]
    fn no_marker_is_borrowed_even_with_params() {
        let sql = "SELECT id FROM user WHERE id = ?";
        assert!(matches!(translate_placeholders(sql, true), Cow::Borrowed(_)));
    }
}
