use sqlx::mysql::MySqlDatabaseError;

fn mysql_error_number(err: &sqlx::Error) -> Option<u16> {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return Some(mysql_err.number());
        }
    }
    None
}

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    mysql_error_number(err) == Some(1062) // ER_DUP_ENTRY
}

pub fn is_fk_violation(err: &sqlx::Error) -> bool {
    mysql_error_number(err) == Some(1452) // ER_NO_REFERENCED_ROW_2
}

/// `%term%` with LIKE metacharacters escaped, for a case-insensitive
/// substring match under the default collation.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("core"), "%core%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn non_database_errors_are_neither_dup_nor_fk() {
        let err = sqlx::Error::RowNotFound;
        assert!(!is_dup_key(&err));
        assert!(!is_fk_violation(&err));
    }
}
