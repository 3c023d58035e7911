//! Helpers for building the SQL the Oracle row source runs.

/// Quotes an identifier, doubling embedded quotes.
///
/// Names are used exactly as configured: Oracle folds unquoted names to upper
/// case, so configuration should spell them the way the dictionary stores them.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"SCHEMA"."TABLE"`, or just `"TABLE"` when no schema is configured.
///
/// A table written as `SCHEMA.TABLE` overrides the connection's schema.
pub fn qualified_table(schema: Option<&str>, table: &str) -> String {
    match table.split_once('.') {
        Some((owner, name)) => format!("{}.{}", quote_identifier(owner), quote_identifier(name)),
        None => match schema {
            Some(owner) => format!("{}.{}", quote_identifier(owner), quote_identifier(table)),
            None => quote_identifier(table),
        },
    }
}

/// Full-table read in physical row order.
pub fn build_select_all(schema: Option<&str>, table: &str) -> String {
    format!("SELECT * FROM {} ORDER BY ROWID", qualified_table(schema, table))
}
