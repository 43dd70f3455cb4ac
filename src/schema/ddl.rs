// src/schema/ddl.rs

use super::types::TableDef;

/// Double-quote an identifier (`date` is a keyword in both target stores).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Idempotent `CREATE TABLE IF NOT EXISTS` for a fixed destination table.
pub fn create_table_sql(table: &TableDef) -> String {
    let cols = table
        .columns
        .iter()
        .map(|c| {
            let null = if c.nullable { "" } else { " NOT NULL" };
            format!("    {} {}{}", quote_ident(&c.name), c.ty, null)
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        quote_ident(&table.name),
        cols
    )
}

/// `INSERT INTO t ("a", "b")` prefix shared by both sinks.
pub fn insert_prefix(table: &TableDef, columns: &[&str]) -> String {
    let names = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} ({}) ", quote_ident(&table.name), names)
}
