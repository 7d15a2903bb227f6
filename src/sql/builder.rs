//! Ready-made SQL statements for common analysis and cleaning passes over
//! mapped sheet tables.
//!
//! Everything here is a pure string builder: no connection, no state. The
//! statements target SQLite's dialect (`strftime`, window functions, `rowid`).

use super::store::quote_ident;
use crate::types::CellValue;

/// Render a cell value as a SQL literal. Text is single-quoted with embedded
/// quotes doubled; booleans become 1/0; datetimes become ISO strings.
pub fn literal(value: &CellValue) -> String {
    match value {
        CellValue::Null => "NULL".to_string(),
        CellValue::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(x) => x.to_string(),
        CellValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
        CellValue::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
    }
}

pub fn select_all(table: &str) -> String {
    format!("SELECT * FROM {}", quote_ident(table))
}

pub fn select_columns(table: &str, columns: &[&str]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!("SELECT {} FROM {}", cols.join(", "), quote_ident(table))
}

pub fn filter_compare(table: &str, column: &str, operator: &str, value: &CellValue) -> String {
    format!(
        "SELECT * FROM {} WHERE {} {} {}",
        quote_ident(table),
        quote_ident(column),
        operator,
        literal(value)
    )
}

pub fn filter_in(table: &str, column: &str, values: &[CellValue]) -> String {
    let rendered: Vec<String> = values.iter().map(literal).collect();
    format!(
        "SELECT * FROM {} WHERE {} IN ({})",
        quote_ident(table),
        quote_ident(column),
        rendered.join(", ")
    )
}

pub fn filter_between(table: &str, column: &str, min: &CellValue, max: &CellValue) -> String {
    format!(
        "SELECT * FROM {} WHERE {} BETWEEN {} AND {}",
        quote_ident(table),
        quote_ident(column),
        literal(min),
        literal(max)
    )
}

pub fn group_by_count(table: &str, column: &str) -> String {
    format!(
        "SELECT {col}, COUNT(*) AS count FROM {t} GROUP BY {col} ORDER BY count DESC",
        col = quote_ident(column),
        t = quote_ident(table)
    )
}

pub fn group_by_sum(table: &str, group_column: &str, sum_column: &str) -> String {
    format!(
        "SELECT {g}, SUM({s}) AS total FROM {t} GROUP BY {g} ORDER BY total DESC",
        g = quote_ident(group_column),
        s = quote_ident(sum_column),
        t = quote_ident(table)
    )
}

pub fn group_by_avg(table: &str, group_column: &str, avg_column: &str) -> String {
    format!(
        "SELECT {g}, AVG({a}) AS average FROM {t} GROUP BY {g} ORDER BY average DESC",
        g = quote_ident(group_column),
        a = quote_ident(avg_column),
        t = quote_ident(table)
    )
}

pub fn top_n(table: &str, order_column: &str, n: usize, ascending: bool) -> String {
    format!(
        "SELECT * FROM {} ORDER BY {} {} LIMIT {}",
        quote_ident(table),
        quote_ident(order_column),
        if ascending { "ASC" } else { "DESC" },
        n
    )
}

pub fn find_duplicates(table: &str, columns: &[&str]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let cols = cols.join(", ");
    format!(
        "SELECT {cols}, COUNT(*) AS duplicate_count FROM {t} \
         GROUP BY {cols} HAVING COUNT(*) > 1 ORDER BY duplicate_count DESC",
        t = quote_ident(table)
    )
}

pub fn find_missing_values(table: &str, column: &str) -> String {
    format!(
        "SELECT * FROM {t} WHERE {c} IS NULL OR {c} = ''",
        t = quote_ident(table),
        c = quote_ident(column)
    )
}

pub fn basic_statistics(table: &str, numeric_column: &str) -> String {
    format!(
        "SELECT COUNT({c}) AS count, MIN({c}) AS minimum, MAX({c}) AS maximum, \
         AVG({c}) AS average, SUM({c}) AS total FROM {t} WHERE {c} IS NOT NULL",
        c = quote_ident(numeric_column),
        t = quote_ident(table)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

pub fn join_tables(left: &str, right: &str, join_column: &str, kind: JoinKind) -> String {
    let join = match kind {
        JoinKind::Inner => "INNER JOIN",
        JoinKind::Left => "LEFT JOIN",
    };
    format!(
        "SELECT t1.*, t2.* FROM {l} t1 {join} {r} t2 ON t1.{c} = t2.{c}",
        l = quote_ident(left),
        r = quote_ident(right),
        c = quote_ident(join_column)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Avg,
    Count,
}

impl Aggregate {
    fn sql_name(self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Count => "COUNT",
        }
    }
}

/// CASE-based pivot: one aggregated column per entry in `pivot_values`
/// (aliased by the value itself), grouped by `row_column`.
pub fn pivot_summary(
    table: &str,
    row_column: &str,
    col_column: &str,
    value_column: &str,
    agg: Aggregate,
    pivot_values: &[&str],
) -> String {
    let r = quote_ident(row_column);
    let c = quote_ident(col_column);
    let v = quote_ident(value_column);
    let cases: Vec<String> = pivot_values
        .iter()
        .map(|pv| {
            format!(
                "{agg}(CASE WHEN {c} = '{val}' THEN {v} END) AS {alias}",
                agg = agg.sql_name(),
                c = c,
                val = pv.replace('\'', "''"),
                v = v,
                alias = quote_ident(pv),
            )
        })
        .collect();
    format!(
        "SELECT {r}, {cases} FROM {t} GROUP BY {r} ORDER BY {r}",
        r = r,
        cases = cases.join(", "),
        t = quote_ident(table)
    )
}

//==============================================================================
// Analysis queries
//==============================================================================

/// Monthly count/total/average over an ISO date column.
pub fn monthly_trend(table: &str, date_column: &str, value_column: &str) -> String {
    format!(
        "SELECT strftime('%Y-%m', {d}) AS month, COUNT(*) AS count, \
         SUM({v}) AS total, AVG({v}) AS average \
         FROM {t} WHERE {d} IS NOT NULL \
         GROUP BY strftime('%Y-%m', {d}) ORDER BY month",
        d = quote_ident(date_column),
        v = quote_ident(value_column),
        t = quote_ident(table)
    )
}

/// Totals per calendar quarter over an ISO date column.
pub fn quarterly_totals(table: &str, date_column: &str, value_column: &str) -> String {
    format!(
        "SELECT strftime('%Y', {d}) AS year, \
         CASE \
         WHEN CAST(strftime('%m', {d}) AS INTEGER) BETWEEN 1 AND 3 THEN 'Q1' \
         WHEN CAST(strftime('%m', {d}) AS INTEGER) BETWEEN 4 AND 6 THEN 'Q2' \
         WHEN CAST(strftime('%m', {d}) AS INTEGER) BETWEEN 7 AND 9 THEN 'Q3' \
         ELSE 'Q4' END AS quarter, \
         SUM({v}) AS total \
         FROM {t} WHERE {d} IS NOT NULL \
         GROUP BY year, quarter ORDER BY year, quarter",
        d = quote_ident(date_column),
        v = quote_ident(value_column),
        t = quote_ident(table)
    )
}

/// 80/20 breakdown: per-category totals with cumulative percentage, tagged
/// 'Top 80%' or 'Bottom 20%'.
pub fn pareto_analysis(table: &str, category_column: &str, value_column: &str) -> String {
    format!(
        "WITH ranked_data AS ( \
         SELECT {c} AS category, SUM({v}) AS total_value, \
         SUM(SUM({v})) OVER () AS grand_total \
         FROM {t} GROUP BY {c} ), \
         cumulative_data AS ( \
         SELECT category, total_value, grand_total, \
         SUM(total_value) OVER (ORDER BY total_value DESC) AS cumulative_value, \
         ROUND(100.0 * SUM(total_value) OVER (ORDER BY total_value DESC) / grand_total, 2) AS cumulative_percentage \
         FROM ranked_data ) \
         SELECT category, total_value, cumulative_value, cumulative_percentage, \
         CASE WHEN cumulative_percentage <= 80 THEN 'Top 80%' ELSE 'Bottom 20%' END AS pareto_category \
         FROM cumulative_data ORDER BY total_value DESC",
        c = quote_ident(category_column),
        v = quote_ident(value_column),
        t = quote_ident(table)
    )
}

/// Z-score based outlier tagging against the column mean.
pub fn outlier_detection(table: &str, numeric_column: &str, threshold: f64) -> String {
    format!(
        "WITH stats AS ( \
         SELECT AVG({c}) AS mean_value, \
         AVG({c} * {c}) - AVG({c}) * AVG({c}) AS variance \
         FROM {t} WHERE {c} IS NOT NULL ) \
         SELECT t.*, s.mean_value, SQRT(s.variance) AS std_dev, \
         ABS(t.{c} - s.mean_value) / SQRT(s.variance) AS z_score, \
         CASE WHEN ABS(t.{c} - s.mean_value) / SQRT(s.variance) > {th} \
         THEN 'Outlier' ELSE 'Normal' END AS outlier_status \
         FROM {t} t, stats s WHERE t.{c} IS NOT NULL ORDER BY z_score DESC",
        c = quote_ident(numeric_column),
        t = quote_ident(table),
        th = threshold
    )
}

//==============================================================================
// Cleaning statements (mutations)
//==============================================================================

/// Delete duplicate rows, keeping the first occurrence per key.
pub fn remove_duplicates(table: &str, unique_columns: &[&str]) -> String {
    let cols: Vec<String> = unique_columns.iter().map(|c| quote_ident(c)).collect();
    format!(
        "DELETE FROM {t} WHERE rowid NOT IN ( \
         SELECT MIN(rowid) FROM {t} GROUP BY {cols} )",
        t = quote_ident(table),
        cols = cols.join(", ")
    )
}

/// Replace NULL or empty values with a default.
pub fn fill_missing(table: &str, column: &str, default: &CellValue) -> String {
    format!(
        "UPDATE {t} SET {c} = {v} WHERE {c} IS NULL OR {c} = ''",
        t = quote_ident(table),
        c = quote_ident(column),
        v = literal(default)
    )
}

/// Strip common punctuation (`!`, `@`, `#`, `$`, `%`) from a text column.
pub fn remove_special_characters(table: &str, column: &str) -> String {
    let c = quote_ident(column);
    let mut expr = c.clone();
    for ch in ['!', '@', '#', '$', '%'] {
        expr = format!("REPLACE({expr}, '{ch}', '')");
    }
    format!(
        "UPDATE {t} SET {c} = {expr} WHERE {c} IS NOT NULL",
        t = quote_ident(table),
        c = c,
        expr = expr
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Upper,
    Lower,
    Trim,
    Title,
}

/// Normalize a text column in place.
pub fn standardize_text(table: &str, column: &str, op: TextOp) -> String {
    let c = quote_ident(column);
    let expr = match op {
        TextOp::Upper => format!("UPPER(TRIM({c}))"),
        TextOp::Lower => format!("LOWER(TRIM({c}))"),
        TextOp::Trim => format!("TRIM({c})"),
        TextOp::Title => {
            format!("UPPER(SUBSTR(TRIM({c}), 1, 1)) || LOWER(SUBSTR(TRIM({c}), 2))")
        }
    };
    format!(
        "UPDATE {t} SET {c} = {expr} WHERE {c} IS NOT NULL",
        t = quote_ident(table),
        c = c
    )
}
