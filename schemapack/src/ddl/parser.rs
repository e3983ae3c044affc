// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! nom parser for the built-in DDL subset
//!
//! Schema text is first split into `;`-terminated statements (with `--`
//! comments blanked out so line numbers survive), then each statement is
//! parsed on its own. Unquoted identifiers are folded to upper case.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{all_consuming, cut, map, map_res, not, opt, recognize, value, verify},
    error::{Error, ErrorKind},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::*;

type PResult<'a, T> = IResult<&'a str, T>;

/// Syntax error at a 1-based line of the schema text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: u32,
    pub message: String,
}

static GROUP_BY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bGROUP\s+BY\b").expect("GROUP BY pattern is valid"));

const RESERVED: &[&str] = &[
    "AS", "ASSUMEUNIQUE", "BY", "CONSTRAINT", "DEFAULT", "FROM", "GROUP", "KEY", "NOT", "NULL",
    "ON", "PRIMARY", "SELECT", "UNIQUE", "WHERE",
];

/// Parse every statement of a schema source
pub fn parse_ddl(text: &str) -> Result<Vec<Located<DdlStatement>>, SyntaxError> {
    split_statements(text)
        .into_iter()
        .map(|(line, statement)| {
            parse_statement(&statement, line).map(|node| Located { line, node })
        })
        .collect()
}

fn parse_statement(text: &str, line: u32) -> Result<DdlStatement, SyntaxError> {
    let result = all_consuming(delimited(
        multispace0,
        alt((create_table, create_index, create_view)),
        multispace0,
    ))(text);

    match result {
        Ok((_, statement)) => Ok(statement),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(syntax_error(text, line, e.input))
        }
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError {
            line,
            message: "Unexpected end of statement".to_string(),
        }),
    }
}

fn syntax_error(statement: &str, line: u32, remaining: &str) -> SyntaxError {
    let offset = statement.len() - remaining.len();
    let consumed = &statement[..offset];
    let leading = statement.len() - statement.trim_start().len();
    let line = line + consumed[leading.min(offset)..].matches('\n').count() as u32;

    let message = if consumed.trim().is_empty() {
        let head = statement.trim().lines().next().unwrap_or_default();
        format!("Unsupported DDL statement: {}", head)
    } else if remaining.trim().is_empty() {
        "Unexpected end of statement".to_string()
    } else {
        let snippet: String = remaining.trim_start().chars().take(24).collect();
        format!("Syntax error near '{}'", snippet)
    };
    SyntaxError { line, message }
}

/// Split into statements, returning each with the line it starts on
fn split_statements(text: &str) -> Vec<(u32, String)> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut start_line = None;
    let mut line = 1u32;
    let mut in_quote = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !in_quote && c == '-' && chars.peek() == Some(&'-') {
            for skipped in chars.by_ref() {
                if skipped == '\n' {
                    current.push('\n');
                    line += 1;
                    break;
                }
            }
            continue;
        }

        if c == '\'' {
            in_quote = !in_quote;
        }

        if !in_quote && c == ';' {
            if let Some(start) = start_line.take() {
                statements.push((start, std::mem::take(&mut current)));
            }
            current.clear();
            continue;
        }

        if start_line.is_none() && !c.is_whitespace() {
            start_line = Some(line);
        }
        if start_line.is_some() {
            current.push(c);
        }
        if c == '\n' {
            line += 1;
        }
    }

    if let Some(start) = start_line {
        if !current.trim().is_empty() {
            statements.push((start, current));
        }
    }
    statements
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    ws(terminated(tag_no_case(kw), not(satisfy(is_ident_char))))
}

fn symbol<'a>(c: char) -> impl FnMut(&'a str) -> PResult<'a, char> {
    ws(char(c))
}

fn identifier(input: &str) -> PResult<'_, String> {
    ws(alt((
        verify(
            map(
                recognize(pair(
                    satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
                    take_while(is_ident_char),
                )),
                |s: &str| s.to_ascii_uppercase(),
            ),
            |s: &str| !RESERVED.contains(&s),
        ),
        map(
            delimited(char('"'), take_while1(|c| c != '"'), char('"')),
            |s: &str| s.to_string(),
        ),
    )))(input)
}

fn integer(input: &str) -> PResult<'_, i64> {
    ws(map_res(digit1, |s: &str| s.parse::<i64>()))(input)
}

fn column_list(input: &str) -> PResult<'_, Vec<String>> {
    delimited(
        symbol('('),
        separated_list1(symbol(','), identifier),
        symbol(')'),
    )(input)
}

fn string_literal(input: &str) -> PResult<'_, String> {
    delimited(
        char('\''),
        map(
            many0(alt((
                map(tag("''"), |_| "'".to_string()),
                map(take_while1(|c| c != '\''), |s: &str| s.to_string()),
            ))),
            |parts: Vec<String>| parts.concat(),
        ),
        char('\''),
    )(input)
}

fn literal(input: &str) -> PResult<'_, Literal> {
    ws(alt((
        value(
            Literal::Null,
            terminated(tag_no_case("NULL"), not(satisfy(is_ident_char))),
        ),
        map(
            recognize(tuple((
                opt(char('-')),
                digit1,
                opt(pair(char('.'), digit1)),
            ))),
            |s: &str| Literal::Number(s.to_string()),
        ),
        map(string_literal, Literal::Text),
    )))(input)
}

fn uniqueness(input: &str) -> PResult<'_, Uniqueness> {
    alt((
        value(Uniqueness::Unique, keyword("UNIQUE")),
        value(Uniqueness::AssumeUnique, keyword("ASSUMEUNIQUE")),
    ))(input)
}

#[derive(Debug, Clone)]
enum ColumnOption {
    Default(Literal),
    NotNull,
    Null,
    PrimaryKey,
    Unique(Uniqueness),
}

fn column_option(input: &str) -> PResult<'_, ColumnOption> {
    alt((
        map(preceded(keyword("DEFAULT"), literal), ColumnOption::Default),
        value(ColumnOption::NotNull, pair(keyword("NOT"), keyword("NULL"))),
        value(ColumnOption::Null, keyword("NULL")),
        value(
            ColumnOption::PrimaryKey,
            pair(keyword("PRIMARY"), keyword("KEY")),
        ),
        map(uniqueness, ColumnOption::Unique),
    ))(input)
}

fn column_type(input: &str) -> PResult<'_, (String, Option<i64>)> {
    let (input, name) = ws(map(take_while1(is_ident_char), |s: &str| {
        s.to_ascii_uppercase()
    }))(input)?;
    let (input, size) = opt(delimited(
        symbol('('),
        pair(integer, opt(preceded(symbol(','), integer))),
        symbol(')'),
    ))(input)?;
    Ok((input, (name, size.map(|(size, _)| size))))
}

fn column_def(input: &str) -> PResult<'_, ColumnDef> {
    let (input, name) = identifier(input)?;
    let (input, (type_name, size)) = column_type(input)?;
    let (input, options) = many0(column_option)(input)?;

    let mut column = ColumnDef {
        name,
        type_name,
        size,
        not_null: false,
        default: None,
        primary_key: false,
        unique: None,
    };
    for option in options {
        match option {
            ColumnOption::Default(literal) => column.default = Some(literal),
            ColumnOption::NotNull => column.not_null = true,
            ColumnOption::Null => column.not_null = false,
            ColumnOption::PrimaryKey => column.primary_key = true,
            ColumnOption::Unique(kind) => column.unique = Some(kind),
        }
    }
    Ok((input, column))
}

fn table_constraint(input: &str) -> PResult<'_, TableConstraint> {
    let (input, name) = opt(preceded(keyword("CONSTRAINT"), identifier))(input)?;
    let (input, kind) = alt((
        map(pair(keyword("PRIMARY"), keyword("KEY")), |_| None),
        map(uniqueness, Some),
    ))(input)?;
    let (input, columns) = column_list(input)?;

    let constraint = match kind {
        None => TableConstraint::PrimaryKey { name, columns },
        Some(kind) => TableConstraint::Unique {
            name,
            kind,
            columns,
        },
    };
    Ok((input, constraint))
}

enum TableElement {
    Column(ColumnDef),
    Constraint(TableConstraint),
}

fn table_element(input: &str) -> PResult<'_, TableElement> {
    alt((
        map(table_constraint, TableElement::Constraint),
        map(column_def, TableElement::Column),
    ))(input)
}

fn create_table(input: &str) -> PResult<'_, DdlStatement> {
    let (input, _) = pair(keyword("CREATE"), keyword("TABLE"))(input)?;
    let (input, (name, elements)) = cut(pair(
        identifier,
        delimited(
            symbol('('),
            separated_list1(symbol(','), table_element),
            symbol(')'),
        ),
    ))(input)?;

    let mut columns = Vec::new();
    let mut constraints = Vec::new();
    for element in elements {
        match element {
            TableElement::Column(c) => columns.push(c),
            TableElement::Constraint(c) => constraints.push(c),
        }
    }
    Ok((
        input,
        DdlStatement::CreateTable(CreateTable {
            name,
            columns,
            constraints,
        }),
    ))
}

fn create_index(input: &str) -> PResult<'_, DdlStatement> {
    let (input, _) = keyword("CREATE")(input)?;
    let (input, unique) = opt(uniqueness)(input)?;
    let (input, _) = keyword("INDEX")(input)?;
    let (input, (name, table, columns)) = cut(tuple((
        identifier,
        preceded(keyword("ON"), identifier),
        column_list,
    )))(input)?;

    Ok((
        input,
        DdlStatement::CreateIndex(CreateIndex {
            name,
            table,
            columns,
            unique,
        }),
    ))
}

fn aggregate(input: &str) -> PResult<'_, Aggregate> {
    alt((
        value(Aggregate::Count, keyword("COUNT")),
        value(Aggregate::Sum, keyword("SUM")),
        value(Aggregate::Min, keyword("MIN")),
        value(Aggregate::Max, keyword("MAX")),
    ))(input)
}

fn select_item(input: &str) -> PResult<'_, SelectItem> {
    let (input, expr) = alt((
        value(
            SelectExpr::CountStar,
            tuple((keyword("COUNT"), symbol('('), symbol('*'), symbol(')'))),
        ),
        map(
            pair(aggregate, delimited(symbol('('), identifier, symbol(')'))),
            |(function, column)| SelectExpr::Aggregate { function, column },
        ),
        map(identifier, SelectExpr::Column),
    ))(input)?;
    let (input, alias) = opt(preceded(opt(keyword("AS")), identifier))(input)?;
    Ok((input, SelectItem { expr, alias }))
}

/// Everything between WHERE and GROUP BY
fn predicate(input: &str) -> PResult<'_, String> {
    match GROUP_BY.find(input) {
        Some(m) if !input[..m.start()].trim().is_empty() => {
            Ok((&input[m.start()..], input[..m.start()].trim().to_string()))
        }
        _ => Err(nom::Err::Error(Error::new(input, ErrorKind::TakeUntil))),
    }
}

fn create_view(input: &str) -> PResult<'_, DdlStatement> {
    let (input, _) = pair(keyword("CREATE"), keyword("VIEW"))(input)?;
    let (input, (name, column_names, items, source, predicate, group_by)) = cut(tuple((
        identifier,
        map(opt(column_list), Option::unwrap_or_default),
        preceded(
            pair(keyword("AS"), keyword("SELECT")),
            separated_list1(symbol(','), select_item),
        ),
        preceded(keyword("FROM"), identifier),
        opt(preceded(keyword("WHERE"), predicate)),
        preceded(
            pair(keyword("GROUP"), keyword("BY")),
            separated_list1(symbol(','), identifier),
        ),
    )))(input)?;

    Ok((
        input,
        DdlStatement::CreateView(CreateView {
            name,
            column_names,
            items,
            source,
            predicate,
            group_by,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_with_constraints() {
        let statements = parse_ddl(
            "-- orders\n\
             create table Orders (\n\
               id integer not null,\n\
               name varchar(32) default 'it''s',\n\
               amount decimal(10, 2),\n\
               code int unique,\n\
               CONSTRAINT pk_orders PRIMARY KEY (id)\n\
             );",
        )
        .unwrap();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].line, 2);

        let DdlStatement::CreateTable(table) = &statements[0].node else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(table.name, "ORDERS");
        assert_eq!(table.columns.len(), 4);
        assert!(table.columns[0].not_null);
        assert_eq!(table.columns[1].type_name, "VARCHAR");
        assert_eq!(table.columns[1].size, Some(32));
        assert_eq!(
            table.columns[1].default,
            Some(Literal::Text("it's".to_string()))
        );
        assert_eq!(table.columns[2].size, Some(10));
        assert_eq!(table.columns[3].unique, Some(Uniqueness::Unique));
        assert_eq!(
            table.constraints,
            vec![TableConstraint::PrimaryKey {
                name: Some("PK_ORDERS".to_string()),
                columns: vec!["ID".to_string()],
            }]
        );
    }

    #[test]
    fn test_create_index_and_view() {
        let statements = parse_ddl(
            "CREATE ASSUMEUNIQUE INDEX idx ON t (a, b);\n\
             CREATE VIEW v (a, total, n) AS SELECT a, SUM(b) AS total, COUNT(*) \
             FROM t WHERE b > 0 GROUP BY a;",
        )
        .unwrap();
        assert_eq!(statements.len(), 2);

        let DdlStatement::CreateIndex(index) = &statements[0].node else {
            panic!("expected CREATE INDEX");
        };
        assert_eq!(index.unique, Some(Uniqueness::AssumeUnique));
        assert_eq!(index.columns, vec!["A", "B"]);

        let DdlStatement::CreateView(view) = &statements[1].node else {
            panic!("expected CREATE VIEW");
        };
        assert_eq!(statements[1].line, 2);
        assert_eq!(view.source, "T");
        assert_eq!(view.predicate.as_deref(), Some("b > 0"));
        assert_eq!(view.group_by, vec!["A"]);
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.items[2].expr, SelectExpr::CountStar);
        assert_eq!(
            view.items[1].expr,
            SelectExpr::Aggregate {
                function: Aggregate::Sum,
                column: "B".to_string(),
            }
        );
        assert_eq!(view.items[1].alias.as_deref(), Some("TOTAL"));
    }

    #[test]
    fn test_errors_report_line() {
        let err = parse_ddl("CREATE TABLE a (x INTEGER);\n\nCREATE TABLE b (\n  x INTEGER,\n  )")
            .unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.starts_with("Syntax error near ','"));

        let err = parse_ddl("\n\nDROP TABLE a;").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.starts_with("Unsupported DDL statement"));
    }

    #[test]
    fn test_split_ignores_semicolons_in_comments_and_quotes() {
        let statements = split_statements("a -- b; c\n'x;y' z;\n\n  w");
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].0, 1);
        assert_eq!(statements[1].0, 4);
    }
}
