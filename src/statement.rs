use crate::types::RowValues;

/// Target table of a statement, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    /// Create an unqualified table reference
    ///
    /// # Arguments
    ///
    /// * `table` - The table name, unquoted
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
        }
    }

    /// Create a schema-qualified table reference
    ///
    /// # Arguments
    ///
    /// * `schema` - The database (schema) name, unquoted
    /// * `table` - The table name, unquoted
    pub fn with_schema(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            table: table.into(),
        }
    }

    /// `schema.table` when a schema is set, otherwise the bare table name.
    #[must_use]
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }
}

/// Where an INSERT takes its rows from.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// Literal row tuples, one inner vector per row, aligned with the column list.
    Values(Vec<Vec<RowValues>>),
    /// An embedded sub-select; no rows exist client-side.
    Select,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertNode {
    pub into: TableRef,
    pub columns: Vec<String>,
    /// `None` when the builder produced a shape with no detectable source node.
    pub source: Option<InsertSource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateNode {
    pub table: TableRef,
}

/// Root of the statement AST handed over by the query builder.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementNode {
    Insert(InsertNode),
    Update(UpdateNode),
    Select,
    /// DDL, session commands and anything else that returns no rows.
    Other,
}

impl StatementNode {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            StatementNode::Insert(_) => "insert",
            StatementNode::Update(_) => "update",
            StatementNode::Select => "select",
            StatementNode::Other => "other",
        }
    }
}

/// A statement already compiled by the query builder: SQL with `?` placeholders,
/// the values bound to them in order, and the AST root it was compiled from.
///
/// ```rust
/// use clickhouse_middleware::prelude::*;
///
/// let stmt = CompiledStatement::select(
///     "select * from company_metrics where company_id = ?",
///     vec![RowValues::Int(1)],
/// );
/// assert_eq!(stmt.node().kind(), "select");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    sql: String,
    parameters: Vec<RowValues>,
    node: StatementNode,
}

impl CompiledStatement {
    /// Create a compiled statement
    ///
    /// # Arguments
    ///
    /// * `sql` - SQL text with positional `?` placeholders
    /// * `parameters` - Values bound to the placeholders, left to right
    /// * `node` - The statement's kind and the AST details its execution path needs
    pub fn new(sql: impl Into<String>, parameters: Vec<RowValues>, node: StatementNode) -> Self {
        Self {
            sql: sql.into(),
            parameters,
            node,
        }
    }

    /// A row-returning statement.
    pub fn select(sql: impl Into<String>, parameters: Vec<RowValues>) -> Self {
        Self::new(sql, parameters, StatementNode::Select)
    }

    /// An UPDATE against `table`; executed as a ClickHouse mutation.
    pub fn update(sql: impl Into<String>, parameters: Vec<RowValues>, table: TableRef) -> Self {
        Self::new(sql, parameters, StatementNode::Update(UpdateNode { table }))
    }

    /// An INSERT into `into`
    ///
    /// # Arguments
    ///
    /// * `columns` - Target columns in the order the rows list them
    /// * `source` - Literal rows, a sub-select, or `None` when the source is not known
    pub fn insert(
        sql: impl Into<String>,
        parameters: Vec<RowValues>,
        into: TableRef,
        columns: Vec<String>,
        source: Option<InsertSource>,
    ) -> Self {
        Self::new(
            sql,
            parameters,
            StatementNode::Insert(InsertNode {
                into,
                columns,
                source,
            }),
        )
    }

    /// A statement with no parameters that returns no rows (DDL and the like).
    pub fn other(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new(), StatementNode::Other)
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn parameters(&self) -> &[RowValues] {
        &self.parameters
    }

    #[must_use]
    pub fn node(&self) -> &StatementNode {
        &self.node
    }
}
