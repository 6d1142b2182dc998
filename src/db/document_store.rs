use std::collections::HashSet;
use std::future::Future;

use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::entities::{Document, ID_FIELD};
use crate::models::requests::{FindOptions, is_valid_field_path};
use crate::utils::common;

/// Port to a collection-oriented document store.
pub trait DocumentStore: Send + Sync {
    /// Return the documents of `collection` matching `filter`, shaped by `projection` and
    /// ordered/paginated by `options`.
    fn find(
        &self,
        collection: &str,
        filter: &Document,
        projection: Option<&Document>,
        options: &FindOptions,
    ) -> impl Future<Output = AppResult<Vec<Document>>> + Send;

    /// Store `document`, assigning an `_id` when it has none. Returns the stored document.
    fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> impl Future<Output = AppResult<Document>> + Send;
}

/// Document store over the `documents` table, one JSON body per row.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DocumentStore for SqliteDocumentStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Document,
        projection: Option<&Document>,
        options: &FindOptions,
    ) -> AppResult<Vec<Document>> {
        options.validate()?;
        let projection = projection.map(Projection::compile).transpose()?.flatten();
        let compiled = CompiledQuery::build(filter, options)?;

        let mut query = sqlx::query_scalar::<_, String>(&compiled.sql).bind(collection);
        for param in compiled.params {
            query = match param {
                SqlParam::Int(v) => query.bind(v),
                SqlParam::Real(v) => query.bind(v),
                SqlParam::Text(v) => query.bind(v),
            };
        }

        let bodies = query.fetch_all(&self.pool).await?;

        bodies
            .iter()
            .map(|body| -> AppResult<Document> {
                let doc: Document = serde_json::from_str(body)?;
                Ok(match &projection {
                    Some(p) => p.apply(doc),
                    None => doc,
                })
            })
            .collect()
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> AppResult<Document> {
        let id = match document.get(ID_FIELD) {
            None | Some(Value::Null) => {
                let id = common::create_uuid();
                document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(AppError::invalid_document(format!(
                    "{ID_FIELD} must be a string, got {other}"
                )));
            }
        };

        let body = common::stringify_json(&document)?;

        sqlx::query("INSERT INTO documents (id, collection, body) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(collection)
            .bind(&body)
            .execute(&self.pool)
            .await?;

        tracing::debug!(collection = %collection, id = %id, "Document inserted");
        Ok(document)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SqlParam {
    Int(i64),
    Real(f64),
    Text(String),
}

impl SqlParam {
    fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            // json_extract yields 1/0 for JSON booleans; callers guard on json_type
            Value::Bool(b) => Some(Self::Int(i64::from(*b))),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Real)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

struct CompiledQuery {
    sql: String,
    params: Vec<SqlParam>,
}

impl CompiledQuery {
    fn build(filter: &Document, options: &FindOptions) -> AppResult<Self> {
        let mut clauses = vec!["collection = ?".to_string()];
        let mut params = Vec::new();

        for (field, condition) in filter {
            if !is_valid_field_path(field) {
                return Err(AppError::invalid_filter(format!("unsupported field '{field}'")));
            }
            let path = json_path(field);

            match condition {
                Value::Object(ops) if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) => {
                    for (op, operand) in ops {
                        clauses.push(operator_clause(&path, field, op, operand, &mut params)?);
                    }
                }
                Value::Object(_) | Value::Array(_) => {
                    return Err(AppError::invalid_filter(format!(
                        "field '{field}' cannot be matched against a composite value"
                    )));
                }
                scalar => clauses.push(equality_clause(&path, field, scalar, &mut params)?),
            }
        }

        let mut sql = format!(
            "SELECT body FROM documents WHERE {}",
            clauses.join(" AND ")
        );

        let order: Vec<String> = options
            .sort
            .iter()
            .map(|key| format!("{} {}", extract(&json_path(&key.field)), key.direction.as_sql()))
            .chain(std::iter::once("rowid ASC".to_string()))
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.join(", "));

        // A zero limit means no limit.
        let limit = options.limit.filter(|l| *l > 0);
        let offset = options.offset.filter(|o| *o > 0);
        match (limit, offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ?");
                params.push(SqlParam::Int(limit));
                if let Some(offset) = offset {
                    sql.push_str(" OFFSET ?");
                    params.push(SqlParam::Int(offset));
                }
            }
            (None, Some(offset)) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                params.push(SqlParam::Int(offset));
            }
            (None, None) => {}
        }

        Ok(Self { sql, params })
    }
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

fn extract(path: &str) -> String {
    format!("json_extract(body, '{path}')")
}

/// `json_type` names that share a comparison domain with `value`.
fn json_types(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "'true', 'false'",
        Value::Number(_) => "'integer', 'real'",
        _ => "'text'",
    }
}

/// `expr <sql_op> ?` restricted to stored values of the operand's JSON type, so SQLite's
/// cross-type ordering never matches a number against a string or boolean.
fn typed_comparison(
    path: &str,
    field: &str,
    sql_op: &str,
    value: &Value,
    params: &mut Vec<SqlParam>,
) -> AppResult<String> {
    params.push(scalar_param(field, value)?);
    Ok(format!(
        "(json_type(body, '{path}') IN ({}) AND {} {sql_op} ?)",
        json_types(value),
        extract(path)
    ))
}

fn equality_clause(
    path: &str,
    field: &str,
    value: &Value,
    params: &mut Vec<SqlParam>,
) -> AppResult<String> {
    if value.is_null() {
        return Ok(format!("{} IS NULL", extract(path)));
    }
    typed_comparison(path, field, "=", value, params)
}

fn operator_clause(
    path: &str,
    field: &str,
    op: &str,
    operand: &Value,
    params: &mut Vec<SqlParam>,
) -> AppResult<String> {
    let expr = extract(path);

    match op {
        "$eq" => equality_clause(path, field, operand, params),
        "$ne" if operand.is_null() => Ok(format!("{expr} IS NOT NULL")),
        // Missing fields and values of another type are "not equal".
        "$ne" => Ok(format!(
            "NOT COALESCE({}, 0)",
            typed_comparison(path, field, "=", operand, params)?
        )),
        "$gt" => typed_comparison(path, field, ">", operand, params),
        "$gte" => typed_comparison(path, field, ">=", operand, params),
        "$lt" => typed_comparison(path, field, "<", operand, params),
        "$lte" => typed_comparison(path, field, "<=", operand, params),
        "$in" => {
            let candidates = operand.as_array().ok_or_else(|| {
                AppError::invalid_filter(format!("$in on '{field}' requires an array"))
            })?;
            let mut alternatives = Vec::with_capacity(candidates.len());
            let mut matches_null = false;
            for candidate in candidates {
                if candidate.is_null() {
                    matches_null = true;
                    continue;
                }
                alternatives.push(typed_comparison(path, field, "=", candidate, params)?);
            }
            if matches_null {
                alternatives.push(format!("{expr} IS NULL"));
            }
            if alternatives.is_empty() {
                return Ok("0".to_string());
            }
            Ok(format!("({})", alternatives.join(" OR ")))
        }
        "$exists" => {
            let exists = operand.as_bool().ok_or_else(|| {
                AppError::invalid_filter(format!("$exists on '{field}' requires a boolean"))
            })?;
            let null_check = if exists { "IS NOT NULL" } else { "IS NULL" };
            Ok(format!("json_type(body, '{path}') {null_check}"))
        }
        other => Err(AppError::invalid_filter(format!(
            "unsupported operator '{other}' on '{field}'"
        ))),
    }
}

fn scalar_param(field: &str, value: &Value) -> AppResult<SqlParam> {
    SqlParam::from_scalar(value).ok_or_else(|| {
        AppError::invalid_filter(format!("field '{field}' requires a scalar operand, got {value}"))
    })
}

/// Field selection applied to each result document.
#[derive(Debug)]
enum Projection {
    Include { fields: HashSet<String>, keep_id: bool },
    Exclude(HashSet<String>),
}

impl Projection {
    /// `None` when `selection` names no fields, meaning whole documents.
    fn compile(selection: &Document) -> AppResult<Option<Self>> {
        let mut include = HashSet::new();
        let mut exclude = HashSet::new();
        let mut keep_id = true;

        for (field, flag) in selection {
            if field.contains('.') || !is_valid_field_path(field) {
                return Err(AppError::invalid_projection(format!(
                    "unsupported field '{field}'"
                )));
            }
            let included = match flag {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
                other => {
                    return Err(AppError::invalid_projection(format!(
                        "field '{field}' must map to 0/1 or a boolean, got {other}"
                    )));
                }
            };

            if field == ID_FIELD {
                keep_id = included;
            } else if included {
                include.insert(field.clone());
            } else {
                exclude.insert(field.clone());
            }
        }

        if !include.is_empty() && !exclude.is_empty() {
            return Err(AppError::invalid_projection(
                "cannot mix inclusion and exclusion",
            ));
        }

        let explicit_id = selection.contains_key(ID_FIELD);
        Ok(if !include.is_empty() || (explicit_id && keep_id && exclude.is_empty()) {
            Some(Self::Include {
                fields: include,
                keep_id,
            })
        } else if !exclude.is_empty() || !keep_id {
            if !keep_id {
                exclude.insert(ID_FIELD.to_string());
            }
            Some(Self::Exclude(exclude))
        } else {
            None
        })
    }

    fn apply(&self, mut doc: Document) -> Document {
        match self {
            Self::Include { fields, keep_id } => {
                doc.retain(|k, _| fields.contains(k) || (*keep_id && k == ID_FIELD));
                doc
            }
            Self::Exclude(fields) => {
                doc.retain(|k, _| !fields.contains(k));
                doc
            }
        }
    }
}
