//! In-memory collaborators.
//!
//! Plain-data implementations of [`Model`], [`Entity`] and [`Relation`],
//! used by the test suites and usable by hosts that render data they
//! already hold.


use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    hash::hex_digest,
    traits::{Association, Entity, EntityRef, Model, Records, Relation},
    value::{Document, Value},
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

///
/// MemoryModel
///

#[derive(Clone, Debug)]
pub struct MemoryModel {
    name: String,
    table: String,
    columns: Vec<String>,
    associations: HashMap<String, String>,
}

impl MemoryModel {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            associations: HashMap::new(),
        }
    }

    /// Declare the target type of a named association.
    #[must_use]
    pub fn with_association(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.associations.insert(name.into(), target.into());
        self
    }

    #[must_use]
    pub fn association_target(&self, name: &str) -> Option<&str> {
        self.associations.get(name).map(String::as_str)
    }
}

impl Model for MemoryModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn table_name(&self) -> &str {
        &self.table
    }

    fn column_names(&self) -> &[String] {
        &self.columns
    }
}

///
/// Record
///
/// One row of a [`MemoryModel`] plus its loaded associations.
/// Identity is `table/id`.
///

#[derive(Clone)]
pub struct Record {
    model: Arc<MemoryModel>,
    id: i64,
    values: Document,
    version: Option<String>,
    associations: HashMap<String, Association>,
    blank: bool,
}

impl Record {
    #[must_use]
    pub fn new(model: &Arc<MemoryModel>, id: i64) -> Self {
        let mut values = Document::new();
        values.insert("id", id);

        Self {
            model: Arc::clone(model),
            id,
            values,
            version: None,
            associations: HashMap::new(),
            blank: false,
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_one(mut self, name: impl Into<String>, related: Option<EntityRef>) -> Self {
        self.associations
            .insert(name.into(), Association::One(related));
        self
    }

    #[must_use]
    pub fn with_many(mut self, name: impl Into<String>, related: impl Into<Records>) -> Self {
        self.associations
            .insert(name.into(), Association::Many(related.into()));
        self
    }

    /// Mark the record as present-but-blank.
    #[must_use]
    pub const fn blank(mut self) -> Self {
        self.blank = true;
        self
    }

    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn into_ref(self) -> EntityRef {
        Arc::new(self)
    }
}

impl Entity for Record {
    fn type_path(&self) -> &str {
        self.model.name()
    }

    // An unset declared column reads as NULL, the same as a plucked row.
    fn attribute(&self, name: &str) -> Option<Value> {
        self.values
            .get(name)
            .cloned()
            .or_else(|| self.model.has_column(name).then_some(Value::Null))
    }

    fn association(&self, name: &str) -> Option<Association> {
        self.associations.get(name).cloned()
    }

    fn association_target(&self, name: &str) -> Option<String> {
        self.model.association_target(name).map(str::to_string)
    }

    fn cache_key(&self) -> String {
        format!("{}/{}", self.model.table_name(), self.id)
    }

    fn cache_version(&self) -> Option<String> {
        self.version.clone()
    }

    fn is_blank(&self) -> bool {
        self.blank
    }
}

///
/// MemoryRelation
///
/// Ordered rows of one model with an optional limit.
///
/// Counts pluck and load calls so callers can assert which render path
/// ran. Identity is `table/query-<digest>` over the query shape and the
/// ordered identities of the visible rows; the content version is
/// `<count>-<digest>` over every visible row's identity and version.
///

pub struct MemoryRelation {
    model: Arc<MemoryModel>,
    rows: Vec<Arc<Record>>,
    limit: Option<usize>,
    plucks: AtomicU64,
    loads: AtomicU64,
}

impl MemoryRelation {
    #[must_use]
    pub fn new(model: &Arc<MemoryModel>, rows: impl IntoIterator<Item = Record>) -> Self {
        Self {
            model: Arc::clone(model),
            rows: rows.into_iter().map(Arc::new).collect(),
            limit: None,
            plucks: AtomicU64::new(0),
            loads: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn pluck_calls(&self) -> u64 {
        self.plucks.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn load_calls(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    fn visible(&self) -> &[Arc<Record>] {
        let end = self.limit.map_or(self.rows.len(), |n| n.min(self.rows.len()));

        &self.rows[..end]
    }

    // Accepts `table.column` for this model's table or a bare column name.
    fn column<'c>(&self, qualified: &'c str) -> Result<&'c str, InternalError> {
        let column = match qualified.split_once('.') {
            Some((table, column)) if table == self.model.table_name() => column,
            Some(_) => {
                return Err(InternalError::store_unsupported(format!(
                    "column {qualified} does not belong to table {}",
                    self.model.table_name()
                )));
            }
            None => qualified,
        };

        if !self.model.has_column(column) {
            return Err(InternalError::new(
                ErrorClass::NotFound,
                ErrorOrigin::Store,
                format!("unknown column {qualified}"),
            ));
        }

        Ok(column)
    }
}

impl Relation for MemoryRelation {
    fn model(&self) -> &dyn Model {
        &*self.model
    }

    fn pluck(&self, columns: &[String]) -> Result<Vec<Vec<Value>>, InternalError> {
        self.plucks.fetch_add(1, Ordering::Relaxed);

        let columns = columns
            .iter()
            .map(|c| self.column(c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self
            .visible()
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.attribute(column).unwrap_or_default())
                    .collect()
            })
            .collect())
    }

    fn records(&self) -> Result<Box<dyn Iterator<Item = EntityRef> + '_>, InternalError> {
        self.loads.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(
            self.visible()
                .iter()
                .map(|row| Arc::clone(row) as EntityRef),
        ))
    }

    fn cache_key(&self) -> String {
        let table = self.model.table_name();
        let mut shape = match self.limit {
            Some(limit) => format!("select {table}.* from {table} limit {limit}"),
            None => format!("select {table}.* from {table}"),
        };
        for row in self.visible() {
            shape.push('\n');
            shape.push_str(&row.cache_key());
        }

        format!("{table}/query-{}", short_digest(&shape))
    }

    fn cache_version(&self) -> Option<String> {
        let rows = self.visible();
        let mut state = String::new();
        for row in rows {
            state.push_str(&row.cache_key());
            state.push('=');
            state.push_str(row.version.as_deref().unwrap_or_default());
            state.push('\n');
        }

        Some(format!("{}-{}", rows.len(), short_digest(&state)))
    }
}

fn short_digest(text: &str) -> String {
    let mut digest = hex_digest(text.as_bytes());
    digest.truncate(32);

    digest
}
