use serde_json::{Map, Value};

/// A stored record: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Field every stored document carries as its identity.
pub const ID_FIELD: &str = "_id";

/// Field message documents are ordered by when no sort is given.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Field that ties a message to its group.
pub const GROUP_ID_FIELD: &str = "groupId";

