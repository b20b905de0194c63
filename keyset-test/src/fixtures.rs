//! Sample entity modules: records, their sort registries and seed data.

use keyset_data::{path_depth, CursorPaginatable, Entity, FieldDescriptor, SortRegistry};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Group {
    pub id: String,
    pub full_path: String,
    pub created_at: String,
}

impl Group {
    pub fn new(id: &str, full_path: &str, created_at: &str) -> Self {
        Self {
            id: id.to_string(),
            full_path: full_path.to_string(),
            created_at: created_at.to_string(),
        }
    }

    /// Number of path segments.
    pub fn depth(&self) -> usize {
        self.full_path.split('/').count()
    }
}

impl CursorPaginatable for Group {
    fn cursor_value(&self, field: &str) -> Option<String> {
        match field {
            "id" => Some(self.id.clone()),
            "full_path" => Some(self.full_path.clone()),
            "created_at" => Some(self.created_at.clone()),
            "group_level" => Some(self.depth().to_string()),
            _ => None,
        }
    }
}

impl Entity for Group {
    fn table_name() -> &'static str {
        "groups"
    }

    fn id_column() -> &'static str {
        "id"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "full_path", "created_at"]
    }

    fn sorts() -> SortRegistry {
        SortRegistry::new()
            .field("FULL_PATH", FieldDescriptor::new("full_path", "groups", "full_path"))
            .field("CREATED_AT", FieldDescriptor::new("created_at", "groups", "created_at"))
            .field_with_transform(
                "GROUP_LEVEL",
                FieldDescriptor::new("group_level", "groups", "full_path"),
                path_depth,
            )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Run {
    pub id: String,
    pub group_id: String,
    pub status: String,
    pub created_at: String,
}

impl CursorPaginatable for Run {
    fn cursor_value(&self, field: &str) -> Option<String> {
        match field {
            "id" => Some(self.id.clone()),
            "status" => Some(self.status.clone()),
            "created_at" => Some(self.created_at.clone()),
            _ => None,
        }
    }
}

impl Entity for Run {
    fn table_name() -> &'static str {
        "runs"
    }

    fn id_column() -> &'static str {
        "id"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "group_id", "status", "created_at"]
    }

    fn sorts() -> SortRegistry {
        SortRegistry::new()
            .field("STATUS", FieldDescriptor::new("status", "runs", "status"))
            .field("CREATED_AT", FieldDescriptor::new("created_at", "runs", "created_at"))
    }
}

/// Ten groups `g01..g10`, created one second apart in id order.
///
/// Paths mix depths 1 to 3 so hierarchy ordering has ties.
pub fn ten_groups() -> Vec<Group> {
    let paths = [
        "eng",
        "eng/platform",
        "ops",
        "eng/platform/db",
        "sales",
        "ops/oncall",
        "eng/web",
        "sales/emea/uk",
        "hr",
        "ops/oncall/night",
    ];
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            Group::new(
                &format!("g{:02}", i + 1),
                path,
                &format!("2024-01-01T00:00:{:02}Z", i + 1),
            )
        })
        .collect()
}

/// `count` runs with random identifiers, all created at the same instant and
/// split over two statuses, so every sort key is heavily duplicated.
pub fn tied_runs(count: usize) -> Vec<Run> {
    (0..count)
        .map(|i| Run {
            id: uuid::Uuid::new_v4().to_string(),
            group_id: "g01".to_string(),
            status: if i % 3 == 0 { "failed" } else { "finished" }.to_string(),
            created_at: "2024-06-01T12:00:00Z".to_string(),
        })
        .collect()
}
