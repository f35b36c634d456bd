//! Connections section: access control and the personal datasets stored
//! behind each connection

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::DatasetLookup;
use crate::core::Result;
use crate::core::constants::platform;
use crate::platform::PlatformApi;
use crate::platform::models::AccessPolicy;
use crate::reporting::html::{Cell, Column, Table};

static JDBC_HOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(platform::JDBC_HOST_PATTERN).expect("Failed to compile JDBC host pattern")
});

pub const COLUMNS: &[Column] = &[
    Column::leaf("Connection"),
    Column::leaf("Type"),
    Column::leaf("Host"),
    Column::group("DSS Groups", &["Read", "Usage"]),
    Column::leaf("Datasets with personal data"),
];

fn param_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Host shown for a connection: `host:port`, the authority of a JDBC URL,
/// or nothing
pub fn connection_host(params: &Map<String, Value>) -> String {
    if let Some(host) = params.get(platform::PARAM_HOST) {
        let port = params
            .get(platform::PARAM_PORT)
            .map(param_text)
            .unwrap_or_default();
        return format!("{}:{port}", param_text(host));
    }
    if let Some(jdbc_url) = params.get(platform::PARAM_JDBC_URL) {
        return jdbc_host(&param_text(jdbc_url));
    }
    String::new()
}

/// Authority part of a JDBC URL, empty when the URL has no `://.../` shape
pub fn jdbc_host(jdbc_url: &str) -> String {
    JDBC_HOST
        .captures(jdbc_url)
        .and_then(|captures| captures.get(1))
        .map(|authority| authority.as_str().to_string())
        .unwrap_or_default()
}

/// Cell for a read or usage policy
pub fn policy_cell(policy: &AccessPolicy) -> Cell {
    match policy {
        AccessPolicy::Nobody => Cell::text("NONE"),
        AccessPolicy::Everyone => Cell::text("ALL"),
        AccessPolicy::Groups(groups) => Cell::lines(groups.clone()),
        AccessPolicy::Unknown(_) => Cell::empty(),
    }
}

/// `"<project>.<dataset> (<classification>)"` for every dataset that may
/// hold personal data, grouped by connection name
pub async fn personal_datasets_by_connection(
    project_keys: &[String],
    lookup: &mut DatasetLookup<'_>,
) -> Result<FxHashMap<String, Vec<String>>> {
    let mut by_connection: FxHashMap<String, Vec<String>> = FxHashMap::default();

    for project_key in project_keys {
        for dataset_name in lookup.dataset_names(project_key).await? {
            let definition = lookup.definition(project_key, &dataset_name).await?;
            let classification = definition.classification();
            if !classification.may_contain_personal_data() {
                continue;
            }
            by_connection
                .entry(definition.connection().to_string())
                .or_default()
                .push(format!("{project_key}.{dataset_name} ({classification})"));
        }
    }

    Ok(by_connection)
}

/// Build the connections table, one row per connection in platform order
pub async fn build(
    api: &dyn PlatformApi,
    project_keys: &[String],
    lookup: &mut DatasetLookup<'_>,
) -> Result<Table> {
    let mut by_connection = personal_datasets_by_connection(project_keys, lookup).await?;
    let connections = api.list_connections().await?;
    log::debug!("Found {} connection(s)", connections.len());

    let mut table = Table::new(COLUMNS);
    for (name, connection) in &connections {
        let datasets = by_connection.remove(name).unwrap_or_default();
        table.row(&[
            Cell::text(name.as_str()),
            Cell::text(connection.connection_type.as_str()),
            Cell::text(connection_host(&connection.params)),
            policy_cell(&connection.read_policy()),
            policy_cell(&connection.usage_policy()),
            Cell::lines(datasets),
        ]);
    }
    Ok(table)
}
