use serde::{Deserialize, Serialize};

/// Columns SharePoint exposes on every list that can never take a ticket value.
const EXCLUDED_COLUMNS: [&str; 2] = ["ContentType", "Attachments"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl Site {
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpList {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl SpList {
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A list column (`columnDefinition`). `name` is the internal name used as the
/// key in item `fields` payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub read_only: bool,
}

impl Column {
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_mappable(&self) -> bool {
        !self.hidden
            && !self.read_only
            && !EXCLUDED_COLUMNS
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&self.name))
    }
}

/// Keep only the columns a ticket field may be written to.
pub fn mappable_columns(columns: Vec<Column>) -> Vec<Column> {
    columns.into_iter().filter(Column::is_mappable).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_hidden_read_only_and_system_columns() {
        let cols: Vec<Column> = serde_json::from_value(json!([
            { "id": "1", "name": "Title", "displayName": "Title" },
            { "id": "2", "name": "ContentType", "displayName": "Content Type" },
            { "id": "3", "name": "Attachments" },
            { "id": "4", "name": "Modified", "readOnly": true },
            { "id": "5", "name": "_UIVersion", "hidden": true },
            { "id": "6", "name": "Reporter", "displayName": "Reported by" }
        ]))
        .unwrap();

        let names: Vec<_> = mappable_columns(cols)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Title", "Reporter"]);
    }

    #[test]
    fn labels_fall_back_to_ids() {
        let site: Site = serde_json::from_value(json!({ "id": "contoso,1,2" })).unwrap();
        assert_eq!(site.label(), "contoso,1,2");
        let list: SpList =
            serde_json::from_value(json!({ "id": "l1", "displayName": "Helpdesk" })).unwrap();
        assert_eq!(list.label(), "Helpdesk");
    }
}
