use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::sharepoint::Column;
use crate::error::MappingError;

/// The four values a ticket can carry over from an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalField {
    Subject,
    Description,
    User,
    TicketNumber,
}

impl LogicalField {
    pub const ALL: [LogicalField; 4] = [
        LogicalField::Subject,
        LogicalField::Description,
        LogicalField::User,
        LogicalField::TicketNumber,
    ];

    /// Column written to when no mapping was supplied at all.
    pub fn default_column(self) -> &'static str {
        match self {
            LogicalField::Subject => "subject",
            LogicalField::Description => "description",
            LogicalField::User => "user",
            LogicalField::TicketNumber => "ticketnumber",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_column())
    }
}

impl FromStr for LogicalField {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subject" => Ok(LogicalField::Subject),
            "description" => Ok(LogicalField::Description),
            "user" => Ok(LogicalField::User),
            "ticketnumber" | "ticket_number" | "ticket" => Ok(LogicalField::TicketNumber),
            other => Err(MappingError::UnknownField(other.to_string())),
        }
    }
}

/// Logical field -> destination column name. Unset fields are never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    entries: BTreeMap<LogicalField, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: LogicalField) -> Option<&str> {
        self.entries
            .get(&field)
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(String::is_empty)
    }

    /// Map `field` to `column`, which must be one of `available`.
    pub fn assign(
        &mut self,
        field: LogicalField,
        column: &str,
        available: &[Column],
    ) -> Result<(), MappingError> {
        if !available.iter().any(|c| c.name == column) {
            return Err(MappingError::UnknownColumn(column.to_string()));
        }
        self.entries.insert(field, column.to_string());
        Ok(())
    }

    pub fn unassign(&mut self, field: LogicalField) {
        self.entries.remove(&field);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Step through `unset, available[0], available[1], ...` for `field`,
    /// wrapping at both ends.
    pub fn cycle(&mut self, field: LogicalField, available: &[Column], step: i32) {
        if available.is_empty() {
            self.unassign(field);
            return;
        }
        // slot 0 is "unset"
        let slots = available.len() as i32 + 1;
        let current = self
            .get(field)
            .and_then(|name| available.iter().position(|c| c.name == name))
            .map(|i| i as i32 + 1)
            .unwrap_or(0);
        let next = (current + step).rem_euclid(slots);
        if next == 0 {
            self.unassign(field);
        } else {
            self.entries
                .insert(field, available[(next - 1) as usize].name.clone());
        }
    }

    /// Parse a `field=column` pair as given on the command line.
    pub fn parse_pair(pair: &str) -> Result<(LogicalField, String), MappingError> {
        let (field, column) = pair
            .split_once('=')
            .ok_or_else(|| MappingError::Malformed(pair.to_string()))?;
        let column = column.trim();
        if column.is_empty() {
            return Err(MappingError::Malformed(pair.to_string()));
        }
        Ok((field.parse()?, column.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str) -> Column {
        Column {
            id: name.to_lowercase(),
            name: name.to_string(),
            display_name: None,
            hidden: false,
            read_only: false,
        }
    }

    #[test]
    fn assign_rejects_columns_outside_the_list() {
        let cols = vec![col("Title"), col("Body")];
        let mut m = FieldMapping::new();
        m.assign(LogicalField::Subject, "Title", &cols).unwrap();
        assert_eq!(
            m.assign(LogicalField::User, "Reporter", &cols),
            Err(MappingError::UnknownColumn("Reporter".into()))
        );
        assert_eq!(m.get(LogicalField::Subject), Some("Title"));
        assert_eq!(m.get(LogicalField::User), None);
    }

    #[test]
    fn cycle_walks_through_unset_and_wraps() {
        let cols = vec![col("Title"), col("Body")];
        let mut m = FieldMapping::new();

        m.cycle(LogicalField::Description, &cols, 1);
        assert_eq!(m.get(LogicalField::Description), Some("Title"));
        m.cycle(LogicalField::Description, &cols, 1);
        assert_eq!(m.get(LogicalField::Description), Some("Body"));
        m.cycle(LogicalField::Description, &cols, 1);
        assert_eq!(m.get(LogicalField::Description), None);
        m.cycle(LogicalField::Description, &cols, -1);
        assert_eq!(m.get(LogicalField::Description), Some("Body"));
        assert!(!m.is_empty());
    }

    #[test]
    fn parses_cli_pairs() {
        assert_eq!(
            FieldMapping::parse_pair("subject=Title").unwrap(),
            (LogicalField::Subject, "Title".to_string())
        );
        assert_eq!(
            FieldMapping::parse_pair("TicketNumber = Ticket_x0020_No").unwrap(),
            (LogicalField::TicketNumber, "Ticket_x0020_No".to_string())
        );
        assert!(matches!(
            FieldMapping::parse_pair("subject"),
            Err(MappingError::Malformed(_))
        ));
        assert!(matches!(
            FieldMapping::parse_pair("owner=Title"),
            Err(MappingError::UnknownField(_))
        ));
    }
}
