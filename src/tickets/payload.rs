use serde_json::{Map, Value};

use crate::domain::mapping::{FieldMapping, LogicalField};
use crate::domain::message::Message;
use crate::tickets::number::{TicketClock, ticket_number};

/// The `fields` object for one ticket.
///
/// With a mapping, only mapped fields are written, under their mapped column.
/// Without one (or with an empty one), the fixed default columns are used.
/// Values the message does not carry (no subject, no sender) are left out.
pub fn build_fields(
    message: &Message,
    mapping: Option<&FieldMapping>,
    clock: TicketClock,
) -> Map<String, Value> {
    let mapping = mapping.filter(|m| !m.is_empty());
    let mut fields = Map::new();

    for field in LogicalField::ALL {
        let column = match mapping {
            Some(m) => match m.get(field) {
                Some(column) => column,
                None => continue,
            },
            None => field.default_column(),
        };
        let value = match field {
            LogicalField::Subject => message.subject.clone(),
            LogicalField::Description => Some(message.body_preview.clone()),
            LogicalField::User => message.sender_address().map(str::to_string),
            LogicalField::TicketNumber => Some(ticket_number(
                message.received_date_time.as_deref(),
                clock,
            )),
        };
        if let Some(value) = value {
            fields.insert(column.to_string(), Value::String(value));
        }
    }

    fields
}
