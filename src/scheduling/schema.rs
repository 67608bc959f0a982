use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::timetable::{ClassSchedule, LUNCH_SLOT, SlotAssignment, TIME_SLOTS, Timetable};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("timetable must be a JSON object keyed by class")]
    NotAnObject,
    #[error("class '{0}' is missing")]
    MissingClass(String),
    #[error("class '{0}' was not requested")]
    UnexpectedClass(String),
    #[error("schedule for '{0}' must be an object keyed by time slot")]
    ClassNotAnObject(String),
    #[error("'{class}' is missing slot '{slot}'")]
    MissingSlot { class: String, slot: String },
    #[error("'{class}' has unknown slot '{slot}'")]
    UnexpectedSlot { class: String, slot: String },
    #[error("'{class}' at '{slot}' needs string fields 'teacher' and 'subject'")]
    MalformedAssignment { class: String, slot: String },
    #[error("'{0}' must have the lunch marker in the lunch slot")]
    LunchNotReserved(String),
}

fn string_field(entry: &Map<String, Value>, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(str::to_string)
}

fn parse_class(class: &str, value: &Value) -> Result<ClassSchedule, SchemaError> {
    let slots = value
        .as_object()
        .ok_or_else(|| SchemaError::ClassNotAnObject(class.to_string()))?;

    if let Some(unknown) = slots.keys().find(|k| !TIME_SLOTS.contains(&k.as_str())) {
        return Err(SchemaError::UnexpectedSlot {
            class: class.to_string(),
            slot: unknown.clone(),
        });
    }

    let mut schedule = ClassSchedule::new();
    for slot in TIME_SLOTS {
        let malformed = || SchemaError::MalformedAssignment {
            class: class.to_string(),
            slot: slot.to_string(),
        };
        let entry = slots.get(slot).ok_or_else(|| SchemaError::MissingSlot {
            class: class.to_string(),
            slot: slot.to_string(),
        })?;
        let entry = entry.as_object().ok_or_else(malformed)?;
        let assignment = SlotAssignment {
            teacher: string_field(entry, "teacher").ok_or_else(malformed)?,
            subject: string_field(entry, "subject").ok_or_else(malformed)?,
        };

        if slot == LUNCH_SLOT && !assignment.is_lunch() {
            return Err(SchemaError::LunchNotReserved(class.to_string()));
        }
        schedule.insert(slot.to_string(), assignment);
    }

    Ok(schedule)
}

/// Accepts a candidate only if it covers exactly `classes`, each with exactly the eleven
/// fixed slots, typed `{teacher, subject}` entries, and the lunch marker at lunch.
pub fn validate_timetable(value: &Value, classes: &[String]) -> Result<Timetable, SchemaError> {
    let object = value.as_object().ok_or(SchemaError::NotAnObject)?;

    if let Some(extra) = object.keys().find(|k| !classes.contains(k)) {
        return Err(SchemaError::UnexpectedClass(extra.clone()));
    }

    let mut timetable = BTreeMap::new();
    for class in classes {
        let schedule = object
            .get(class)
            .ok_or_else(|| SchemaError::MissingClass(class.clone()))?;
        timetable.insert(class.clone(), parse_class(class, schedule)?);
    }

    Ok(Timetable(timetable))
}
