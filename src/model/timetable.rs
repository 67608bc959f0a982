use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use utoipa::ToSchema;

/// The eleven daily slots, in order.
pub const TIME_SLOTS: [&str; 11] = [
    "08:40 AM - 09:20 AM",
    "09:20 AM - 10:00 AM",
    "10:00 AM - 10:40 AM",
    "10:40 AM - 11:20 AM",
    "11:20 AM - 12:00 PM",
    "12:00 PM - 12:40 PM",
    "12:40 PM - 01:20 PM",
    "01:20 PM - 02:00 PM",
    "02:00 PM - 02:20 PM",
    "02:20 PM - 03:00 PM",
    "03:00 PM - 03:40 PM",
];

pub const LUNCH_SLOT: &str = "12:40 PM - 01:20 PM";
pub const SHORT_SLOT: &str = "02:00 PM - 02:20 PM";
pub const REMEDIAL_SLOTS: [&str; 2] = ["02:20 PM - 03:00 PM", "03:00 PM - 03:40 PM"];
pub const LUNCH_MARKER: &str = "LUNCH";

pub fn slot_index(slot: &str) -> Option<usize> {
    TIME_SLOTS.iter().position(|s| *s == slot)
}

pub fn is_remedial(slot: &str) -> bool {
    REMEDIAL_SLOTS.contains(&slot)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SlotAssignment {
    #[schema(example = "Asha Rao")]
    pub teacher: String,
    #[schema(example = "Science")]
    pub subject: String,
}

impl SlotAssignment {
    pub fn new(teacher: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            teacher: teacher.into(),
            subject: subject.into(),
        }
    }

    pub fn lunch() -> Self {
        Self::new(LUNCH_MARKER, LUNCH_MARKER)
    }

    pub fn is_lunch(&self) -> bool {
        self.teacher == LUNCH_MARKER && self.subject == LUNCH_MARKER
    }
}

/// Slot label -> assignment for one class.
pub type ClassSchedule = BTreeMap<String, SlotAssignment>;

/// Class label -> that class's full-day schedule.
///
/// Serializes each class's slots in time-of-day order; slots outside the daily layout follow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Timetable(pub BTreeMap<String, ClassSchedule>);

struct InSlotOrder<'a>(&'a ClassSchedule);

impl Serialize for InSlotOrder<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut slots: Vec<_> = self.0.iter().collect();
        slots.sort_by_key(|(slot, _)| slot_index(slot).unwrap_or(TIME_SLOTS.len()));

        let mut map = serializer.serialize_map(Some(slots.len()))?;
        for (slot, assignment) in slots {
            map.serialize_entry(slot, assignment)?;
        }
        map.end()
    }
}

impl Serialize for Timetable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (class, schedule) in &self.0 {
            map.serialize_entry(class, &InSlotOrder(schedule))?;
        }
        map.end()
    }
}

impl Timetable {
    pub fn classes(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn get(&self, class: &str, slot: &str) -> Option<&SlotAssignment> {
        self.0.get(class).and_then(|schedule| schedule.get(slot))
    }

    /// Every slot taught by `teacher`, ordered by time of day then class.
    pub fn personal_schedule(&self, teacher: &str) -> Vec<PersonalEntry> {
        let mut entries: Vec<PersonalEntry> = self
            .0
            .iter()
            .flat_map(|(class, schedule)| {
                schedule
                    .iter()
                    .filter(|(_, a)| !a.is_lunch() && a.teacher == teacher)
                    .map(move |(slot, a)| PersonalEntry {
                        slot: slot.clone(),
                        class: class.clone(),
                        subject: a.subject.clone(),
                    })
            })
            .collect();

        entries.sort_by(|a, b| {
            slot_index(&a.slot)
                .cmp(&slot_index(&b.slot))
                .then_with(|| a.class.cmp(&b.class))
        });
        entries
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PersonalEntry {
    #[schema(example = "08:40 AM - 09:20 AM")]
    pub slot: String,
    #[schema(example = "Class 9")]
    pub class: String,
    #[schema(example = "Science")]
    pub subject: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(pairs: &[(&str, &str, &str)]) -> ClassSchedule {
        pairs
            .iter()
            .map(|(slot, teacher, subject)| (slot.to_string(), SlotAssignment::new(*teacher, *subject)))
            .collect()
    }

    #[test]
    fn slot_layout() {
        assert_eq!(slot_index(LUNCH_SLOT), Some(6));
        assert_eq!(slot_index(SHORT_SLOT), Some(8));
        assert!(is_remedial("03:00 PM - 03:40 PM"));
        assert!(!is_remedial(LUNCH_SLOT));
        assert!(SlotAssignment::lunch().is_lunch());
    }

    #[test]
    fn personal_schedule_is_filtered_and_ordered() {
        let mut tt = Timetable::default();
        tt.0.insert(
            "Class 9".into(),
            schedule(&[
                ("01:20 PM - 02:00 PM", "Asha Rao", "Science"),
                ("08:40 AM - 09:20 AM", "Asha Rao", "Science"),
                ("09:20 AM - 10:00 AM", "Vik Das", "Maths"),
                (LUNCH_SLOT, LUNCH_MARKER, LUNCH_MARKER),
            ]),
        );
        tt.0.insert(
            "Class 10".into(),
            schedule(&[("09:20 AM - 10:00 AM", "Asha Rao", "Physics")]),
        );

        let mine = tt.personal_schedule("Asha Rao");
        let slots: Vec<_> = mine.iter().map(|e| (e.slot.as_str(), e.class.as_str())).collect();
        assert_eq!(
            slots,
            vec![
                ("08:40 AM - 09:20 AM", "Class 9"),
                ("09:20 AM - 10:00 AM", "Class 10"),
                ("01:20 PM - 02:00 PM", "Class 9"),
            ]
        );
        assert!(tt.personal_schedule("Nobody").is_empty());
    }

    #[test]
    fn serializes_slots_in_time_of_day_order() {
        let mut tt = Timetable::default();
        tt.0.insert(
            "Class 9".into(),
            schedule(&[
                ("01:20 PM - 02:00 PM", "Asha Rao", "Science"),
                ("Extra", "Vik Das", "Maths"),
                ("08:40 AM - 09:20 AM", "Asha Rao", "Science"),
                ("10:00 AM - 10:40 AM", "Vik Das", "Maths"),
            ]),
        );

        let json = serde_json::to_string(&tt).unwrap();
        let morning = json.find("08:40 AM").unwrap();
        let mid = json.find("10:00 AM").unwrap();
        let afternoon = json.find("01:20 PM").unwrap();
        let extra = json.find("Extra").unwrap();
        assert!(morning < mid && mid < afternoon && afternoon < extra);

        let back: Timetable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tt);
    }
}
