use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;

use super::PresentTeacher;
use crate::model::timetable::{TIME_SLOTS, Timetable};

/// A scheduling rule the candidate breaks. Reported, never enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleViolation {
    EmptyAssignment { class: String, slot: String },
    DoubleBooked { teacher: String, slot: String, classes: Vec<String> },
    NotPresent { teacher: String, class: String, slot: String },
}

/// Checks coverage, double booking and that every named teacher is present today.
pub fn check_rules(timetable: &Timetable, present: &[PresentTeacher]) -> Vec<RuleViolation> {
    let present_names: HashSet<&str> = present.iter().map(|t| t.full_name.as_str()).collect();
    let mut violations = Vec::new();

    for slot in TIME_SLOTS {
        let mut by_teacher: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for class in timetable.classes() {
            let Some(assignment) = timetable.get(class, slot) else {
                continue;
            };
            if assignment.is_lunch() {
                continue;
            }

            let teacher = assignment.teacher.trim();
            if teacher.is_empty() || assignment.subject.trim().is_empty() {
                violations.push(RuleViolation::EmptyAssignment {
                    class: class.clone(),
                    slot: slot.to_string(),
                });
                continue;
            }

            if !present_names.contains(teacher) {
                violations.push(RuleViolation::NotPresent {
                    teacher: teacher.to_string(),
                    class: class.clone(),
                    slot: slot.to_string(),
                });
            }
            by_teacher.entry(teacher).or_default().push(class.clone());
        }

        for (teacher, classes) in by_teacher {
            if classes.len() > 1 {
                violations.push(RuleViolation::DoubleBooked {
                    teacher: teacher.to_string(),
                    slot: slot.to_string(),
                    classes,
                });
            }
        }
    }

    violations
}
