//! Local timetable generation.
//!
//! Each (class, slot) pair is a variable whose domain is the present teachers. Classes in one
//! slot compete for teachers and a teacher can fill one class per slot, so every slot is a
//! bipartite matching problem: augmenting-path search first places teachers in classes they
//! are qualified for, then any teacher left unbooked covers a remaining class as a study hall.
//! On days with fewer teachers than classes the least-loaded teacher takes the extra study
//! halls as well; those double bookings come back in the rule report for the vice-principal.
//! Slots only share the load counters used to order candidates, which spreads periods evenly.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{GenerationError, PresentTeacher, TimetableGenerator, TimetableRequest};
use crate::model::{
    school_class::SchoolClass,
    timetable::{ClassSchedule, LUNCH_SLOT, SHORT_SLOT, SlotAssignment, TIME_SLOTS, Timetable, is_remedial},
};

pub const STUDY_HALL: &str = "Study Hall";
const CORE_SUBJECTS: [&str; 3] = ["math", "science", "english"];

fn is_core_subject(subject: &str) -> bool {
    let subject = subject.to_lowercase();
    CORE_SUBJECTS.iter().any(|core| subject.contains(core))
}

fn same_class(a: &str, b: &str) -> bool {
    match (SchoolClass::parse(a), SchoolClass::parse(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}

fn is_senior(class: &str) -> bool {
    SchoolClass::parse(class).is_some_and(SchoolClass::is_senior)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConstraintSolver;

impl ConstraintSolver {
    pub fn new() -> Self {
        Self
    }

    pub fn solve(&self, request: &TimetableRequest) -> Result<Timetable, GenerationError> {
        let teachers = &request.present_teachers;
        let classes = &request.all_classes;

        if teachers.is_empty() {
            return Err(GenerationError::Unsatisfiable {
                class: classes.first().cloned().unwrap_or_default(),
                slot: TIME_SLOTS[0].to_string(),
            });
        }

        let qualified: Vec<Vec<usize>> = classes
            .iter()
            .map(|class| {
                teachers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.classes.iter().any(|c| same_class(c, class)))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        let mut load = vec![0usize; teachers.len()];
        let mut timetable: BTreeMap<String, ClassSchedule> = classes
            .iter()
            .map(|c| (c.clone(), ClassSchedule::new()))
            .collect();

        for slot in TIME_SLOTS {
            if slot == LUNCH_SLOT {
                for schedule in timetable.values_mut() {
                    schedule.insert(slot.to_string(), SlotAssignment::lunch());
                }
                continue;
            }

            let candidates = order_candidates(&qualified, classes, teachers, &load, slot);
            let assigned = assign_slot(&candidates, &load);

            for (class_idx, (teacher_idx, qualified_match)) in assigned.into_iter().enumerate() {
                let teacher = &teachers[teacher_idx];
                let subject = if qualified_match {
                    teacher.subject.clone()
                } else {
                    STUDY_HALL.to_string()
                };
                load[teacher_idx] += 1;
                if let Some(schedule) = timetable.get_mut(&classes[class_idx]) {
                    schedule.insert(slot.to_string(), SlotAssignment::new(&teacher.full_name, subject));
                }
            }
        }

        Ok(Timetable(timetable))
    }
}

/// Qualified teachers per class, best first: core subjects for the short period and for
/// senior remedial periods, then lightest load so far.
fn order_candidates(
    qualified: &[Vec<usize>],
    classes: &[String],
    teachers: &[PresentTeacher],
    load: &[usize],
    slot: &str,
) -> Vec<Vec<usize>> {
    qualified
        .iter()
        .zip(classes)
        .map(|(pool, class)| {
            let prefer_core = slot == SHORT_SLOT || (is_remedial(slot) && is_senior(class));
            let mut pool = pool.clone();
            pool.sort_by_key(|&t| (prefer_core && !is_core_subject(&teachers[t].subject), load[t], t));
            pool
        })
        .collect()
}

/// One teacher per class. Returns `(teacher, qualified)` per class; `load` must not be empty.
fn assign_slot(candidates: &[Vec<usize>], load: &[usize]) -> Vec<(usize, bool)> {
    let teacher_count = load.len();
    let mut owner: Vec<Option<usize>> = vec![None; teacher_count];
    for class in 0..candidates.len() {
        let mut visited = vec![false; teacher_count];
        augment(class, candidates, &mut visited, &mut owner);
    }

    let mut busy = vec![false; teacher_count];
    let mut booked = load.to_vec();
    let mut assigned: Vec<Option<(usize, bool)>> = vec![None; candidates.len()];
    for (teacher, class) in owner.iter().enumerate() {
        if let Some(class) = class {
            assigned[*class] = Some((teacher, true));
            busy[teacher] = true;
            booked[teacher] += 1;
        }
    }

    // study halls: free teachers first, then whoever carries the least
    assigned
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                let teacher = (0..teacher_count)
                    .min_by_key(|&t| (busy[t], booked[t], t))
                    .unwrap_or_default();
                busy[teacher] = true;
                booked[teacher] += 1;
                (teacher, false)
            })
        })
        .collect()
}

fn augment(
    class: usize,
    candidates: &[Vec<usize>],
    visited: &mut [bool],
    owner: &mut [Option<usize>],
) -> bool {
    for &teacher in &candidates[class] {
        if visited[teacher] {
            continue;
        }
        visited[teacher] = true;

        let available = match owner[teacher] {
            None => true,
            Some(other) => augment(other, candidates, visited, owner),
        };
        if available {
            owner[teacher] = Some(class);
            return true;
        }
    }
    false
}

#[async_trait]
impl TimetableGenerator for ConstraintSolver {
    async fn generate(&self, request: &TimetableRequest) -> Result<serde_json::Value, GenerationError> {
        let timetable = self.solve(request)?;
        serde_json::to_value(&timetable).map_err(|e| GenerationError::MalformedReply(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "solver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::rules::{RuleViolation, check_rules};
    use crate::scheduling::schema::validate_timetable;

    fn teacher(name: &str, subject: &str, classes: &[&str]) -> PresentTeacher {
        PresentTeacher {
            id: format!("TEACH-{name}"),
            full_name: name.into(),
            subject: subject.into(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn request(teachers: Vec<PresentTeacher>, classes: &[&str]) -> TimetableRequest {
        TimetableRequest {
            present_teachers: teachers,
            all_classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn teaching_slots() -> impl Iterator<Item = &'static str> {
        TIME_SLOTS.into_iter().filter(|s| *s != LUNCH_SLOT)
    }

    #[actix_web::test]
    async fn output_passes_schema_and_rules() {
        let req = request(
            vec![
                teacher("Asha Rao", "Science", &["Class 9"]),
                teacher("Vik Das", "Maths", &["Class 10"]),
            ],
            &["Class 9", "Class 10"],
        );

        let value = ConstraintSolver::new().generate(&req).await.unwrap();
        let tt = validate_timetable(&value, &req.all_classes).unwrap();
        assert!(check_rules(&tt, &req.present_teachers).is_empty());
        assert_eq!(tt.get("Class 9", "08:40 AM - 09:20 AM"), Some(&SlotAssignment::new("Asha Rao", "Science")));
    }

    #[test]
    fn augmenting_path_keeps_everyone_qualified() {
        // Asha is lighter-loaded first but only she can take Class 10
        let req = request(
            vec![
                teacher("Asha Rao", "Science", &["Class 9", "Class 10"]),
                teacher("Vik Das", "Maths", &["Class 9"]),
            ],
            &["Class 9", "Class 10"],
        );

        let tt = ConstraintSolver::new().solve(&req).unwrap();
        for slot in teaching_slots() {
            assert_eq!(tt.get("Class 10", slot).unwrap().teacher, "Asha Rao");
            assert_eq!(tt.get("Class 9", slot).unwrap().teacher, "Vik Das");
        }
    }

    #[test]
    fn spare_teacher_covers_as_study_hall() {
        let req = request(
            vec![
                teacher("Asha Rao", "Science", &["Class 9", "Class 10"]),
                teacher("Lata Roy", "English", &["Class 1"]),
            ],
            &["Class 9", "Class 10"],
        );

        let tt = ConstraintSolver::new().solve(&req).unwrap();
        assert!(check_rules(&tt, &req.present_teachers).is_empty());
        for slot in teaching_slots() {
            let covered: Vec<_> = ["Class 9", "Class 10"]
                .iter()
                .map(|c| tt.get(c, slot).unwrap())
                .collect();
            assert!(covered.iter().any(|a| a.teacher == "Lata Roy" && a.subject == STUDY_HALL));
            assert!(covered.iter().any(|a| a.teacher == "Asha Rao" && a.subject == "Science"));
        }
    }

    #[test]
    fn too_few_teachers_double_book_as_study_halls() {
        let req = request(
            vec![teacher("Asha Rao", "Science", &["Class 9"])],
            &["Class 9", "Class 10"],
        );

        let tt = ConstraintSolver::new().solve(&req).unwrap();
        for slot in teaching_slots() {
            assert_eq!(tt.get("Class 9", slot), Some(&SlotAssignment::new("Asha Rao", "Science")));
            assert_eq!(tt.get("Class 10", slot), Some(&SlotAssignment::new("Asha Rao", STUDY_HALL)));
        }

        let violations = check_rules(&tt, &req.present_teachers);
        assert_eq!(violations.len(), 10);
        assert!(violations.iter().all(|v| matches!(v, RuleViolation::DoubleBooked { .. })));
    }

    #[test]
    fn extra_study_halls_go_to_the_least_loaded() {
        let req = request(
            vec![
                teacher("Asha Rao", "Science", &["Class 9"]),
                teacher("Vik Das", "Maths", &["Class 10"]),
            ],
            &["Class 9", "Class 10", "Class 11", "Class 12"],
        );

        let tt = ConstraintSolver::new().solve(&req).unwrap();
        let asha = tt.personal_schedule("Asha Rao").len();
        let vik = tt.personal_schedule("Vik Das").len();
        assert_eq!(asha + vik, 40);
        assert_eq!(asha, 20);
    }

    #[test]
    fn nobody_present_is_unsatisfiable() {
        match ConstraintSolver::new().solve(&request(vec![], &["Class 9"])) {
            Err(GenerationError::Unsatisfiable { class, slot }) => {
                assert_eq!(class, "Class 9");
                assert_eq!(slot, "08:40 AM - 09:20 AM");
            }
            other => panic!("expected unsatisfiable, got {other:?}"),
        }
    }

    #[test]
    fn short_period_prefers_core_subjects() {
        let req = request(
            vec![
                teacher("Nila Art", "Art", &["Class 3"]),
                teacher("Lata Roy", "English", &["Class 3"]),
            ],
            &["Class 3"],
        );

        let tt = ConstraintSolver::new().solve(&req).unwrap();
        assert_eq!(tt.get("Class 3", SHORT_SLOT).unwrap().teacher, "Lata Roy");
    }

    #[test]
    fn remedial_slots_prefer_core_subjects_for_seniors() {
        let req = request(
            vec![
                teacher("Nila Art", "Art", &["Class 10"]),
                teacher("Vik Das", "Maths", &["Class 10"]),
            ],
            &["Class 10"],
        );

        let tt = ConstraintSolver::new().solve(&req).unwrap();
        for slot in ["02:20 PM - 03:00 PM", "03:00 PM - 03:40 PM"] {
            assert_eq!(tt.get("Class 10", slot).unwrap().teacher, "Vik Das");
        }
    }

    #[test]
    fn load_is_spread_across_the_day() {
        let req = request(
            vec![
                teacher("Asha Rao", "Science", &["Class 1"]),
                teacher("Vik Das", "Maths", &["1"]),
            ],
            &["Class 1"],
        );

        let tt = ConstraintSolver::new().solve(&req).unwrap();
        let asha = tt.personal_schedule("Asha Rao").len();
        let vik = tt.personal_schedule("Vik Das").len();
        assert_eq!(asha + vik, 10);
        assert_eq!(asha, 5);
    }
}
