use std::collections::HashSet;

use chrono::NaiveDate;

use super::{PresentTeacher, TimetableRequest};
use crate::model::{
    attendance::AttendanceRecord,
    school_class::SchoolClass,
    staff::{Staff, StaffRole},
};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("No teaching staff have marked attendance yet.")]
    NoPresentTeachers,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Joins the day's teaching check-ins against the directory.
///
/// Teachers whose directory entry is gone, or lacks a subject or classes, are left out.
pub fn build_request(
    attendance: &[AttendanceRecord],
    staff: &[Staff],
    date: NaiveDate,
) -> Result<TimetableRequest, BuildError> {
    let mut seen = HashSet::new();

    let present_teachers: Vec<PresentTeacher> = attendance
        .iter()
        .filter(|a| a.date == date && a.staff_role == StaffRole::Teaching)
        .filter(|a| seen.insert(a.staff_id.clone()))
        .filter_map(|a| {
            let details = staff.iter().find(|s| s.id == a.staff_id)?;
            let full_name = non_blank(Some(&details.full_name))?;
            let subject = non_blank(details.post.as_ref())?;
            let classes = details
                .teaching_classes
                .clone()
                .filter(|classes| !classes.is_empty())?;

            Some(PresentTeacher {
                id: details.id.clone(),
                full_name,
                subject,
                classes,
            })
        })
        .collect();

    if present_teachers.is_empty() {
        return Err(BuildError::NoPresentTeachers);
    }

    Ok(TimetableRequest {
        present_teachers,
        all_classes: SchoolClass::all_labels(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn teacher(id: &str, name: &str, post: Option<&str>, classes: Option<Vec<&str>>) -> Staff {
        Staff {
            id: id.into(),
            full_name: name.into(),
            email: format!("{id}@school.edu"),
            role: StaffRole::Teaching,
            registration_date: Utc::now(),
            education_qualification: Some("B.Ed.".into()),
            post: post.map(str::to_string),
            teaching_classes: classes.map(|c| c.into_iter().map(str::to_string).collect()),
        }
    }

    fn checkin(staff: &Staff, date: NaiveDate) -> AttendanceRecord {
        AttendanceRecord {
            id: format!("{}-1", staff.id),
            staff_id: staff.id.clone(),
            staff_name: staff.full_name.clone(),
            staff_role: staff.role,
            date,
            time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            location: None,
            selfie_url: "data:image/jpeg;base64,AA".into(),
        }
    }

    #[test]
    fn joins_present_teachers() {
        let asha = teacher("TEACH-000001", "Asha Rao", Some("Science"), Some(vec!["Class 9"]));
        let request = build_request(&[checkin(&asha, day())], &[asha.clone()], day()).unwrap();

        assert_eq!(
            request.present_teachers,
            vec![PresentTeacher {
                id: "TEACH-000001".into(),
                full_name: "Asha Rao".into(),
                subject: "Science".into(),
                classes: vec!["Class 9".into()],
            }]
        );
        assert_eq!(request.all_classes.len(), 14);
    }

    #[test]
    fn drops_incomplete_absent_and_non_teaching_staff() {
        let complete = teacher("TEACH-000001", "Asha Rao", Some("Science"), Some(vec!["Class 9"]));
        let no_subject = teacher("TEACH-000002", "Vik Das", None, Some(vec!["Class 8"]));
        let blank_subject = teacher("TEACH-000003", "Mira Sen", Some("  "), Some(vec!["Class 8"]));
        let no_classes = teacher("TEACH-000004", "Om Iyer", Some("Maths"), Some(vec![]));
        let yesterday_only = teacher("TEACH-000005", "Lata Roy", Some("English"), Some(vec!["Class 2"]));
        let mut peon = teacher("PEON-000006", "Ravi", None, None);
        peon.role = StaffRole::Peon;
        let missing_from_directory = teacher("TEACH-000007", "Ghost", Some("Art"), Some(vec!["Class 1"]));

        let attendance = vec![
            checkin(&complete, day()),
            checkin(&no_subject, day()),
            checkin(&blank_subject, day()),
            checkin(&no_classes, day()),
            checkin(&yesterday_only, day().pred_opt().unwrap()),
            checkin(&peon, day()),
            checkin(&missing_from_directory, day()),
        ];
        let directory = vec![complete, no_subject, blank_subject, no_classes, yesterday_only, peon];

        let request = build_request(&attendance, &directory, day()).unwrap();
        let ids: Vec<_> = request.present_teachers.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["TEACH-000001"]);
    }

    #[test]
    fn duplicate_checkins_count_once() {
        let asha = teacher("TEACH-000001", "Asha Rao", Some("Science"), Some(vec!["Class 9"]));
        let attendance = vec![checkin(&asha, day()), checkin(&asha, day())];
        let request = build_request(&attendance, &[asha], day()).unwrap();
        assert_eq!(request.present_teachers.len(), 1);
    }

    #[test]
    fn fails_without_present_teachers() {
        let no_subject = teacher("TEACH-000002", "Vik Das", None, Some(vec!["Class 8"]));
        assert_eq!(
            build_request(&[checkin(&no_subject, day())], &[no_subject], day()),
            Err(BuildError::NoPresentTeachers)
        );
        assert_eq!(build_request(&[], &[], day()), Err(BuildError::NoPresentTeachers));
    }
}
