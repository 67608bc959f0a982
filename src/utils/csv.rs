use crate::model::attendance::AttendanceRecord;

const HEADERS: [&str; 7] = ["Staff ID", "Name", "Role", "Date", "Time", "Latitude", "Longitude"];

/// Attendance export; only the name column is quoted.
pub fn attendance_csv(records: &[AttendanceRecord]) -> String {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(HEADERS.join(","));

    for rec in records {
        let (latitude, longitude) = match rec.location {
            Some(l) => (l.latitude.to_string(), l.longitude.to_string()),
            None => ("N/A".to_string(), "N/A".to_string()),
        };
        rows.push(
            [
                rec.staff_id.clone(),
                format!("\"{}\"", rec.staff_name.replace('"', "\"\"")),
                rec.staff_role.to_string(),
                rec.date.format("%Y-%m-%d").to_string(),
                rec.time.format("%H:%M:%S").to_string(),
                latitude,
                longitude,
            ]
            .join(","),
        );
    }

    rows.join("\n")
}
