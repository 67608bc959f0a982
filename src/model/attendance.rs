use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::staff::StaffRole;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    #[schema(example = 12.9716)]
    pub latitude: f64,
    #[schema(example = 77.5946)]
    pub longitude: f64,
}

impl Location {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// One staff member's check-in for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "TEACH-482913-1781234567890",
        "staffId": "TEACH-482913",
        "staffName": "Asha Rao",
        "staffRole": "teaching",
        "date": "2026-10-19",
        "time": "08:21:07",
        "location": { "latitude": 12.9716, "longitude": 77.5946 },
        "selfieUrl": "data:image/jpeg;base64,/9j/4AAQ..."
    })
)]
pub struct AttendanceRecord {
    pub id: String,
    pub staff_id: String,
    pub staff_name: String,
    pub staff_role: StaffRole,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "08:21:07")]
    pub time: NaiveTime,
    #[schema(nullable = true)]
    pub location: Option<Location>,
    pub selfie_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_bounds() {
        assert!(Location { latitude: 12.97, longitude: 77.59 }.is_valid());
        assert!(!Location { latitude: 91.0, longitude: 0.0 }.is_valid());
        assert!(!Location { latitude: 0.0, longitude: -180.5 }.is_valid());
    }

    #[test]
    fn serializes_time_without_fraction() {
        let record = AttendanceRecord {
            id: "PEON-000001-1".into(),
            staff_id: "PEON-000001".into(),
            staff_name: "Ravi".into(),
            staff_role: StaffRole::Peon,
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            time: NaiveTime::from_hms_opt(8, 21, 7).unwrap(),
            location: None,
            selfie_url: "data:image/jpeg;base64,AA".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2026-10-19");
        assert_eq!(json["time"], "08:21:07");
        assert!(json["location"].is_null());
        assert_eq!(json["staffRole"], "peon");
    }
}
