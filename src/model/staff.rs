use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, EnumString, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StaffRole {
    Teaching,
    AdminStaff,
    GroupC,
    Peon,
    HostelWardenMale,
    HostelWardenFemale,
    HostelNurse,
}

impl StaffRole {
    /// First dash-separated segment of the role token, at most five characters, upper-cased.
    pub fn id_prefix(self) -> String {
        let token = self.as_ref();
        token
            .split('-')
            .next()
            .unwrap_or(token)
            .chars()
            .take(5)
            .collect::<String>()
            .to_uppercase()
    }

    pub fn is_teaching(self) -> bool {
        self == StaffRole::Teaching
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": "TEACH-482913",
        "fullName": "Asha Rao",
        "email": "asha.rao@school.edu",
        "role": "teaching",
        "registrationDate": "2026-06-01T08:15:00Z",
        "educationQualification": "M.Sc. B.Ed.",
        "post": "Science",
        "teachingClasses": ["Class 9"]
    })
)]
pub struct Staff {
    #[schema(example = "TEACH-482913")]
    pub id: String,

    #[schema(example = "Asha Rao")]
    pub full_name: String,

    #[schema(example = "asha.rao@school.edu")]
    pub email: String,

    pub role: StaffRole,

    #[schema(example = "2026-06-01T08:15:00Z", value_type = String, format = "date-time")]
    pub registration_date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "M.Sc. B.Ed.", nullable = true)]
    pub education_qualification: Option<String>,

    /// Subject specialty for teaching staff.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Science", nullable = true)]
    pub post: Option<String>,

    /// Class labels the teacher is qualified for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = json!(["Class 9"]), nullable = true)]
    pub teaching_classes: Option<Vec<String>>,
}
