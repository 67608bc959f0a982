use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffLoginReq {
    #[schema(example = "TEACH-482913")]
    pub staff_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct OfficeLoginReq {
    #[schema(example = "office@school.edu")]
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "staff")]
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Staff id for staff, email for office logins.
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    /// Present only for staff logins
    pub staff_id: Option<String>,
}
