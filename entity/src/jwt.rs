use serde::Serialize;
use utoipa::ToSchema;

/// A freshly minted access token handed back to the frontend.
/// Note: This struct does not have a corresponding entity in the database.
///
/// `sub` carries the subject claim alongside the encoded token so callers
/// can read the user id without decoding the JWT again.
#[derive(Serialize, Debug, ToSchema)]
#[schema(as = jwt::Jwt)] // OpenAPI schema
pub struct Jwt {
    pub token: String,
    pub sub: String,
}
