//! Claims of the session token issued by the identity provider

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JWTClaims {
    /// Subject id at the identity provider
    pub sub: String,
    pub email: String,
    /// Expiration, seconds since epoch
    pub exp: i64,
}
