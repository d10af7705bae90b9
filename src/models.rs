use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct RegisterReq {
    pub emp_id: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub email: String,
    /// A manager may oversee several processes; an associate normally has
    /// one. One credential row is written per entry.
    pub processes: Vec<String>,
}

#[derive(Deserialize)]
pub struct LoginReqDto {
    pub emp_id: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Employee id.
    pub sub: String,
    pub name: String,
    pub role: String,
    pub process: Vec<String>,
    pub exp: usize,
    pub jti: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
