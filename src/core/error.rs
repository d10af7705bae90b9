use actix_web::{HttpResponse, http::StatusCode};
use derive_more::{Display, Error};
use serde_json::json;

use crate::model::activity::Category;
use crate::store::StoreError;

#[derive(Debug, Display, Error)]
pub enum CoreError {
    /// Unrecognized activity category; rejected before any write.
    #[display(fmt = "Invalid activity type")]
    InvalidCategory,

    /// The label is not in the configured task list for any of the
    /// caller's processes. Only the `task` category is validated.
    #[display(fmt = "'{}' is not a configured task for this process", label)]
    UnknownTaskLabel {
        #[error(not(source))]
        label: String,
    },

    /// A close matched zero rows: the open record vanished between the
    /// resolve and the update.
    #[display(fmt = "no open {} record matched", category)]
    NoMatchingRecord {
        #[error(not(source))]
        category: Category,
    },

    #[display(fmt = "persistence error: {}", _0)]
    Persistence(#[error(source)] StoreError),
}

impl From<StoreError> for CoreError {
    fn from(e: StoreError) -> Self {
        CoreError::Persistence(e)
    }
}

impl actix_web::ResponseError for CoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            CoreError::InvalidCategory | CoreError::UnknownTaskLabel { .. } => {
                StatusCode::BAD_REQUEST
            }
            CoreError::NoMatchingRecord { .. } => StatusCode::NOT_FOUND,
            CoreError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Store details stay in the logs, not in the response body.
        let message = match self {
            CoreError::Persistence(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code())
            .json(json!({ "status": "error", "message": message }))
    }
}
