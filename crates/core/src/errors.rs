use thiserror::Error;

/// Request-boundary validation failures. These are typed here and mapped to
/// transport responses only in the server crate; the scoring pipeline never
/// starts for a request that fails to parse.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid location `{raw}`: expected `<lat>,<lon>` in decimal degrees")]
    InvalidLocation { raw: String },
    #[error("invalid patient id `{raw}`: expected a UUID")]
    InvalidPatientId { raw: String },
}

impl RequestError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidLocation { .. } => {
                "location must be two decimal numbers separated by a comma"
            }
            Self::InvalidPatientId { .. } => "patient_id must be a UUID",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RequestError;

    #[test]
    fn invalid_location_has_user_safe_message() {
        let error = RequestError::InvalidLocation { raw: "abc".to_string() };
        assert_eq!(
            error.user_message(),
            "location must be two decimal numbers separated by a comma"
        );
    }
}
