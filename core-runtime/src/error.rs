use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        for err in [
            Error::Config("bad ttl".to_string()),
            Error::CapabilityMissing {
                capability: "HttpClient".to_string(),
                message: "no client".to_string(),
            },
        ] {
            let message = err.to_string();
            match err {
                Error::Config(_) => assert_eq!(message, "Configuration error: bad ttl"),
                Error::CapabilityMissing { .. } => {
                    assert_eq!(message, "Capability missing: HttpClient - no client")
                }
            }
        }
    }
}
