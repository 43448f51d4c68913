//! Conversions from external infrastructure errors into domain errors.

use listify_domain::ListifyError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ListifyError);

impl From<InfraError> for ListifyError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ListifyError> for InfraError {
    fn from(value: ListifyError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoListifyError {
    fn into_listify(self) -> ListifyError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ListifyError */
/* -------------------------------------------------------------------------- */

impl IntoListifyError for HttpError {
    fn into_listify(self) -> ListifyError {
        if self.is_timeout() {
            return ListifyError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ListifyError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return ListifyError::Api(format!("HTTP response body could not be decoded: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => ListifyError::Auth(message),
                404 => ListifyError::NotFound(message),
                _ => ListifyError::Api(message),
            };
        }

        if self.is_builder() {
            return ListifyError::Config(format!("invalid HTTP request: {self}"));
        }

        ListifyError::Network(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_listify())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → ListifyError */
/* -------------------------------------------------------------------------- */

impl IntoListifyError for std::io::Error {
    fn into_listify(self) -> ListifyError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => ListifyError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                ListifyError::Storage(format!("permission denied: {self}"))
            }
            _ => ListifyError::Storage(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_listify())
    }
}

/* -------------------------------------------------------------------------- */
/* configuration parsing → ListifyError */
/* -------------------------------------------------------------------------- */

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(ListifyError::Config(format!("Invalid TOML format: {value}")))
    }
}

impl From<url::ParseError> for InfraError {
    fn from(value: url::ParseError) -> Self {
        InfraError(ListifyError::Config(format!("Invalid URL: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "cookies.json");
        let mapped: ListifyError = InfraError::from(err).into();
        match mapped {
            ListifyError::NotFound(msg) => assert!(msg.contains("cookies.json")),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn io_other_maps_to_storage() {
        let err = std::io::Error::other("disk full");
        let mapped: ListifyError = InfraError::from(err).into();
        assert!(matches!(mapped, ListifyError::Storage(_)));
    }

    #[test]
    fn invalid_toml_maps_to_config_error() {
        let err = toml::from_str::<toml::Table>("[api\nbase_url =").unwrap_err();
        let mapped: ListifyError = InfraError::from(err).into();
        assert!(matches!(mapped, ListifyError::Config(msg) if msg.contains("TOML")));
    }

    #[test]
    fn invalid_url_maps_to_config_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let mapped: ListifyError = InfraError::from(err).into();
        assert!(matches!(mapped, ListifyError::Config(_)));
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: ListifyError = InfraError::from(error).into();
        match mapped {
            ListifyError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_connection_refused_maps_to_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: ListifyError = InfraError::from(error).into();
        assert!(matches!(mapped, ListifyError::Network(_)));
    }
}
