//! A blocking HTTP client for the annotation editor service.
//!
//! Every operation is a JSON `POST` to `<context_path>/<service>`. The
//! client is both the [`UpdateService`] alterations are submitted to and the
//! [`TranslationTableSource`] codon tables are loaded from.

use reqwest::blocking::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info};

use crate::{
    config::EditorConfig,
    error::AlterationError,
    request::{TranslationTableRequest, TranslationTableResponse, UpdateRequest},
    traits::{TranslationTableSource, UpdateService},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AnnotationEditorClient {
    client: Client,
    endpoint: String,
    track: String,
}

impl AnnotationEditorClient {
    /// Create a client for the annotation track of `seqname`.
    pub fn new(config: &EditorConfig, seqname: &str) -> Result<Self, AlterationError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, config, seqname))
    }

    /// Create a client using an already configured [`reqwest`] client.
    pub fn with_client(client: Client, config: &EditorConfig, seqname: &str) -> Self {
        Self {
            client,
            endpoint: config.endpoint_url(),
            track: config.track_name(seqname),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post `body` as JSON, failing on transport errors and non-success statuses.
    pub fn post<T: Serialize>(&self, body: &T) -> Result<Response, AlterationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()?
            .error_for_status()?;
        Ok(response)
    }
}

impl UpdateService for AnnotationEditorClient {
    fn unique_track_name(&self) -> String {
        self.track.clone()
    }

    fn execute_update_operation(&mut self, request: &UpdateRequest) {
        match self.post(request) {
            Ok(response) => info!(
                endpoint = %self.endpoint,
                status = %response.status(),
                "update operation accepted"
            ),
            Err(e) => error!(endpoint = %self.endpoint, "update operation failed: {}", e),
        }
    }
}

impl TranslationTableSource for AnnotationEditorClient {
    fn fetch_translation_table(
        &self,
        request: &TranslationTableRequest,
    ) -> Result<TranslationTableResponse, AlterationError> {
        let response = self.post(request)?.json()?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alteration::{AlterationInput, SequenceAlterationFeature};
    use crate::translation::{load_translation_table, CodonTable};
    use crate::test_utilities::serve_once;
    use std::net::TcpListener;

    fn test_client(url: &str) -> AnnotationEditorClient {
        let config = EditorConfig {
            context_path: url.to_string(),
            ..EditorConfig::default()
        };
        let client = Client::builder().no_proxy().build().unwrap();
        AnnotationEditorClient::with_client(client, &config, "chr1")
    }

    #[test]
    fn test_endpoint_and_track() {
        let client = test_client("http://localhost:8080/apollo/");
        assert_eq!(client.endpoint(), "http://localhost:8080/apollo/AnnotationEditorService");
        assert_eq!(client.unique_track_name(), "Annotations-chr1");
    }

    #[test]
    fn test_execute_update_operation_posts_request() {
        let (url, server) = serve_once("200 OK", "{}");
        let mut client = test_client(&url);
        let feature =
            SequenceAlterationFeature::new(1000, &AlterationInput::Deletion(5)).unwrap();
        let request = UpdateRequest::add_sequence_alteration(client.unique_track_name(), feature);
        client.execute_update_operation(&request);

        let received: UpdateRequest = serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(received, request);
    }

    #[test]
    fn test_fetch_translation_table() {
        let (url, server) = serve_once("200 OK", r#"{"translation_table": {"TGA": "W"}}"#);
        let client = test_client(&url);
        let request = TranslationTableRequest::new("Annotations-", "chrM");
        let table = load_translation_table(&client, &request);
        assert_eq!(table.get("TGA"), Some('W'));

        let received: TranslationTableRequest =
            serde_json::from_str(&server.join().unwrap()).unwrap();
        assert_eq!(received, request);
    }

    #[test]
    fn test_fetch_translation_table_error_status() {
        let (url, server) = serve_once("500 Internal Server Error", "{}");
        let client = test_client(&url);
        let request = TranslationTableRequest::new("Annotations-", "chr1");
        assert!(matches!(
            client.fetch_translation_table(&request),
            Err(AlterationError::ServiceError(_))
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_unreachable_service_falls_back() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let client = test_client(&url);
        let request = TranslationTableRequest::new("Annotations-", "chr1");
        assert_eq!(load_translation_table(&client, &request), CodonTable::default());
    }
}
