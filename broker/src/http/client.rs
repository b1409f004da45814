use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, warn};

use super::envelope;
use super::{InvocationOutcome, InvocationResult, WorkerConnection};
use crate::catalog::{FieldValues, OperationCatalog, OperationDescriptor};
use crate::constants::soap;
use crate::credentials::{CredentialPair, CredentialStore};
use crate::errors::BrokerError;

/// One catalog operation bound to a session's credentials.
///
/// Construction fails fast for unknown operations and missing credentials, so
/// a batch can be rejected before anything is scheduled.
#[derive(Debug, Clone)]
pub struct OperationClient {
    descriptor: OperationDescriptor,
    credentials: CredentialPair,
    session_id: String,
}

impl OperationClient {
    pub fn new(
        catalog: &OperationCatalog,
        store: &CredentialStore,
        code: &str,
        session_id: &str,
    ) -> Result<Self, BrokerError> {
        let descriptor = catalog.get(code)?.clone();
        let credentials = store.get(session_id)?;
        Ok(Self {
            descriptor,
            credentials,
            session_id: session_id.to_string(),
        })
    }

    pub fn descriptor(&self) -> &OperationDescriptor {
        &self.descriptor
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn render(&self, fields: &FieldValues) -> Result<String, BrokerError> {
        self.descriptor.template.render(fields)
    }

    /// Render and POST the operation on the given connection.
    ///
    /// Only validation problems are returned as `Err`; every network or
    /// backend failure is reported inside the [`InvocationResult`].
    pub async fn invoke(
        &self,
        connection: &mut WorkerConnection,
        fields: &FieldValues,
        timeout: Duration,
    ) -> Result<InvocationResult, BrokerError> {
        let body = self.render(fields)?;
        let payload = envelope::wrap(&body);
        let name = self.descriptor.name();

        debug!(
            "Worker {} invoking {} for session {} as {}",
            connection.worker_id(),
            name,
            self.session_id,
            self.credentials.user
        );

        let response = connection
            .send_with_retry(|client| {
                client
                    .post(&self.descriptor.endpoint)
                    .header(CONTENT_TYPE, soap::CONTENT_TYPE)
                    .header(ACCEPT, soap::ACCEPT)
                    .header(soap::ACTION_HEADER, &self.descriptor.action)
                    .basic_auth(&self.credentials.user, Some(&self.credentials.secret))
                    .timeout(timeout)
                    .body(payload.clone())
            })
            .await;

        let outcome = match response {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(text) if status.is_success() => InvocationOutcome::Success {
                        payload: envelope::extract_body(&text),
                    },
                    Ok(text) => {
                        warn!("{} returned HTTP {}", name, status.as_u16());
                        InvocationOutcome::RemoteApplicationError {
                            status: status.as_u16(),
                            body: text,
                        }
                    }
                    Err(e) => transport_failure(name, e, timeout),
                }
            }
            Err(e) => transport_failure(name, e, timeout),
        };

        Ok(InvocationResult::from_outcome(outcome))
    }
}

fn transport_failure(name: &str, error: reqwest::Error, timeout: Duration) -> InvocationOutcome {
    if error.is_timeout() {
        let timeout_seconds = whole_seconds(timeout);
        warn!("{} timed out after {}s", name, timeout_seconds);
        InvocationOutcome::TransportTimeout { timeout_seconds }
    } else {
        warn!("{} transport error: {}", name, error);
        InvocationOutcome::TransportError {
            message: error.to_string(),
        }
    }
}

/// Seconds rounded up, so a sub-second timeout never reports zero
fn whole_seconds(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}
