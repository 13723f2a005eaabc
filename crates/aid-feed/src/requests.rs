use std::sync::Arc;

use tracing::{debug, info, warn};

use aid_api::{ClientError, HelpRequestApi, Session};
use aid_types::api::NewHelpRequest;
use aid_types::{ConversationId, HelpRequest, HelpRequestId, RequestType, UserId};

use crate::notice::Notice;

pub const DESCRIPTION_LIMIT: usize = 300;

/// Only requests still advertised to helpers.
pub fn visible_requests(requests: Vec<HelpRequest>) -> Vec<HelpRequest> {
    requests.into_iter().filter(|r| r.visible).collect()
}

/// Unvalidated input from the "new request" form.
#[derive(Debug, Clone, Default)]
pub struct HelpRequestForm {
    pub title: String,
    pub request_type: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
}

impl HelpRequestForm {
    pub fn validate(&self, user_id: UserId) -> Result<NewHelpRequest, ClientError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(invalid("Title is required"));
        }
        if self.request_type.trim().is_empty() {
            return Err(invalid("Request type is required"));
        }
        let request_type: RequestType = self
            .request_type
            .trim()
            .parse()
            .map_err(ClientError::Invalid)?;

        if self.description.chars().count() > DESCRIPTION_LIMIT {
            return Err(invalid("Description must be 300 characters or fewer"));
        }

        let latitude = coordinate(&self.latitude, "Latitude", 90.0)?;
        let longitude = coordinate(&self.longitude, "Longitude", 180.0)?;

        Ok(NewHelpRequest {
            title: title.to_string(),
            request_type,
            description: self.description.trim().to_string(),
            latitude,
            longitude,
            user_id,
        })
    }
}

fn coordinate(raw: &str, name: &str, bound: f64) -> Result<f64, ClientError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(&format!("{} must be a number", name)))?;
    if !value.is_finite() || value.abs() > bound {
        return Err(invalid(&format!("{} must be between -{} and {}", name, bound, bound)));
    }
    Ok(value)
}

fn invalid(message: &str) -> ClientError {
    ClientError::Invalid(message.to_string())
}

/// Open help requests the signed-in user can take on, plus submission of new
/// ones.
pub struct HelpRequestBoard<A> {
    api: Arc<A>,
    session: Session,
    requests: Vec<HelpRequest>,
}

impl<A: HelpRequestApi> HelpRequestBoard<A> {
    pub fn new(api: Arc<A>, session: Session) -> Self {
        Self {
            api,
            session,
            requests: Vec::new(),
        }
    }

    pub fn requests(&self) -> &[HelpRequest] {
        &self.requests
    }

    /// Re-fetch the open requests. Failures keep the previous list.
    pub async fn refresh(&mut self) -> bool {
        match self.api.list_help_requests(&self.session.token).await {
            Ok(requests) => {
                let total = requests.len();
                self.requests = visible_requests(requests);
                debug!("Loaded {} of {} help requests", self.requests.len(), total);
                true
            }
            Err(e) => {
                warn!("Failed to fetch help requests: {}", e);
                false
            }
        }
    }

    /// Take on a request. Returns the conversation opened with its requester.
    pub async fn assign(
        &mut self,
        help_request_id: HelpRequestId,
    ) -> Result<ConversationId, ClientError> {
        let conversation_id = self
            .api
            .assign_help_request(&self.session.token, help_request_id, self.session.user_id())
            .await?;
        info!(
            "Assigned help request {} to user {} (conversation {})",
            help_request_id,
            self.session.user_id(),
            conversation_id
        );
        self.refresh().await;
        Ok(conversation_id)
    }

    /// Validate and submit the form. The outcome is reported as a notice.
    pub async fn submit(&mut self, form: &HelpRequestForm) -> Notice {
        let request = match form.validate(self.session.user_id()) {
            Ok(request) => request,
            Err(e) => return Notice::error(e.user_message()),
        };

        match self.api.submit_help_request(&self.session.token, request).await {
            Ok(()) => {
                info!("Help request '{}' submitted", form.title.trim());
                self.refresh().await;
                Notice::success("Request submitted")
            }
            Err(e) => {
                warn!("Failed to submit help request: {}", e);
                Notice::error(e.user_message())
            }
        }
    }
}
