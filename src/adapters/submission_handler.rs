use async_trait::async_trait;
use tracing::info;

use crate::domain::wizard::{EMAIL, ROOM_RATING, SERVICE_RATING};
use crate::domain::{FieldMap, SubmissionPort};

/// Records completed submissions in the log and nowhere else.
pub struct LoggingSubmissionHandler;

impl LoggingSubmissionHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingSubmissionHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionPort for LoggingSubmissionHandler {
    async fn submit(&self, values: &FieldMap) -> anyhow::Result<()> {
        let rating = |name: &str| values.get(name).map(|v| v.to_string()).unwrap_or_default();
        let has_email = values
            .get(EMAIL)
            .map(|v| !v.to_string().is_empty())
            .unwrap_or(false);

        // Email addresses stay out of the logs.
        info!(
            room_rating = %rating(ROOM_RATING),
            service_rating = %rating(SERVICE_RATING),
            has_email,
            "Wizard submission received"
        );
        Ok(())
    }
}
