//! Read-only glucose summary for the voice assistant tool
//!
//! The assistant asks by user id, not session id. An active session's
//! configuration is preferred; otherwise the last complete configuration
//! seen for that user is used, so no rendering session is required.

use crate::alerts::classify;
use crate::core::{SessionRegistry, Services};
use crate::format::locale;
use gluco_glance_core::{FetchError, GlanceError};
use gluco_glance_types::{Configuration, Language, Severity};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

/// Reading details returned to the assistant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryData {
    /// Value in the user's display unit
    pub value: f64,
    pub unit: String,
    pub trend: String,
    pub status: Severity,
}

/// Assistant tool response: `{success, message, data}` or `{success, error}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlucoseSummary {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<SummaryData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GlucoseSummary {
    fn failure(error: impl ToString) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(error.to_string()),
        }
    }
}

fn configuration_for(
    services: &Services,
    registry: &SessionRegistry,
    user_id: &str,
) -> Option<Arc<Configuration>> {
    let from_session = registry
        .find_by_user(user_id)
        .map(|state| Arc::clone(&state.snapshot().configuration))
        .filter(|config| config.is_complete());
    from_session.or_else(|| {
        services
            .user_configs
            .get(user_id)
            .map(|config| Arc::clone(config.value()))
    })
}

pub async fn glucose_summary(
    services: &Services,
    registry: &SessionRegistry,
    user_id: &str,
    language: Option<&str>,
) -> GlucoseSummary {
    let Some(config) = configuration_for(services, registry, user_id) else {
        debug!("No configuration known for user {}", user_id);
        return GlucoseSummary::failure(GlanceError::ConfigurationIncomplete);
    };
    let language = language
        .and_then(Language::parse)
        .unwrap_or(config.language);

    let timeout = services.timings.fetch_timeout();
    let request = services
        .client
        .fetch_current_reading(&config.data_source_url, &config.data_source_token);
    let reading = match tokio::time::timeout(timeout, request).await {
        Ok(Ok(reading)) => reading,
        Ok(Err(e)) => {
            let err = GlanceError::from(e);
            warn!("Assistant summary for user {} failed: {}", user_id, err);
            return GlucoseSummary::failure(err);
        }
        Err(_) => {
            let err = GlanceError::from(FetchError::Timeout(timeout));
            warn!("Assistant summary for user {} failed: {}", user_id, err);
            return GlucoseSummary::failure(err);
        }
    };

    let unit = config.display_unit;
    let status = classify(reading.value, &config);
    let value_text = unit.format_value(reading.value);
    let message = locale::summary_sentence(
        language,
        &value_text,
        unit.label(),
        reading.direction.glyph(),
        locale::severity_name(status, language),
    );

    GlucoseSummary {
        success: true,
        message: Some(message),
        data: Some(SummaryData {
            value: unit.from_canonical(reading.value),
            unit: unit.label().to_string(),
            trend: reading.direction.name().to_string(),
            status,
        }),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::DisplayScheduler;
    use crate::test_support::{reading, ScriptedClient};
    use gluco_glance_types::{Direction, DisplayUnit};
    use serde_json::json;

    fn scheduler(client: ScriptedClient) -> DisplayScheduler {
        DisplayScheduler::new(
            Arc::new(client),
            Arc::new(SessionRegistry::new()),
            &AppConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_unknown_user_fails() {
        let scheduler = scheduler(ScriptedClient::new());
        let summary = scheduler.glucose_summary("nobody", None).await;
        assert!(!summary.success);
        assert!(summary.error.is_some());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["success"], json!(false));
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_cached_configuration_without_session() {
        let client = ScriptedClient::new().with_default(reading(250.0, Direction::SingleUp));
        let scheduler = scheduler(client);
        scheduler.services().user_configs.insert(
            "alice".to_string(),
            Arc::new(Configuration {
                data_source_url: "demo.example".to_string(),
                data_source_token: "abc".to_string(),
                display_unit: DisplayUnit::MmolL,
                ..Configuration::default()
            }),
        );

        let summary = scheduler.glucose_summary("alice", Some("es")).await;
        assert!(summary.success);
        let data = summary.data.unwrap();
        assert_eq!(data.value, 13.9);
        assert_eq!(data.unit, "mmol/L");
        assert_eq!(data.trend, "SingleUp");
        assert_eq!(data.status, Severity::High);
        assert!(summary.message.unwrap().starts_with("Tu glucosa es 13.9 mmol/L"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let client = ScriptedClient::new();
        client.push_failure();
        let scheduler = scheduler(client);
        scheduler.services().user_configs.insert(
            "bob".to_string(),
            Arc::new(Configuration {
                data_source_url: "demo.example".to_string(),
                data_source_token: "abc".to_string(),
                ..Configuration::default()
            }),
        );
        let summary = scheduler.glucose_summary("bob", None).await;
        assert!(!summary.success);
        assert!(summary.error.unwrap().contains("network"));
    }
}
