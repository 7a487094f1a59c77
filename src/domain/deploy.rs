use serde::Serialize;

/// A deploy marker posted to the event gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployEvent {
    /// Revision of the code that was deployed.
    revision_id: String,
    /// Person or robot responsible for the deploy.
    #[serde(skip_serializing_if = "Option::is_none")]
    deployed_by: Option<String>,
    /// Environment deployed to, e.g. staging or production.
    #[serde(skip_serializing_if = "Option::is_none")]
    deployed_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
}

impl DeployEvent {
    pub fn new(revision_id: impl Into<String>) -> Self {
        Self {
            revision_id: revision_id.into(),
            deployed_by: None,
            deployed_to: None,
            repository: None,
        }
    }

    pub fn deployed_by(mut self, deployed_by: &str) -> Self {
        self.deployed_by = super::non_empty(Some(deployed_by));
        self
    }

    pub fn deployed_to(mut self, deployed_to: &str) -> Self {
        self.deployed_to = super::non_empty(Some(deployed_to));
        self
    }

    pub fn repository(mut self, repository: &str) -> Self {
        self.repository = super::non_empty(Some(repository));
        self
    }

    pub fn revision_id(&self) -> &str {
        &self.revision_id
    }
}
