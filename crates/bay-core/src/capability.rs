use serde::{Deserialize, Serialize};

use crate::error::{BayError, Result};
use crate::schema::{ActionSchema, ReturnSpec};

/// Descriptor of a read-only observation accessor. Same shape as an
/// action minus parameters; observations must be side-effect free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationSpec {
    pub name: String,
    pub description: String,
    pub returns: ReturnSpec,
}

impl ObservationSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        returns: ReturnSpec,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            returns,
        }
    }
}

/// The declared action and observation surface of one device type.
///
/// Built once when the device type is registered and immutable
/// thereafter. Registration is append-only: adding an action or
/// observation under a name that is already taken fails with
/// [`BayError::DuplicateAction`] so capabilities cannot silently drift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    device_type: String,
    description: String,
    actions: Vec<ActionSchema>,
    observations: Vec<ObservationSpec>,
}

impl CapabilityDescriptor {
    pub fn new(device_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            device_type: device_type.into(),
            description: description.into(),
            actions: Vec::new(),
            observations: Vec::new(),
        }
    }

    pub fn device_type(&self) -> &str {
        &self.device_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn actions(&self) -> &[ActionSchema] {
        &self.actions
    }

    pub fn observations(&self) -> &[ObservationSpec] {
        &self.observations
    }

    /// Declare an action. Fails if the name is already taken by another
    /// action on this device type.
    pub fn add_action(&mut self, schema: ActionSchema) -> Result<()> {
        if self.actions.iter().any(|a| a.name() == schema.name()) {
            return Err(BayError::DuplicateAction {
                device_type: self.device_type.clone(),
                action: schema.name().to_string(),
            });
        }
        self.actions.push(schema);
        Ok(())
    }

    /// Declare an observation. Names share the action namespace rules:
    /// re-declaring one is an error.
    pub fn add_observation(&mut self, spec: ObservationSpec) -> Result<()> {
        if self.observations.iter().any(|o| o.name == spec.name) {
            return Err(BayError::DuplicateAction {
                device_type: self.device_type.clone(),
                action: spec.name,
            });
        }
        self.observations.push(spec);
        Ok(())
    }

    /// Look up an action schema by name.
    pub fn resolve(&self, action: &str) -> Option<&ActionSchema> {
        self.actions.iter().find(|a| a.name() == action)
    }

    /// Look up an observation descriptor by name.
    pub fn observation(&self, name: &str) -> Option<&ObservationSpec> {
        self.observations.iter().find(|o| o.name == name)
    }
}
