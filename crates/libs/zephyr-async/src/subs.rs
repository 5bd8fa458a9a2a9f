use serde::{Deserialize, Serialize};

use crate::error::ZephyrError;

/// Subscription matching wildcard for omitted instance/recipient positions.
pub const WILDCARD: &str = "*";

/// A fully normalized subscription triple, as submitted to the port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionTriple {
    pub class: String,
    pub instance: String,
    pub recipient: String,
}

impl SubscriptionTriple {
    pub fn new(
        class: impl Into<String>,
        instance: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            instance: instance.into(),
            recipient: recipient.into(),
        }
    }
}

/// Typed subscription input with explicit optional positions.
///
/// Omitted instance/recipient fall back to `"*"` during normalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    pub class: String,
    pub instance: Option<String>,
    pub recipient: Option<String>,
}

impl SubscriptionSpec {
    pub fn class(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            instance: None,
            recipient: None,
        }
    }

    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn normalize(&self) -> SubscriptionTriple {
        SubscriptionTriple {
            class: self.class.clone(),
            instance: self.instance.clone().unwrap_or_else(|| WILDCARD.into()),
            recipient: self.recipient.clone().unwrap_or_else(|| WILDCARD.into()),
        }
    }
}

/// Validates and normalizes a loosely-shaped subscription batch.
///
/// Every element must be a list of 1–3 strings; any other shape fails the
/// whole batch before a single port call is made. Positions 1–2 default to
/// the wildcard exactly when the source omitted them.
pub fn validate_batch(raw: &[Vec<String>]) -> Result<Vec<SubscriptionTriple>, ZephyrError> {
    for (index, entry) in raw.iter().enumerate() {
        if entry.is_empty() || entry.len() > 3 {
            return Err(ZephyrError::validation(format!(
                "subscription {index} must be [class, instance?, recipient?], got {} entries",
                entry.len()
            )));
        }
    }

    Ok(raw
        .iter()
        .map(|entry| SubscriptionTriple {
            class: entry[0].clone(),
            instance: entry.get(1).cloned().unwrap_or_else(|| WILDCARD.into()),
            recipient: entry.get(2).cloned().unwrap_or_else(|| WILDCARD.into()),
        })
        .collect())
}
