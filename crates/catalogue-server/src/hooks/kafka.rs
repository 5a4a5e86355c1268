//! Archive stream topics into the historical database

use catalogue_common::types::{AssetDraft, Interface, Parameter};

use super::{HookConfig, HookError, PostCreateHook};

/// Position of the topic parameter on a stream connector
const TOPIC_PARAMETER_INDEX: usize = 2;

const ARCHIVE_PREFIX: &str = "historical_";

/// For every stream asset, register a companion asset whose data lands in
/// the `historical_<topic>` collection of the historical database
#[derive(Debug, Clone)]
pub struct HistoricalArchiveHook {
    config: HookConfig,
}

impl HistoricalArchiveHook {
    pub fn new(config: HookConfig) -> Self {
        Self { config }
    }
}

impl PostCreateHook for HistoricalArchiveHook {
    fn name(&self) -> &'static str {
        "historical-archive"
    }

    fn derive(&self, draft: &AssetDraft) -> Result<Vec<AssetDraft>, HookError> {
        let parameters = &draft.interface.parameters;
        let topic = parameters
            .get(TOPIC_PARAMETER_INDEX)
            .ok_or(HookError::MissingParameter {
                hook: self.name(),
                required: TOPIC_PARAMETER_INDEX + 1,
                found: parameters.len(),
            })?;

        let archive = AssetDraft {
            model: draft.model.clone(),
            pilot: draft.pilot.clone(),
            interface: Interface {
                connector: self.config.historical_connector.clone(),
                protocol: self.config.historical_protocol.clone(),
                parameters: vec![
                    Parameter::new("collection", format!("{}{}", ARCHIVE_PREFIX, topic.value)),
                    Parameter::new("database", self.config.historical_database.clone()),
                ],
            },
        };

        Ok(vec![archive])
    }
}
