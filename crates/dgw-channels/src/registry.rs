use std::collections::BTreeMap;

use dgw_types::validate_segment;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pointer::{ChannelEntry, ChannelState};

/// The whole registry: dataset -> channel -> entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryDocument(pub BTreeMap<String, BTreeMap<String, ChannelEntry>>);

impl RegistryDocument {
    pub fn entry(&self, dataset: &str, channel: &str) -> Option<&ChannelEntry> {
        self.0.get(dataset)?.get(channel)
    }

    /// Replace a channel's stored entry.
    pub fn set(&mut self, dataset: &str, channel: &str, state: ChannelState) {
        self.0
            .entry(dataset.to_string())
            .or_default()
            .insert(channel.to_string(), ChannelEntry::State(state));
    }
}

/// Storage for the registry document.
///
/// Reads see a consistent snapshot. [`transact`](Self::transact) runs a
/// read-modify-write under the backend's writer lock and either commits the
/// whole modified document or leaves the previous one in place.
pub trait ChannelRegistry: Send + Sync {
    /// Snapshot of the current document.
    fn load(&self) -> Result<RegistryDocument>;

    /// Apply `update` to the document and commit it atomically.
    ///
    /// Nothing is written if `update` fails.
    fn transact(&self, update: &mut dyn FnMut(&mut RegistryDocument) -> Result<()>)
        -> Result<()>;

    /// Normalized state of one channel, if it exists.
    fn channel(&self, dataset: &str, channel: &str) -> Result<Option<ChannelState>> {
        validate_segment("dataset", dataset)?;
        validate_segment("channel", channel)?;
        Ok(self
            .load()?
            .entry(dataset, channel)
            .cloned()
            .map(ChannelEntry::normalize))
    }

    /// Every `(dataset, channel)` pair, in order.
    fn list(&self) -> Result<Vec<(String, String)>> {
        let doc = self.load()?;
        Ok(doc
            .0
            .iter()
            .flat_map(|(dataset, channels)| {
                channels
                    .keys()
                    .map(move |channel| (dataset.clone(), channel.clone()))
            })
            .collect())
    }
}
