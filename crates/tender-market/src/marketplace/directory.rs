use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use super::domain::{ContractorId, LandlordId, PropertyId};
use super::trades::TradeCategory;

/// Error enumeration for directory lookups.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Identity/property collaborator consumed by the marketplace (trade sets
/// for contractors, property ownership for landlords). The marketplace never
/// owns this data; it only reads through this boundary.
pub trait PropertyDirectory: Send + Sync {
    fn trades_for_contractor(
        &self,
        contractor_id: &ContractorId,
    ) -> Result<BTreeSet<TradeCategory>, DirectoryError>;

    fn landlord_for_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Option<LandlordId>, DirectoryError>;
}

/// In-process directory used by the binary and tests. An unknown contractor
/// simply has an empty trade set.
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    contractor_trades: BTreeMap<ContractorId, BTreeSet<TradeCategory>>,
    property_owners: BTreeMap<PropertyId, LandlordId>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_contractor(
        &self,
        contractor_id: ContractorId,
        trades: impl IntoIterator<Item = TradeCategory>,
    ) {
        let mut state = self.state.lock().expect("directory mutex poisoned");
        state
            .contractor_trades
            .insert(contractor_id, trades.into_iter().collect());
    }

    pub fn register_property(&self, property_id: PropertyId, landlord_id: LandlordId) {
        let mut state = self.state.lock().expect("directory mutex poisoned");
        state.property_owners.insert(property_id, landlord_id);
    }
}

impl PropertyDirectory for StaticDirectory {
    fn trades_for_contractor(
        &self,
        contractor_id: &ContractorId,
    ) -> Result<BTreeSet<TradeCategory>, DirectoryError> {
        let state = self.state.lock().expect("directory mutex poisoned");
        Ok(state
            .contractor_trades
            .get(contractor_id)
            .cloned()
            .unwrap_or_default())
    }

    fn landlord_for_property(
        &self,
        property_id: &PropertyId,
    ) -> Result<Option<LandlordId>, DirectoryError> {
        let state = self.state.lock().expect("directory mutex poisoned");
        Ok(state.property_owners.get(property_id).cloned())
    }
}
