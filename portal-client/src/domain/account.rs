use serde::{Deserialize, Serialize};

/// Account identity as scraped from the account summary page.
///
/// Fields that could not be located on the page are empty strings rather than
/// absent; the record as a whole is only ever replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_number: String,
    pub name: String,
    pub address: String,
    pub meter_id: String,
    pub meter_number: String,
}

/// The currently-selected meter in the summary page's meter dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterInfo {
    pub meter_id: String,
    pub meter_number: String,
}

impl AccountInfo {
    pub fn meter(&self) -> MeterInfo {
        MeterInfo {
            meter_id: self.meter_id.clone(),
            meter_number: self.meter_number.clone(),
        }
    }
}
