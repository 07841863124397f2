use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PrdError, Result};
use crate::store::{DocumentStore, StorageBackend};

pub fn show<B: StorageBackend>(store: &DocumentStore<B>) -> Result<CmdResult> {
    Ok(CmdResult {
        preferences: Some(store.get_preferences()),
        ..Default::default()
    })
}

/// Sets one preference by its camelCase key.
pub fn set<B: StorageBackend>(
    store: &DocumentStore<B>,
    key: &str,
    value: &str,
) -> Result<CmdResult> {
    let mut prefs = store.get_preferences();
    prefs.set(key, value).map_err(PrdError::Api)?;
    store.save_preferences(&prefs)?;

    let mut result = CmdResult {
        preferences: Some(prefs),
        ..Default::default()
    };
    result.add_message(CmdMessage::success(format!("{} = {}", key, value)));
    Ok(result)
}
