use crate::schema::StateRecord;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// The whole snapshot store, keyed by symbol.
pub type StateMap = BTreeMap<String, StateRecord>;

/// Read the snapshot store from `path`.
///
/// An absent file means "first run" and a corrupt file degrades the same
/// way; neither is ever fatal.
pub async fn load(path: &Path) -> StateMap {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(_) => return StateMap::new(),
    };

    match serde_json::from_slice(&bytes) {
        Ok(map) => map,
        Err(e) => {
            log::warn!(
                "state file {} is unreadable ({e}); treating as first run",
                path.display()
            );
            StateMap::new()
        }
    }
}

/// Overwrite the snapshot store at `path` with the entire mapping.
///
/// The JSON is written to a sibling temp file and renamed into place, so a
/// reader never observes a partially written store.
pub async fn save(path: &Path, state: &StateMap) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    log::debug!("state saved to {} ({} symbols)", path.display(), state.len());
    Ok(())
}
