//! Game info source for hosts without game data access

use super::traits::GameInfoSource;
use crate::error::CollectError;

const REASON: &str = "game shared memory is not available on this host";

/// A [`GameInfoSource`] that always reports the game data as unavailable
///
/// The game-info poller then records an offline reading: no theater and zero
/// players.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGameInfo;

impl GameInfoSource for OfflineGameInfo {
    fn theater_name(&self) -> Result<String, CollectError> {
        Err(CollectError::Unavailable(REASON.to_string()))
    }

    fn pilot_count(&self) -> Result<u32, CollectError> {
        Err(CollectError::Unavailable(REASON.to_string()))
    }

    fn pilot_data(&self) -> Result<Vec<String>, CollectError> {
        Err(CollectError::Unavailable(REASON.to_string()))
    }
}
