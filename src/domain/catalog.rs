//! Auction player catalog: the fixed list of biddable players and the
//! fantasy points each one carries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Errors raised while loading a catalog file at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The file could not be read.
    #[error("cannot read player catalog {}: {source}", path.display())]
    Read {
        /// Catalog file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a JSON array of players.
    #[error("invalid player catalog {}: {source}", path.display())]
    Parse {
        /// Catalog file path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

/// A biddable player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogPlayer {
    /// Player name as used in bids and rosters.
    pub name: String,
    /// Fantasy points awarded to the winning team.
    pub points: i64,
}

/// Name-indexed player catalog, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: Vec<CatalogPlayer>,
    by_name: HashMap<String, usize>,
}

impl PlayerCatalog {
    /// Builds a catalog from a player list. Later duplicates win.
    #[must_use]
    pub fn new(players: Vec<CatalogPlayer>) -> Self {
        let by_name = players
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.name.clone(), idx))
            .collect();
        Self { players, by_name }
    }

    /// Loads a catalog from a JSON array of `{"name", "points"}` objects.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Read`] if the file cannot be read and
    /// [`CatalogError::Parse`] if it is not a valid player list.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let players: Vec<CatalogPlayer> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(players))
    }

    /// Returns the points for the named player, if catalogued.
    #[must_use]
    pub fn points_for(&self, name: &str) -> Option<i64> {
        self.by_name
            .get(name)
            .and_then(|idx| self.players.get(*idx))
            .map(|p| p.points)
    }

    /// Returns every catalogued player in file order.
    #[must_use]
    pub fn players(&self) -> &[CatalogPlayer] {
        &self.players
    }

    /// Returns the number of catalogued players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
