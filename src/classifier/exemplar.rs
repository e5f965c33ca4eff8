//! Exemplar sets for the exact-match stage.

use ahash::AHashSet;
use log::info;

use crate::embedding::EmbeddingStore;
use crate::error::Result;

/// Tokens known to denote an entrance or an exit.
///
/// Built once and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExemplarSet {
    entrance: AHashSet<String>,
    exit: AHashSet<String>,
}

impl ExemplarSet {
    /// Take the `k` nearest neighbours of each anchor as its exemplars.
    pub fn derive<S>(store: &S, entrance_anchor: &str, exit_anchor: &str, k: usize) -> Result<Self>
    where
        S: EmbeddingStore + ?Sized,
    {
        let entrance: AHashSet<String> = store
            .nearest_neighbors(entrance_anchor, k)?
            .into_iter()
            .map(|neighbor| neighbor.token)
            .collect();
        let exit: AHashSet<String> = store
            .nearest_neighbors(exit_anchor, k)?
            .into_iter()
            .map(|neighbor| neighbor.token)
            .collect();

        info!(
            "Stored {} entrance and {} exit exemplars",
            entrance.len(),
            exit.len()
        );
        Ok(Self { entrance, exit })
    }

    /// Build exemplar sets from explicit token lists.
    pub fn from_tokens<I, J, S>(entrance: I, exit: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entrance: entrance.into_iter().map(Into::into).collect(),
            exit: exit.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_entrance(&self, token: &str) -> bool {
        self.entrance.contains(token)
    }

    pub fn is_exit(&self, token: &str) -> bool {
        self.exit.contains(token)
    }

    pub fn entrance(&self) -> &AHashSet<String> {
        &self.entrance
    }

    pub fn exit(&self) -> &AHashSet<String> {
        &self.exit
    }
}
