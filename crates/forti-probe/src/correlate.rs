//! Correlation of two independently fetched collections that describe the
//! same physical entities from different facets.
//!
//! The primary collection drives the output: every primary entity appears
//! exactly once, in primary order, and nothing absent from it is ever
//! produced. Secondary entities are attached by correlation key.

use std::collections::HashMap;

use tracing::warn;

/// An entity carrying an opaque correlation key.
pub trait Keyed {
    fn correlation_key(&self) -> &str;

    /// Human-readable identity used in reconciliation warnings.
    fn describe(&self) -> String {
        self.correlation_key().to_string()
    }
}

/// A primary entity joined with its secondary facet.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged<P, S> {
    pub primary: P,
    pub secondary: S,
    /// False when no secondary entity shared the primary's key and
    /// `secondary` is the default sub-record.
    pub matched: bool,
}

/// Join `secondary` onto `primary` by correlation key.
///
/// When the secondary collection repeats a key, its first occurrence wins.
/// Each unmatched primary entity logs one warning naming it and `facet`.
pub fn merge<P, S>(primary: Vec<P>, secondary: Vec<S>, facet: &str) -> Vec<Merged<P, S>>
where
    P: Keyed,
    S: Keyed + Default + Clone,
{
    let mut index: HashMap<String, S> = HashMap::with_capacity(secondary.len());
    for entity in secondary {
        index
            .entry(entity.correlation_key().to_string())
            .or_insert(entity);
    }

    primary
        .into_iter()
        .map(|entity| match index.get(entity.correlation_key()) {
            Some(secondary) => Merged {
                primary: entity,
                secondary: secondary.clone(),
                matched: true,
            },
            None => {
                warn!(
                    entity = %entity.describe(),
                    key = entity.correlation_key(),
                    facet,
                    "no matching record, using empty defaults"
                );
                Merged {
                    primary: entity,
                    secondary: S::default(),
                    matched: false,
                }
            }
        })
        .collect()
}
