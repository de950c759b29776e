//! Contract classification
//!
//! A function `f` carries a contract when the artifact references the
//! undefined symbol `contract::f`. From the set of such names:
//!
//! - **enforceable**: contracts whose function has a body in this artifact,
//!   optionally narrowed by the user's allow-list;
//! - **usable**: contracts whose function the artifact defines or at least
//!   references, so a call target exists to substitute the contract at.
//!
//! `enforceable` is always a subset of `usable`.

use std::collections::BTreeSet;

/// Namespace marking the contract symbol of a function
pub const CONTRACT_PREFIX: &str = "contract::";

/// Function name carried by a contract symbol, if it is one
pub fn contract_target(symbol: &str) -> Option<&str> {
    symbol
        .strip_prefix(CONTRACT_PREFIX)
        .filter(|name| !name.is_empty())
}

/// Contracts of one artifact, split by how they can be used
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Contracts to prove, one harness each
    pub enforceable: BTreeSet<String>,
    /// Contracts available as call replacements
    pub usable: BTreeSet<String>,
}

impl Classification {
    /// Classify the contracts of one artifact.
    ///
    /// `defined` holds every function with a body; `undefined` is the raw
    /// undefined-function listing, contract symbols included.
    pub fn new(
        defined: &BTreeSet<String>,
        undefined: &BTreeSet<String>,
        allow_list: Option<&BTreeSet<String>>,
    ) -> Self {
        let contracts: BTreeSet<&str> = undefined
            .iter()
            .filter_map(|symbol| contract_target(symbol))
            .collect();

        let usable: BTreeSet<String> = contracts
            .iter()
            .filter(|name| defined.contains(**name) || undefined.contains(**name))
            .map(|name| name.to_string())
            .collect();

        let enforceable = usable
            .iter()
            .filter(|name| defined.contains(*name))
            .filter(|name| allow_list.is_none_or(|allow| allow.contains(*name)))
            .cloned()
            .collect();

        Self {
            enforceable,
            usable,
        }
    }

    /// Contracts to substitute for calls while proving `target`.
    /// Never contains `target` itself.
    pub fn stubs_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.usable
            .iter()
            .map(String::as_str)
            .filter(move |name| *name != target)
    }

    /// True when at least one contract gets a harness
    pub fn has_enforceable(&self) -> bool {
        !self.enforceable.is_empty()
    }
}
