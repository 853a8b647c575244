// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! VM name generation.

use ivm_core::VmName;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("failed to generate vm name: {0}")]
    Unavailable(String),
}

/// Generates a fresh name for each isolated VM.
pub trait IdGen: Send + Sync {
    fn next(&self) -> Result<VmName, IdError>;
}

/// Random v4 UUIDs drawn from the OS entropy source.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> Result<VmName, IdError> {
        let mut bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| IdError::Unavailable(e.to_string()))?;
        Ok(VmName::from(uuid::Builder::from_random_bytes(bytes).into_uuid()))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{IdError, IdGen};
    use ivm_core::VmName;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Returns queued names in order, then repeats the last one.
    #[derive(Clone)]
    pub struct FixedIdGen {
        names: Arc<Mutex<VecDeque<VmName>>>,
        error: Option<IdError>,
    }

    impl FixedIdGen {
        pub fn new(name: &str) -> Self {
            Self::sequence([name])
        }

        pub fn sequence<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
            Self {
                names: Arc::new(Mutex::new(names.into_iter().map(VmName::new).collect())),
                error: None,
            }
        }

        /// A generator whose entropy source is exhausted.
        pub fn failing(reason: &str) -> Self {
            Self {
                names: Arc::new(Mutex::new(VecDeque::new())),
                error: Some(IdError::Unavailable(reason.to_string())),
            }
        }
    }

    impl IdGen for FixedIdGen {
        fn next(&self) -> Result<VmName, IdError> {
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
            let mut names = self.names.lock();
            match names.len() {
                0 => Err(IdError::Unavailable("no names queued".to_string())),
                1 => Ok(names[0].clone()),
                _ => names.pop_front().ok_or_else(|| IdError::Unavailable("empty".to_string())),
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FixedIdGen;

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
