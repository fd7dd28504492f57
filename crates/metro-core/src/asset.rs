//! Handles for values that arrive asynchronously.
//!
//! Loads complete in any order relative to the frame loop, so every loaded
//! thing is held behind an [`Asset`]. The update loop only ever looks at
//! [`Asset::Ready`] values; the other states are skipped.

use crate::error::LoadError;

#[derive(Debug, Default)]
pub enum Asset<T> {
    #[default]
    NotLoaded,
    Ready(T),
    Failed(String),
}

impl<T> Asset<T> {
    pub fn from_result(result: Result<T, LoadError>) -> Self {
        match result {
            Ok(v) => Asset::Ready(v),
            Err(e) => Asset::Failed(e.to_string()),
        }
    }

    #[inline]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Asset::Ready(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Asset::Ready(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Asset::Ready(_))
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            Asset::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl<T: Copy> Asset<T> {
    #[inline]
    pub fn copied(&self) -> Option<T> {
        self.ready().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_result_keeps_reason() {
        let a: Asset<u32> = Asset::from_result(Err(LoadError::NoScene));
        assert!(!a.is_ready());
        assert!(a.ready().is_none());
        assert!(a.failure().unwrap().contains("no nodes"));
    }

    #[test]
    fn default_is_not_loaded() {
        let a: Asset<u32> = Asset::default();
        assert!(matches!(a, Asset::NotLoaded));
        assert_eq!(a.copied(), None);
    }
}
