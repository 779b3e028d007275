use std::cell::OnceCell;

use crate::error::{Error, Result};

/// A client connected on first use. The first attempt decides: a failure is
/// kept and reported on every later call without reconnecting.
pub struct OnceConnection<T> {
    cell: OnceCell<std::result::Result<T, String>>,
}

impl<T> Default for OnceConnection<T> {
    fn default() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }
}

impl<T> OnceConnection<T> {
    pub fn get_or_connect(
        &self,
        connect: impl FnOnce() -> std::result::Result<T, String>,
    ) -> Result<&T> {
        let attempt = self.cell.get_or_init(|| {
            let attempt = connect();
            if let Err(reason) = &attempt {
                tracing::error!("UI Automation unavailable for this session: {reason}");
            }
            attempt
        });
        attempt
            .as_ref()
            .map_err(|reason| Error::Accessibility(reason.clone()))
    }
}
