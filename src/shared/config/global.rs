use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::shared::config::model::{Settings, load_settings};

pub static CONFIG: Lazy<Arc<Settings>> = Lazy::new(|| {
    Arc::new(load_settings().unwrap_or_else(|e| {
        tracing::warn!(target: "bucket_agg::config", error = %e, "Falling back to default settings");
        Settings::default()
    }))
});
