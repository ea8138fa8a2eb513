pub mod core;

#[cfg(feature = "compiled_data")]
mod compiled;

#[cfg(feature = "compiled_data")]
use crate::tzdb::CompiledTzdbProvider;
#[cfg(feature = "compiled_data")]
use std::sync::LazyLock;

/// The process-wide provider over the bundled time zone data.
#[cfg(feature = "compiled_data")]
pub static TZ_PROVIDER: LazyLock<CompiledTzdbProvider> =
    LazyLock::new(CompiledTzdbProvider::default);
