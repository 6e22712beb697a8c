//! Subcommand implementations.

/// Language listing.
pub mod languages;

/// Provider listing.
pub mod providers;

/// Foreground gateway.
pub mod serve;

/// Document translation.
pub mod translate;
