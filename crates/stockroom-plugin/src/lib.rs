// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Import plugin registry and descriptors.
//!
//! Import sources are compiled into the binary and registered once at
//! startup. Configuration can administratively disable a plugin with a
//! reason, which the search and import paths surface to callers.

pub mod descriptor;
pub mod registry;

pub use descriptor::PluginDescriptor;
pub use registry::{PluginEntry, PluginRegistry, PluginStatus};
