// SPDX-FileCopyrightText: 2026 Stockroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the import pipeline's records.

pub mod assets;
pub mod attachments;
pub mod attributes;
pub mod categories;
