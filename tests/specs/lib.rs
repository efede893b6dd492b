// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Placeholder library target: the spec tests are wired as `[[test]]`
//! entries in the sendq CLI crate and share helpers via `cli/common.rs`.
