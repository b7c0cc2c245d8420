// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: the backend gateway, background jobs, and image decoding.

pub mod gateway;
pub mod jobs;
pub mod media;
