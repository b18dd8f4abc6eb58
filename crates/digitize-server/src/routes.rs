// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request routing.

/// Prefix shared by every image endpoint.
pub const API_PREFIX: &str = "/digitize-api/images";

pub const PROCESS_IMAGE_PATH: &str = "/digitize-api/images/process-image";
pub const PROCESS_MULTIPLE_IMAGES_PATH: &str = "/digitize-api/images/process-multiple-images";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ProcessImage,
    ProcessMultipleImages,
    MethodNotAllowed,
    NotFound,
}

/// Resolve a method and path (without query string). A trailing slash is
/// tolerated.
pub fn resolve(method: &str, path: &str) -> Route {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    let route = match path {
        PROCESS_IMAGE_PATH => Route::ProcessImage,
        PROCESS_MULTIPLE_IMAGES_PATH => Route::ProcessMultipleImages,
        _ => return Route::NotFound,
    };

    if method == "POST" {
        route
    } else {
        Route::MethodNotAllowed
    }
}
