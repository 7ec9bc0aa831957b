//! Protocol endpoints
//!
//! Each endpoint runs the same pipeline: extract labels, match a Group,
//! load its Profile where needed, render, validate, serve. Any failure
//! along the way is logged and answered with the same plain 404.

pub mod cloud;
pub mod grub;
pub mod ignition;
pub mod ipxe;
pub mod metadata;
pub mod pixiecore;

use crate::labels::RequestLabels;
use crate::render::RenderError;
use crate::store::StoreError;
use crate::AppState;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, MethodRouter};
use netboot_artifact::{Artifact, ArtifactError, ArtifactKind};
use netboot_crd::{Group, MachineLabels, Profile};
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const NOT_FOUND_BODY: &str = "404 page not found\n";

/// The only failure response the server sends
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}

/// Fallback for unknown paths
pub async fn fallback() -> Response {
    not_found()
}

/// Why a request could not be served
#[derive(Debug, Error)]
pub enum BootError {
    #[error("no group matches the request labels")]
    NoGroupMatch,

    #[error("group {group} references missing profile {profile}")]
    ProfileNotFound { group: String, profile: String },

    #[error("profile {profile} has no {kind} template")]
    NoTemplate {
        profile: String,
        kind: ArtifactKind,
    },

    #[error("invalid mac address: {0}")]
    InvalidMac(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("invalid {kind}: {source}")]
    Invalid {
        kind: ArtifactKind,
        #[source]
        source: ArtifactError,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl BootError {
    pub fn invalid(kind: ArtifactKind) -> impl FnOnce(ArtifactError) -> BootError {
        move |source| BootError::Invalid { kind, source }
    }

    /// Log at a level matching how unexpected the failure is
    fn log(&self, labels: &MachineLabels) {
        match self {
            BootError::NoGroupMatch | BootError::InvalidMac(_) => {
                info!(labels = %labels, "{}", self)
            }
            BootError::ProfileNotFound { .. }
            | BootError::NoTemplate { .. }
            | BootError::Render(RenderError::TemplateNotFound { .. }) => {
                warn!(labels = %labels, "{}", self)
            }
            BootError::Render(_) | BootError::Invalid { .. } | BootError::Store(_) => {
                error!(labels = %labels, error = %self, "Failed to serve artifact")
            }
        }
    }
}

/// Turn a pipeline result into a response
pub(crate) fn respond(request: &RequestLabels, result: Result<Artifact, BootError>) -> Response {
    match result {
        Ok(artifact) => {
            debug!(kind = %artifact.kind(), labels = %request.labels, "Serving artifact");
            (
                [(header::CONTENT_TYPE, artifact.content_type())],
                artifact.into_bytes(),
            )
                .into_response()
        }
        Err(e) => {
            e.log(&request.labels);
            not_found()
        }
    }
}

/// The Group matching a request
pub(crate) async fn match_group(
    state: &AppState,
    request: &RequestLabels,
) -> Result<Group, BootError> {
    state
        .resolver
        .resolve_group(&request.labels)
        .await?
        .ok_or(BootError::NoGroupMatch)
}

/// The Group matching a request and the Profile it references
pub(crate) async fn match_profile(
    state: &AppState,
    request: &RequestLabels,
) -> Result<(Group, Profile), BootError> {
    let group = match_group(state, request).await?;
    let profile = state
        .resolver
        .load_profile(&group.profile)
        .await?
        .ok_or_else(|| BootError::ProfileNotFound {
            group: group.id.clone(),
            profile: group.profile.clone(),
        })?;
    Ok((group, profile))
}

/// Every unsigned endpoint the server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Grub,
    BootIpxe,
    BootIpxe0,
    Ipxe,
    Pixiecore,
    Ignition,
    Cloud,
    Metadata,
}

impl Endpoint {
    pub const ALL: [Endpoint; 8] = [
        Endpoint::Grub,
        Endpoint::BootIpxe,
        Endpoint::BootIpxe0,
        Endpoint::Ipxe,
        Endpoint::Pixiecore,
        Endpoint::Ignition,
        Endpoint::Cloud,
        Endpoint::Metadata,
    ];

    /// Route path, with a signature suffix for signed variants
    pub fn path(&self, suffix: &str) -> String {
        match self {
            Endpoint::Grub => format!("/grub{}", suffix),
            Endpoint::BootIpxe => format!("/boot.ipxe{}", suffix),
            Endpoint::BootIpxe0 => format!("/boot.ipxe.0{}", suffix),
            Endpoint::Ipxe => format!("/ipxe{}", suffix),
            Endpoint::Pixiecore => format!("/pixiecore/v1/boot{}/{{mac}}", suffix),
            Endpoint::Ignition => format!("/ignition{}", suffix),
            Endpoint::Cloud => format!("/cloud{}", suffix),
            Endpoint::Metadata => format!("/metadata{}", suffix),
        }
    }

    pub fn handler(&self) -> MethodRouter<AppState> {
        match self {
            Endpoint::Grub => get(grub::grub),
            Endpoint::BootIpxe | Endpoint::BootIpxe0 => get(ipxe::inspect),
            Endpoint::Ipxe => get(ipxe::boot),
            Endpoint::Pixiecore => get(pixiecore::boot),
            Endpoint::Ignition => get(ignition::ignition),
            Endpoint::Cloud => get(cloud::cloud),
            Endpoint::Metadata => get(metadata::metadata),
        }
    }
}
