//! Metadata endpoint
//!
//! Serves the matched Group's metadata merged with the request labels as
//! `KEY=value` lines. No Profile is involved.

use super::{match_group, respond, BootError};
use crate::labels::RequestLabels;
use crate::render::RenderContext;
use crate::AppState;
use axum::extract::State;
use axum::response::Response;
use netboot_artifact::{render_metadata, Artifact, ArtifactKind, RenderedArtifact};

/// `GET /metadata`
pub async fn metadata(State(state): State<AppState>, request: RequestLabels) -> Response {
    let result = render(&state, &request).await;
    respond(&request, result)
}

async fn render(state: &AppState, request: &RequestLabels) -> Result<Artifact, BootError> {
    let group = match_group(state, request).await?;
    let ctx = RenderContext::build(&group, None, request);

    RenderedArtifact::new(ArtifactKind::Metadata, render_metadata(ctx.variables()))
        .validate()
        .map_err(BootError::invalid(ArtifactKind::Metadata))
}
