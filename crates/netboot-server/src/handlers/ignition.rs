//! Ignition endpoint

use super::{match_profile, respond, BootError};
use crate::labels::RequestLabels;
use crate::render::{RenderContext, TemplateRef};
use crate::AppState;
use axum::extract::State;
use axum::response::Response;
use netboot_artifact::{Artifact, ArtifactKind, RenderedArtifact};

/// `GET /ignition`
pub async fn ignition(State(state): State<AppState>, request: RequestLabels) -> Response {
    let result = render(&state, &request).await;
    respond(&request, result)
}

async fn render(state: &AppState, request: &RequestLabels) -> Result<Artifact, BootError> {
    let (group, profile) = match_profile(state, request).await?;
    let id = profile.ignition_id.as_deref().ok_or_else(|| BootError::NoTemplate {
        profile: profile.id.clone(),
        kind: ArtifactKind::Ignition,
    })?;

    let ctx = RenderContext::build(&group, Some(&profile), request);
    let content = state.renderer.render(TemplateRef::Ignition(id), &ctx).await?;

    RenderedArtifact::new(ArtifactKind::Ignition, content)
        .validate()
        .map_err(BootError::invalid(ArtifactKind::Ignition))
}
