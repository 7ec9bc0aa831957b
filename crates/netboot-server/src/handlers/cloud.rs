//! Cloud-config endpoint

use super::{match_profile, respond, BootError};
use crate::labels::RequestLabels;
use crate::render::{RenderContext, TemplateRef};
use crate::AppState;
use axum::extract::State;
use axum::response::Response;
use netboot_artifact::{Artifact, ArtifactKind, RenderedArtifact};

/// `GET /cloud`
pub async fn cloud(State(state): State<AppState>, request: RequestLabels) -> Response {
    let result = render(&state, &request).await;
    respond(&request, result)
}

async fn render(state: &AppState, request: &RequestLabels) -> Result<Artifact, BootError> {
    let (group, profile) = match_profile(state, request).await?;
    let id = profile.cloud_id.as_deref().ok_or_else(|| BootError::NoTemplate {
        profile: profile.id.clone(),
        kind: ArtifactKind::CloudConfig,
    })?;

    let ctx = RenderContext::build(&group, Some(&profile), request);
    let content = state.renderer.render(TemplateRef::CloudConfig(id), &ctx).await?;

    RenderedArtifact::new(ArtifactKind::CloudConfig, content)
        .validate()
        .map_err(BootError::invalid(ArtifactKind::CloudConfig))
}
