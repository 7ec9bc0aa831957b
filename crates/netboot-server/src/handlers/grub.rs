//! GRUB config endpoint

use super::{match_profile, respond, BootError};
use crate::labels::RequestLabels;
use crate::render::{RenderContext, TemplateRef, GRUB_TEMPLATE_NAME};
use crate::AppState;
use axum::extract::State;
use axum::response::Response;
use netboot_artifact::{Artifact, ArtifactKind, RenderedArtifact};
use netboot_script::GRUB_TEMPLATE;

/// `GET /grub`
pub async fn grub(State(state): State<AppState>, request: RequestLabels) -> Response {
    let result = render(&state, &request).await;
    respond(&request, result)
}

async fn render(state: &AppState, request: &RequestLabels) -> Result<Artifact, BootError> {
    let (group, profile) = match_profile(state, request).await?;
    let ctx = RenderContext::build(&group, Some(&profile), request);

    let template = match profile.grub_template.as_deref() {
        Some(id) => TemplateRef::Boot(id),
        None => TemplateRef::Builtin {
            name: GRUB_TEMPLATE_NAME,
            source: GRUB_TEMPLATE,
        },
    };
    let content = state.renderer.render(template, &ctx).await?;

    RenderedArtifact::new(ArtifactKind::Grub, content)
        .validate()
        .map_err(BootError::invalid(ArtifactKind::Grub))
}
