//! iPXE endpoints
//!
//! `/boot.ipxe` (and `/boot.ipxe.0`, the name some firmware asks for)
//! serves the inspect script to unidentified machines. The script chains to
//! `/ipxe` with the machine's labels, which serves the Profile boot script.

use super::{match_profile, respond, BootError};
use crate::labels::RequestLabels;
use crate::render::{RenderContext, TemplateRef, IPXE_TEMPLATE_NAME};
use crate::AppState;
use axum::extract::State;
use axum::response::Response;
use netboot_artifact::{Artifact, ArtifactKind, RenderedArtifact};
use netboot_script::{inspect_script, IPXE_BOOT_TEMPLATE};

/// `GET /boot.ipxe`, independent of any Group or Profile
pub async fn inspect(request: RequestLabels) -> Response {
    let result = RenderedArtifact::new(ArtifactKind::Ipxe, inspect_script())
        .validate()
        .map_err(BootError::invalid(ArtifactKind::Ipxe));
    respond(&request, result)
}

/// `GET /ipxe`
pub async fn boot(State(state): State<AppState>, request: RequestLabels) -> Response {
    let result = render(&state, &request).await;
    respond(&request, result)
}

async fn render(state: &AppState, request: &RequestLabels) -> Result<Artifact, BootError> {
    let (group, profile) = match_profile(state, request).await?;
    let ctx = RenderContext::build(&group, Some(&profile), request);

    let template = match profile.ipxe_template.as_deref() {
        Some(id) => TemplateRef::Boot(id),
        None => TemplateRef::Builtin {
            name: IPXE_TEMPLATE_NAME,
            source: IPXE_BOOT_TEMPLATE,
        },
    };
    let content = state.renderer.render(template, &ctx).await?;

    RenderedArtifact::new(ArtifactKind::Ipxe, content)
        .validate()
        .map_err(BootError::invalid(ArtifactKind::Ipxe))
}
