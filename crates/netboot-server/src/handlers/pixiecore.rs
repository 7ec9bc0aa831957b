//! Pixiecore API endpoint
//!
//! Pixiecore identifies a machine only by the MAC in the path. That MAC is
//! added to the labels unless the query already names one.

use super::{match_profile, respond, BootError};
use crate::labels::RequestLabels;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::Response;
use netboot_artifact::{Artifact, ArtifactError, ArtifactKind, RenderedArtifact};
use netboot_crd::{parse_mac, MAC_LABEL};
use netboot_script::PixiecoreBoot;

/// `GET /pixiecore/v1/boot/{mac}`
pub async fn boot(
    State(state): State<AppState>,
    Path(mac): Path<String>,
    mut request: RequestLabels,
) -> Response {
    let result = render(&state, &mac, &mut request).await;
    respond(&request, result)
}

async fn render(
    state: &AppState,
    mac: &str,
    request: &mut RequestLabels,
) -> Result<Artifact, BootError> {
    let mac = parse_mac(mac).map_err(|_| BootError::InvalidMac(mac.to_string()))?;
    request.infer(MAC_LABEL, mac);

    let (_, profile) = match_profile(state, request).await?;

    let invalid = BootError::invalid(ArtifactKind::Pixiecore);
    let document = PixiecoreBoot::from_boot(&profile.boot);
    if let Err(e) = document.validate() {
        return Err(invalid(ArtifactError::Script(e)));
    }
    let content = match serde_json::to_string(&document) {
        Ok(content) => content,
        Err(e) => return Err(invalid(ArtifactError::Json(e))),
    };

    RenderedArtifact::new(ArtifactKind::Pixiecore, content)
        .validate()
        .map_err(invalid)
}
