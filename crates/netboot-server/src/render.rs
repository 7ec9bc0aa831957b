//! Template rendering
//!
//! Templates are Jinja syntax rendered with minijinja. Undefined variables
//! are an error, never an empty string, and output is not HTML-escaped.
//!
//! Variables visible to a template, later entries overriding earlier ones:
//!
//! 1. Profile metadata
//! 2. Group metadata
//! 3. Request labels
//!
//! plus the reserved keys `selector`, `request` (`query`, `raw_query`) and
//! `profile` (`id`, `name`, `boot`), which nothing can override.

use crate::labels::RequestLabels;
use crate::store::{Store, StoreError};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use netboot_crd::{Group, Profile};
use serde_json::{json, Map, Value};
use std::borrow::Cow;
use std::sync::Arc;
use thiserror::Error;

/// Name the built-in iPXE boot script renders under
pub const IPXE_TEMPLATE_NAME: &str = "boot.ipxe";

/// Name the built-in GRUB menu renders under
pub const GRUB_TEMPLATE_NAME: &str = "grub.cfg";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{kind} template not found: {id}")]
    TemplateNotFound { kind: &'static str, id: String },

    #[error("failed to render {name}: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Variables a template is rendered with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    variables: Map<String, Value>,
    reserved: Map<String, Value>,
}

impl RenderContext {
    /// Context for a request matched to `group` (and its Profile, if loaded)
    pub fn build(group: &Group, profile: Option<&Profile>, request: &RequestLabels) -> Self {
        let mut variables = Map::new();
        if let Some(profile) = profile {
            variables.extend(profile.metadata.clone());
        }
        variables.extend(group.metadata.clone());
        for (key, value) in request.labels.iter() {
            variables.insert(key.to_string(), Value::String(value.to_string()));
        }

        let mut reserved = Map::new();
        reserved.insert("selector".to_string(), json!(group.selector));
        reserved.insert(
            "request".to_string(),
            json!({
                "query": request.labels,
                "raw_query": request.raw_query,
            }),
        );
        if let Some(profile) = profile {
            reserved.insert(
                "profile".to_string(),
                json!({
                    "id": profile.id,
                    "name": profile.name,
                    "boot": {
                        "kernel": profile.boot.kernel,
                        "initrd": profile.boot.initrd,
                        "args": profile.boot.args,
                        "cmdline": profile.boot.cmdline(),
                    },
                }),
            );
        }

        Self {
            variables,
            reserved,
        }
    }

    /// Metadata and labels, without the reserved keys
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// Everything a template can see
    pub fn merged(&self) -> Map<String, Value> {
        let mut merged = self.variables.clone();
        merged.extend(self.reserved.clone());
        merged
    }

    /// Look up a top-level variable
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.reserved.get(key).or_else(|| self.variables.get(key))
    }
}

/// Where a template's source comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRef<'a> {
    /// Compiled into the server
    Builtin {
        name: &'static str,
        source: &'static str,
    },
    /// Store boot script template
    Boot(&'a str),
    /// Store Ignition template
    Ignition(&'a str),
    /// Store cloud-config template
    CloudConfig(&'a str),
}

/// Renders templates with strict undefined handling
pub struct TemplateRenderer {
    env: Environment<'static>,
    store: Arc<dyn Store>,
}

impl TemplateRenderer {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        Self { env, store }
    }

    /// Fetch a template and render it
    pub async fn render(
        &self,
        template: TemplateRef<'_>,
        ctx: &RenderContext,
    ) -> Result<String, RenderError> {
        let (name, source): (&str, Cow<'static, str>) = match template {
            TemplateRef::Builtin { name, source } => (name, Cow::Borrowed(source)),
            TemplateRef::Boot(id) => {
                let source = self.store.get_template(id).await?;
                (id, Cow::Owned(Self::found("boot", id, source)?))
            }
            TemplateRef::Ignition(id) => {
                let source = self.store.get_ignition(id).await?;
                (id, Cow::Owned(Self::found("ignition", id, source)?))
            }
            TemplateRef::CloudConfig(id) => {
                let source = self.store.get_cloud_config(id).await?;
                (id, Cow::Owned(Self::found("cloud-config", id, source)?))
            }
        };

        self.render_str(name, &source, ctx)
    }

    /// Render template source directly
    pub fn render_str(
        &self,
        name: &str,
        source: &str,
        ctx: &RenderContext,
    ) -> Result<String, RenderError> {
        self.env
            .render_named_str(name, source, ctx.merged())
            .map_err(|source| RenderError::Template {
                name: name.to_string(),
                source,
            })
    }

    fn found(kind: &'static str, id: &str, source: Option<String>) -> Result<String, RenderError> {
        source.ok_or_else(|| RenderError::TemplateNotFound {
            kind,
            id: id.to_string(),
        })
    }
}
