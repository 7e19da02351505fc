//! ibx-provider CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use ibx_common::{IpamResult, ObjectRef};
use serde::Serialize;

use crate::manifest::{Manifest, ResourceSpec};
use crate::memory::{ConnectorCall, MemoryConnector};
use crate::network_container::{AllocationMode, NetworkContainerConfig};
use crate::provider::{IPV4_NETWORK_CONTAINER, Provider};
use crate::resource_data::ResourceState;

/// ibx-provider - IPAM network container resources
#[derive(Parser)]
#[command(name = "ibx-provider")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Provider commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show the options a resource type recognizes
    Schema {
        /// Resource type
        #[arg(long = "type", default_value = IPV4_NETWORK_CONTAINER)]
        resource_type: String,

        /// Format output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check resources in a manifest without contacting the API
    Validate {
        /// Path to the manifest (YAML, JSON or TOML)
        #[arg(env = "IBX_MANIFEST")]
        file: PathBuf,
    },

    /// Show the API calls creating each resource would issue
    Plan {
        /// Path to the manifest (YAML, JSON or TOML)
        #[arg(env = "IBX_MANIFEST")]
        file: PathBuf,

        /// Format output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Planned calls for one resource.
#[derive(Debug, Serialize)]
struct PlanEntry {
    name: String,
    #[serde(rename = "type")]
    resource_type: String,
    calls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn mode_label(mode: AllocationMode) -> String {
    match mode {
        AllocationMode::Direct => "direct create".to_string(),
        AllocationMode::FromParent { prefix_len } => {
            format!("allocate /{prefix_len} from parent")
        }
    }
}

fn describe(call: &ConnectorCall) -> String {
    let action = match call {
        ConnectorCall::Create { request, .. } => format!(
            "create {} in network view '{}' ({})",
            request.cidr, request.network_view, request.family
        ),
        ConnectorCall::Lookup {
            network_view,
            cidr,
            family,
            ..
        } => format!("lookup parent {cidr} in network view '{network_view}' ({family})"),
        ConnectorCall::Allocate { request, .. } => format!(
            "allocate /{} from {} in network view '{}' ({})",
            request.prefix_len, request.parent_cidr, request.network_view, request.family
        ),
        ConnectorCall::Fetch { reference, .. } => format!("fetch {reference}"),
        ConnectorCall::Update { reference, .. } => format!("update {reference}"),
        ConnectorCall::Delete { reference, .. } => format!("delete {reference}"),
    };
    let tenant = &call.scope().tenant_id;
    if tenant.is_empty() {
        action
    } else {
        format!("{action} [tenant {tenant}]")
    }
}

fn check_resource(provider: &Provider, spec: &ResourceSpec) -> IpamResult<AllocationMode> {
    let schema = provider.schema(&spec.resource_type)?;
    let state = ResourceState::new(&schema, &spec.config)?;
    let config = NetworkContainerConfig::from_resource_data(&state);
    let (_, mode) = config.validate_for_create()?;
    Ok(mode)
}

async fn plan_resource(
    provider: &Provider,
    connector: &MemoryConnector,
    spec: &ResourceSpec,
) -> IpamResult<ObjectRef> {
    let resource = provider.resource(&spec.resource_type)?;
    let schema = provider.schema(&spec.resource_type)?;
    let mut state = ResourceState::new(&schema, &spec.config)?;
    resource.create(connector, &mut state).await
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let provider = Provider::new();

        match self.command {
            Commands::Schema {
                resource_type,
                json,
            } => {
                let schema = provider.schema(&resource_type)?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&schema)?);
                } else {
                    println!("Resource: {resource_type}");
                    for (name, attribute) in &schema.attributes {
                        let presence = if attribute.required {
                            "required"
                        } else {
                            "optional"
                        };
                        let default = attribute
                            .default
                            .as_ref()
                            .map(|d| format!(" (default {d})"))
                            .unwrap_or_default();
                        println!("  {name}: {:?}, {presence}{default}", attribute.kind);
                        println!("      {}", attribute.description);
                    }
                }

                Ok(())
            }

            Commands::Validate { file } => {
                tracing::info!(file = %file.display(), "Validating manifest");

                let manifest = Manifest::from_file(&file)?;
                let mut failures = 0usize;

                for spec in &manifest.resources {
                    match check_resource(&provider, spec) {
                        Ok(mode) => println!("{}: ok ({})", spec.name, mode_label(mode)),
                        Err(e) => {
                            failures += 1;
                            eprintln!("{}: {:?}", spec.name, miette::Report::new(e));
                        }
                    }
                }

                if failures > 0 {
                    return Err(eyre!(
                        "{failures} of {} resource(s) failed validation",
                        manifest.resources.len()
                    ));
                }
                println!("{} resource(s) valid", manifest.resources.len());
                Ok(())
            }

            Commands::Plan { file, json } => {
                tracing::info!(file = %file.display(), "Planning manifest");

                let manifest = Manifest::from_file(&file)?;
                let connector = MemoryConnector::dry_run();
                let mut entries = Vec::with_capacity(manifest.resources.len());

                for spec in &manifest.resources {
                    connector.clear_calls();
                    let outcome = plan_resource(&provider, &connector, spec).await;

                    entries.push(PlanEntry {
                        name: spec.name.clone(),
                        resource_type: spec.resource_type.clone(),
                        calls: connector.calls().iter().map(describe).collect(),
                        error: outcome.err().map(|e| e.to_string()),
                    });
                }

                if json {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                } else {
                    for entry in &entries {
                        println!("{} ({}):", entry.name, entry.resource_type);
                        for call in &entry.calls {
                            println!("  - {call}");
                        }
                        if let Some(error) = &entry.error {
                            println!("  ! {error}");
                        }
                    }
                }

                let failures = entries.iter().filter(|e| e.error.is_some()).count();
                if failures > 0 {
                    return Err(eyre!(
                        "{failures} of {} resource(s) cannot be planned",
                        entries.len()
                    ));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(config: serde_json::Value) -> ResourceSpec {
        ResourceSpec {
            name: "core".to_string(),
            resource_type: IPV4_NETWORK_CONTAINER.to_string(),
            config,
        }
    }

    #[test]
    fn check_resource_reports_mode() {
        let provider = Provider::new();
        let mode = check_resource(
            &provider,
            &spec(json!({
                "network_view": "default",
                "parent_cidr": "10.0.0.0/16",
                "cidr": "",
                "allocate_prefix_len": 24
            })),
        )
        .unwrap();
        assert_eq!(mode, AllocationMode::FromParent { prefix_len: 24 });
        assert_eq!(mode_label(mode), "allocate /24 from parent");
    }

    #[test]
    fn check_resource_rejects_prefix_one() {
        let provider = Provider::new();
        let err = check_resource(
            &provider,
            &spec(json!({
                "network_view": "default",
                "cidr": "10.0.0.0/24",
                "allocate_prefix_len": 1
            })),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "prefixLen is less than 2");
    }

    #[test]
    fn cli_parses_plan() {
        let cli = Cli::try_parse_from(["ibx-provider", "plan", "nc.yaml", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Plan { json: true, .. }));
    }
}
