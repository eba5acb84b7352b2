use std::io::Read;
use std::str::FromStr;

use anyhow::{Context, Result};
use cdn_origin_cloudfront::Oac;
use cdn_origin_core::CdnStatus;
use cdn_origin_reconcile::{filter_ingress_ref, get_deletions, plan, DistributionState};
use clap::{Parser, Subcommand, ValueEnum};
use k8s_openapi::api::networking::v1::Ingress;
use kube::CustomResourceExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "cdnoriginctl", version, about = "CDN origin controller offline tools")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, env = "CDN_ORIGIN_OUTPUT", default_value_t = Output::Human)]
    output: Output,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print current identifiers that are no longer desired
    Deletions {
        /// Desired identifiers, comma separated
        #[arg(long, value_delimiter = ',')]
        desired: Vec<String>,
        /// Current identifiers, comma separated (order is kept in the output)
        #[arg(long, value_delimiter = ',')]
        current: Vec<String>,
    },
    /// Drop one ingress from a CDNStatus manifest
    Filter {
        /// CDNStatus manifest (YAML or JSON); "-" reads stdin
        file: String,
        #[arg(long = "namespace", short = 'n', default_value = "")]
        namespace: String,
        #[arg(long)]
        name: String,
    },
    /// Build the origin access control request for an S3 origin
    Oac {
        /// Distribution name
        #[arg(long)]
        distribution: String,
        /// S3 origin host, e.g. my-bucket.s3.amazonaws.com
        #[arg(long)]
        origin: String,
    },
    /// Compute stale origins and behaviors from a desired/current snapshot
    Plan {
        /// YAML or JSON with `desired` and `current`; "-" reads stdin
        file: String,
    },
    /// Print the CDNStatus CustomResourceDefinition
    Crd,
}

/// Input document for `plan`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PlanInput {
    #[serde(default)]
    desired: DistributionState,
    #[serde(default)]
    current: DistributionState,
}

fn init_tracing() {
    let env = std::env::var("CDN_ORIGIN_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path))
}

fn parse_status(text: &str) -> Result<CdnStatus> {
    serde_yaml::from_str(text).context("parsing CDNStatus manifest")
}

fn parse_plan_input(text: &str) -> Result<PlanInput> {
    serde_yaml::from_str(text).context("parsing plan input")
}

/// Ingress carrying only the identity the filter looks at.
fn target_ingress(namespace: &str, name: &str) -> Ingress {
    let mut ing = Ingress::default();
    ing.metadata.name = Some(name.to_string());
    if !namespace.is_empty() {
        ing.metadata.namespace = Some(namespace.to_string());
    }
    ing
}

fn print_list(output: Output, items: &[String]) -> Result<()> {
    match output {
        Output::Human => {
            if items.is_empty() {
                println!("(none)");
            }
            for it in items {
                println!("{}", it);
            }
        }
        Output::Json => println!("{}", serde_json::to_string_pretty(items)?),
    }
    Ok(())
}

fn print_doc<T: Serialize>(output: Output, doc: &T) -> Result<()> {
    match output {
        Output::Human => print!("{}", serde_yaml::to_string(doc)?),
        Output::Json => println!("{}", serde_json::to_string_pretty(doc)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Deletions { desired, current } => {
            debug!(desired = desired.len(), current = current.len(), "deletions invoked");
            let out = get_deletions(&desired, &current);
            info!(count = out.len(), "stale identifiers");
            print_list(cli.output, &out)?;
        }
        Commands::Filter { file, namespace, name } => {
            let status = parse_status(&read_input(&file)?)?;
            let target = target_ingress(&namespace, &name);
            let before = status.ingresses().len();
            let filtered = filter_ingress_ref(&status, &target);
            info!(
                status = ?status.metadata.name,
                ns = %namespace,
                name = %name,
                removed = before - filtered.ingresses().len(),
                "filtered ingress ref"
            );
            print_doc(cli.output, &filtered)?;
        }
        Commands::Oac { distribution, origin } => {
            let oac = Oac::new(&distribution, &origin);
            debug!(name = %oac.name, "oac built");
            print_doc(cli.output, &oac)?;
        }
        Commands::Plan { file } => {
            let input = parse_plan_input(&read_input(&file)?)?;
            let p = plan(&input.desired, &input.current);
            if p.is_empty() {
                info!("distribution already matches desired state");
            }
            print_doc(cli.output, &p)?;
        }
        Commands::Crd => {
            print_doc(cli.output, &CdnStatus::crd())?;
        }
    }
    Ok(())
}
