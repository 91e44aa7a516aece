use anyhow::{Context, Result, bail};
use tracing::info;

use drill_cli::script::parse_script;
use drill_cli::session::Session;
use drill_core::NavigatorConfig;
use drill_model::{FilterPatch, Filters, ScopeRef};

use crate::cli::{Cli, DecodeArgs, EncodeArgs, OutputFormatArg, ReplayArgs};
use crate::summary::{print_decode, print_encode, print_replay};

/// Build the session from global flags and the optional config file.
pub fn session_from_cli(cli: &Cli) -> Result<Session> {
    let config = match &cli.config {
        Some(path) => NavigatorConfig::load_from(path)
            .with_context(|| format!("load navigator config {}", path.display()))?,
        None => NavigatorConfig::default(),
    };
    let root = ScopeRef::new(
        cli.root.root_level,
        cli.root.root_id.clone(),
        cli.root.root_label.clone(),
    );
    if root.id.trim().is_empty() {
        bail!("--root-id must not be empty");
    }
    Ok(Session::new(
        root,
        Filters::new(cli.root.default_metric.clone()),
        config,
    ))
}

pub fn run_decode(session: &Session, args: &DecodeArgs, format: OutputFormatArg) -> Result<()> {
    let report = session.decode(&args.query);
    match format {
        OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormatArg::Table => print_decode(&report),
    }
    Ok(())
}

pub fn run_encode(session: &Session, args: &EncodeArgs, format: OutputFormatArg) -> Result<()> {
    if args.levels.len() != args.ids.len() {
        bail!(
            "got {} --level and {} --id values; they pair by position",
            args.levels.len(),
            args.ids.len()
        );
    }
    if args.labels.len() > args.ids.len() {
        bail!("more --label values than scopes");
    }
    let scopes = args
        .levels
        .iter()
        .zip(&args.ids)
        .enumerate()
        .map(|(index, (level, id))| {
            let label = args.labels.get(index).unwrap_or(id);
            ScopeRef::new(*level, id.clone(), label.clone())
        })
        .collect();
    let report = session.encode(scopes, &patch_from_args(args));
    match format {
        OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormatArg::Table => print_encode(&report),
    }
    Ok(())
}

pub fn run_replay(session: &Session, args: &ReplayArgs, format: OutputFormatArg) -> Result<()> {
    let source = std::fs::read_to_string(&args.script)
        .with_context(|| format!("read script {}", args.script.display()))?;
    let steps = parse_script(&source)
        .with_context(|| format!("parse script {}", args.script.display()))?;
    info!(steps = steps.len(), "replaying script");
    let report = session.replay(&args.initial, &steps);
    match format {
        OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormatArg::Table => print_replay(&report, !args.quiet_steps),
    }
    Ok(())
}

fn patch_from_args(args: &EncodeArgs) -> FilterPatch {
    FilterPatch {
        metric: args.metric.clone(),
        range: args.range,
        view_mode: args.view,
        overlay: args
            .overlay
            .as_ref()
            .map(|overlay| (!overlay.is_empty()).then(|| overlay.clone())),
    }
}
