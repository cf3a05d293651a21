use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use dgw_crypto::{canonicalize, compute_commitment};
use dgw_ledger::AuditReader;
use dgw_sdk::{
    scopes, ChannelState, Document, Gateway, GatewayConfig, Hs256Verifier, PointerRecord,
    Principal, TokenVerifier, View,
};
use serde_json::Value;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let json = matches!(cli.format, OutputFormat::Json);
    match &cli.command {
        Command::Canon(args) => return cmd_canon(args, json),
        Command::Token(args) => return cmd_token(&cli, args, json),
        _ => {}
    }

    let gw = Gateway::open(&config(&cli)?)?;
    let principal = principal(&cli);
    match &cli.command {
        Command::Put(args) => cmd_put(&gw, &principal, args, json),
        Command::BuildManifest(args) => cmd_build_manifest(&gw, &principal, args, json),
        Command::Promote(args) => cmd_promote(&gw, &principal, args, json),
        Command::Show(args) => cmd_show(&gw, &principal, args, json),
        Command::Ref(args) => cmd_ref(&gw, &principal, args, json),
        Command::Manifest(args) => cmd_manifest(&gw, &principal, args),
        Command::Channel(args) => cmd_channel(&gw, &principal, args, json),
        Command::Verify(_) => cmd_verify(&gw, json),
        Command::Audit(args) => cmd_audit(&gw, args, json),
        Command::Canon(_) | Command::Token(_) => Ok(()),
    }
}

fn config(cli: &Cli) -> anyhow::Result<GatewayConfig> {
    let mut config = GatewayConfig::load_or_default(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config = config.with_store_root(root);
    }
    Ok(config)
}

/// The operator principal. Without `--scope`, every scope is granted.
fn principal(cli: &Cli) -> Principal {
    let granted: Vec<String> = if cli.scopes.is_empty() {
        [
            scopes::OBJECTS_READ,
            scopes::OBJECTS_WRITE,
            scopes::MANIFESTS_READ,
            scopes::MANIFESTS_WRITE,
            scopes::CHANNELS_PROMOTE,
        ]
        .into_iter()
        .map(String::from)
        .collect()
    } else {
        cli.scopes.clone()
    };
    let mut principal = Principal::new(cli.subject.clone(), granted);
    principal.purpose = cli.purpose.clone();
    principal
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_put(gw: &Gateway, principal: &Principal, args: &PutArgs, json: bool) -> anyhow::Result<()> {
    let document = Document::from_value(read_json(&args.path)?)?;
    let published = gw.publish(principal, &document, args.date.as_deref())?;
    if json {
        return print_json(&serde_json::json!({
            "hash": published.hash.to_string(),
            "ref": published.reference.key.relative_path(),
            "created": published.created,
        }));
    }
    println!("{} Wrote object {}", "✓".green().bold(), published.hash.to_string().yellow());
    let state = if published.created { "written" } else { "unchanged" };
    println!(
        "  Ref: {} ({})",
        published.reference.key.relative_path().display(),
        state.dimmed()
    );
    Ok(())
}

fn cmd_build_manifest(
    gw: &Gateway,
    principal: &Principal,
    args: &BuildManifestArgs,
    json: bool,
) -> anyhow::Result<()> {
    let manifest = gw.build_manifest(principal, &args.dataset, args.id.as_deref())?;
    if json {
        return print_json(&manifest);
    }
    println!(
        "{} Manifest {}/{}",
        "✓".green().bold(),
        manifest.dataset.bold(),
        manifest.manifest_id.yellow()
    );
    println!("  Entries: {}", manifest.entries.len());
    if let Some(hash) = manifest.integrity_hash() {
        println!("  Integrity: {}", hash.cyan());
    }
    for entry in &manifest.entries {
        println!(
            "  {} {:<12} {} {}",
            entry.kind.dimmed(),
            entry.logical_id,
            entry.date,
            entry.object.short_hex().dimmed()
        );
    }
    Ok(())
}

fn cmd_promote(
    gw: &Gateway,
    principal: &Principal,
    args: &PromoteArgs,
    json: bool,
) -> anyhow::Result<()> {
    let manifest = match (&args.manifest, &args.file) {
        (Some(id), None) => Value::String(id.clone()),
        (None, Some(path)) => read_json(path)?,
        _ => bail!("give either a manifest id or --file"),
    };
    let outcome = gw.promote(principal, &args.dataset, &args.channel, manifest)?;
    if json {
        return print_json(&outcome.state);
    }
    let verb = if outcome.changed { "Promoted" } else { "Re-promoted" };
    println!(
        "{} {} {} to {}/{}",
        "✓".green().bold(),
        verb,
        outcome.record.manifest_id.yellow(),
        args.dataset.bold(),
        args.channel.bold()
    );
    println!("  Etag: {}", outcome.record.etag.cyan());
    println!("  History: {} earlier promotion(s)", outcome.state.history.len());
    Ok(())
}

fn cmd_show(gw: &Gateway, principal: &Principal, args: &ShowArgs, json: bool) -> anyhow::Result<()> {
    let view = args.view.as_deref().map(str::parse::<View>).transpose()?;
    let fields: Vec<&str> = args
        .fields
        .as_deref()
        .map(|f| f.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    let resp = gw.get_object(principal, &args.hash, view, fields.as_slice())?;
    if !json {
        eprintln!(
            "{} view={} etag={}",
            resp.hash.to_string().yellow(),
            resp.view,
            resp.etag.as_deref().unwrap_or("-")
        );
    }
    print_json(&resp.document)
}

fn cmd_ref(gw: &Gateway, principal: &Principal, args: &RefArgs, json: bool) -> anyhow::Result<()> {
    let reference = gw.get_ref(principal, &args.namespace, &args.logical_id, &args.date)?;
    if json {
        return print_json(&reference.record());
    }
    println!("{} -> {}", reference.key, reference.object.to_string().yellow());
    Ok(())
}

fn cmd_manifest(gw: &Gateway, principal: &Principal, args: &ManifestArgs) -> anyhow::Result<()> {
    let manifest = gw.get_manifest(principal, &args.dataset, &args.id)?;
    print_json(&manifest)
}

fn print_record(label: &str, record: &PointerRecord) {
    println!(
        "  {} {} etag={} by={} at={} ({:?})",
        label,
        record.manifest_id.yellow(),
        record.etag.cyan(),
        record.promoted_by,
        record.promoted_at.as_deref().unwrap_or("-"),
        record.origin
    );
}

fn cmd_channel(
    gw: &Gateway,
    principal: &Principal,
    args: &ChannelArgs,
    json: bool,
) -> anyhow::Result<()> {
    let (Some(dataset), Some(channel)) = (&args.dataset, &args.channel) else {
        let pairs: Vec<(String, String)> = gw
            .channels()
            .list()?
            .into_iter()
            .filter(|(ds, _)| args.dataset.as_ref().map_or(true, |want| want == ds))
            .collect();
        if json {
            return print_json(&pairs);
        }
        if pairs.is_empty() {
            println!("No channels.");
        }
        for (ds, ch) in pairs {
            println!("{}/{}", ds.bold(), ch);
        }
        return Ok(());
    };

    let state: ChannelState = gw.channel(principal, dataset, channel)?;
    if json {
        return print_json(&state);
    }
    println!("{}/{}", dataset.bold(), channel.bold());
    match state.current_record() {
        Some(current) => print_record("current", &current),
        None => println!("  current: -"),
    }
    for (i, record) in state.history.iter().enumerate().rev() {
        print_record(&format!("history[{i}]"), record);
    }
    Ok(())
}

fn cmd_verify(gw: &Gateway, json: bool) -> anyhow::Result<()> {
    let report = gw.verify_repository()?;
    if json {
        print_json(&report)?;
    } else {
        for defect in &report.defects {
            println!(
                "[{}] {}: {}",
                defect.kind.to_string().to_uppercase().red(),
                defect.location,
                defect.detail
            );
        }
        if report.is_ok() {
            println!(
                "{} Validation OK: {} objects, {} refs",
                "✓".green().bold(),
                report.objects,
                report.refs
            );
        }
    }
    if !report.is_ok() {
        bail!("validation failed: {} defect(s)", report.defects.len());
    }
    Ok(())
}

fn cmd_audit(gw: &Gateway, args: &AuditArgs, json: bool) -> anyhow::Result<()> {
    let entries = gw.ledger().tail(args.limit)?;
    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("Audit trail: no entries.");
    }
    for entry in entries {
        let detail = serde_json::to_value(&entry.event)?;
        let fields: Vec<String> = detail
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(k, _)| k.as_str() != "event")
            .map(|(k, v)| match v {
                Value::String(s) => format!("{k}={s}"),
                other => format!("{k}={other}"),
            })
            .collect();
        println!(
            "{} {:<16} {:<18} {}",
            entry.ts.dimmed(),
            entry.sub.as_deref().unwrap_or("-"),
            entry.event.name().yellow(),
            fields.join(" ")
        );
    }
    Ok(())
}

fn cmd_canon(args: &CanonArgs, json: bool) -> anyhow::Result<()> {
    let value = read_json(&args.path)?;
    let hash = compute_commitment(&value)?;
    let canonical = String::from_utf8(canonicalize(&value))?;
    if json {
        return print_json(&serde_json::json!({
            "hash": hash.to_string(),
            "canonical": canonical,
        }));
    }
    println!("{canonical}");
    eprintln!("Hash: {}", hash.to_string().yellow());
    Ok(())
}

fn cmd_token(cli: &Cli, args: &TokenArgs, json: bool) -> anyhow::Result<()> {
    let config = config(cli)?;
    let verifier = Hs256Verifier::from_config(&config.auth);
    let principal = if args.token.starts_with("Bearer ") {
        verifier.authenticate(&args.token)?
    } else {
        verifier.verify(&args.token)?
    };
    if json {
        return print_json(&principal);
    }
    println!("{} {}", "✓".green().bold(), principal.subject.bold());
    let granted: Vec<&str> = principal.scopes.iter().map(String::as_str).collect();
    println!("  Scopes: {}", granted.join(" "));
    println!("  Purpose: {}", principal.purpose.as_deref().unwrap_or("-"));
    Ok(())
}
