use colored::Colorize;
use flexinfra_cloud::Infra;
use flexinfra_core::parse_manifest_file;
use std::path::Path;

pub async fn handle(config: Option<&Path>, yes: bool, deploy: bool) -> anyhow::Result<()> {
    let path = super::resolve_manifest(config)?;
    let manifest = parse_manifest_file(&path)?;

    println!("{}", "Provisioning plan".blue().bold());
    println!("  project: {}", manifest.name.cyan());
    for (name, settings) in &manifest.providers {
        println!(
            "  provider {}: network {} ({} subnet(s))",
            name.cyan(),
            settings.network.private_ip_range,
            settings.network.subnets.len()
        );
    }
    for decl in &manifest.servers {
        println!(
            "  server {}: {} / {} on {}",
            decl.server.name.cyan(),
            decl.server.size,
            decl.server.image,
            decl.provider
        );
    }
    for decl in &manifest.security_groups {
        println!(
            "  security-group {}: {} rule(s) on {}",
            decl.group.name.cyan(),
            decl.group.rules.len(),
            decl.provider
        );
    }

    if !yes {
        println!();
        println!(
            "{}",
            "Warning: provisioning creates real resources on your cloud accounts.".yellow()
        );
        println!("Run again with --yes to apply");
        return Ok(());
    }

    // Step 1: registration provisions each provider's base network
    println!();
    println!("{}", "Step 1/3: Registering providers...".yellow());
    let mut infra = Infra::new();
    for (name, settings) in &manifest.providers {
        let provider = super::build_provider(name, &manifest, settings)?;
        infra.register(name.clone(), provider, &settings.network).await?;
        println!("  ✓ {}", name.cyan());
    }

    // Step 2: security groups before the servers that may reference them
    println!();
    println!("{}", "Step 2/3: Provisioning security groups...".yellow());
    if manifest.security_groups.is_empty() {
        println!("  - none declared");
    }
    for decl in &manifest.security_groups {
        let handle = infra
            .provision_security_group(&decl.group, &decl.provider)
            .await?;
        println!("  ✓ {} (id {})", handle.name.cyan(), handle.id);
    }

    // Step 3: servers in declaration order
    println!();
    println!("{}", "Step 3/3: Provisioning servers...".yellow());
    if manifest.servers.is_empty() {
        println!("  - none declared");
    }
    for decl in &manifest.servers {
        let handle = infra.provision_server(&decl.server, &decl.provider).await?;
        println!(
            "  ✓ {} (id {}, {})",
            handle.name.cyan(),
            handle.id,
            handle.ip_address.as_deref().unwrap_or("ip pending")
        );
    }

    if deploy {
        println!();
        println!("{}", "Running deploy hook...".yellow());
        infra.deploy().await?;
    }

    println!();
    println!(
        "{}",
        format!(
            "Done. {} server(s) provisioned.",
            infra.provisioned_servers().len()
        )
        .green()
        .bold()
    );
    Ok(())
}
