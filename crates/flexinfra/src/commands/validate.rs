use colored::Colorize;
use flexinfra_cloud::CloudProvider;
use flexinfra_core::parse_manifest_file;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub fn handle(config: Option<&Path>) -> anyhow::Result<()> {
    let path = super::resolve_manifest(config)?;
    println!(
        "{}",
        format!("Validating {}...", path.display()).blue().bold()
    );

    let manifest = parse_manifest_file(&path)?;

    // Network layouts, and one backend per declared provider. Backend
    // construction touches no vendor API, so this stays offline.
    let mut backends: HashMap<String, Arc<dyn CloudProvider>> = HashMap::new();
    for (name, settings) in &manifest.providers {
        settings.network.validate()?;
        let provider = super::build_provider(name, &manifest, settings)?;
        println!(
            "  ✓ provider {} ({} subnet(s))",
            name.cyan(),
            settings.network.subnets.len()
        );
        backends.insert(name.clone(), provider);
    }

    // Servers: provider references, table membership, address ranges
    for decl in &manifest.servers {
        let server = &decl.server;
        let provider = backends.get(&decl.provider).ok_or_else(|| {
            anyhow::anyhow!(
                "server '{}' references unknown provider '{}'",
                server.name,
                decl.provider
            )
        })?;

        if !provider.validate_server(server) {
            let sizes: Vec<&str> = provider.size_table().keys().collect();
            let images: Vec<&str> = provider.image_table().keys().collect();
            anyhow::bail!(
                "server '{}' does not resolve on provider '{}' (size '{}', image '{}')\nKnown sizes: {}\nKnown images: {}",
                server.name,
                decl.provider,
                server.size,
                server.image,
                sizes.join(", "),
                images.join(", ")
            );
        }

        if let Some(ip) = server.ip_address {
            let settings = &manifest.providers[&decl.provider];
            if !settings.network.private_ip_range.contains(ip) {
                anyhow::bail!(
                    "server '{}' ip address {} is outside the network range {} of provider '{}'",
                    server.name,
                    ip,
                    settings.network.private_ip_range,
                    decl.provider
                );
            }
        }

        println!("  ✓ server {} ({})", server.name.cyan(), decl.provider);
    }

    // Security groups: provider references only; rule shapes are
    // provider business
    for decl in &manifest.security_groups {
        if !backends.contains_key(&decl.provider) {
            anyhow::bail!(
                "security-group '{}' references unknown provider '{}'",
                decl.group.name,
                decl.provider
            );
        }
        println!(
            "  ✓ security-group {} ({})",
            decl.group.name.cyan(),
            decl.provider
        );
    }

    println!("{}", "Manifest is valid.".green().bold());
    Ok(())
}
