//! `endpoint` command: where the control plane is and whether it answers

use anyhow::Result;

use opsession::api::{ApiClient, discovery};

use super::Context;

pub fn endpoint_command(ctx: &Context) -> Result<()> {
    let descriptor = ctx
        .tickets_dir
        .as_deref()
        .and_then(discovery::read_descriptor);

    let url = match &descriptor {
        Some(d) => {
            println!(
                "Descriptor: pid {} version {} started {}",
                d.pid, d.version, d.started_at
            );
            d.base_url()
        }
        None => {
            println!("Descriptor: none, using configured default");
            ctx.config.api.default_url.clone()
        }
    };

    let client = ApiClient::new(
        ctx.config.api.connect_timeout(),
        ctx.config.api.request_timeout(),
    );
    match client.health_check(&url) {
        Ok(()) => println!("{url} (healthy)"),
        Err(e) => println!("{url} (unreachable: {e})"),
    }
    Ok(())
}
