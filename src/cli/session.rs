//! Session management commands: list, show, focus, send, kill

use anyhow::Result;

use super::{Context, resolve_session_name};

/// List live sessions
pub async fn list_command(ctx: &Context, json: bool) -> Result<()> {
    let manager = ctx.restored_manager().await?;
    let sessions = manager.list();

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!("{:<32} {:<10} {:<20}", "SESSION", "ACTIVITY", "CREATED");
    println!("{}", "-".repeat(64));
    for session in &sessions {
        println!(
            "{:<32} {:<10} {:<20}",
            session.name,
            session.activity,
            session.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!("Total: {} session(s)", sessions.len());
    Ok(())
}

/// Reveal a session without taking focus
pub async fn show_command(ctx: &Context, target: &str) -> Result<()> {
    let name = resolve_session_name(target);
    ctx.restored_manager().await?.show(&name).await?;
    println!("Showing {name}");
    Ok(())
}

/// Reveal a session and take focus
pub async fn focus_command(ctx: &Context, target: &str) -> Result<()> {
    let name = resolve_session_name(target);
    ctx.restored_manager().await?.focus(&name).await?;
    Ok(())
}

/// Type a line into a session
pub async fn send_command(ctx: &Context, target: &str, text: &str) -> Result<()> {
    let name = resolve_session_name(target);
    ctx.restored_manager().await?.send(&name, text).await?;
    println!("Sent to {name}");
    Ok(())
}

/// Kill a session
pub async fn kill_command(ctx: &Context, target: &str) -> Result<()> {
    let name = resolve_session_name(target);
    if ctx.restored_manager().await?.kill(&name).await {
        println!("Killed {name}");
    } else {
        println!("No session named {name}");
    }
    Ok(())
}
