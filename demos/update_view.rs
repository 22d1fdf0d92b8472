//! Create a view, then rename it, leaving patterns and policies untouched.
//!
//! Credentials come from GLASNOSTIC_USERNAME / GLASNOSTIC_PASSWORD; use the
//! same ones you use to sign in to https://glasnostic.com/signin.

use glasnostic::{GlasnosticConsole, MetricType, Policies, ViewUpdate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = std::env::var("GLASNOSTIC_USERNAME")?;
    let password = std::env::var("GLASNOSTIC_PASSWORD")?;

    let console = GlasnosticConsole::new()?;
    let session = console.login(&username, &password)?;
    println!("logged in as {}", session.username());

    let environments = session.environments()?;
    let keys: Vec<&str> = environments.iter().map(|e| e.key.as_str()).collect();
    println!("environment keys: {:?}", keys);

    let environment_key = &environments
        .get(1)
        .ok_or("account has fewer than two environments")?
        .key;
    let view = session.create_view(
        environment_key,
        "My Channel",
        "clients*",
        "services*",
        Some(Policies::single(MetricType::Requests, 10000.0)),
    )?;
    println!("created view: {:?}", view);

    let view_id = view.id.as_deref().ok_or("created view has no id")?;
    let updated = session.update_view(
        environment_key,
        view_id,
        ViewUpdate::new().name("Updated Name"),
    )?;
    println!("updated view: {:?}", updated);

    Ok(())
}
