//! Create a capturing view, push two metric samples for its route, and read
//! the series back, first as a full window and then incrementally.
//!
//! Credentials come from GLASNOSTIC_USERNAME / GLASNOSTIC_PASSWORD; use the
//! same ones you use to sign in to https://glasnostic.com/signin.

use chrono::Utc;
use glasnostic::{GlasnosticConsole, Route, RouteEndpoint, RouteSample, SampleValues};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = std::env::var("GLASNOSTIC_USERNAME")?;
    let password = std::env::var("GLASNOSTIC_PASSWORD")?;

    let console = GlasnosticConsole::new()?;
    let session = console.login(&username, &password)?;
    println!("logged in as {}", session.username());

    let environments = session.environments()?;
    let environment = environments.first().ok_or("account has no environments")?;

    // a view capturing the traffic between the two node groups
    let view = session.create_view(&environment.key, "My Channel", "source", "destination", None)?;
    println!("created view: {:?}", view);

    let network_key = &environment
        .clusters
        .first()
        .ok_or("environment has no clusters")?
        .key;
    let samples = [RouteSample {
        route: Route {
            source: RouteEndpoint {
                name: "source".to_string(),
                instance: "0".to_string(),
            },
            destination: RouteEndpoint {
                name: "destination".to_string(),
                instance: "1".to_string(),
            },
        },
        metric: SampleValues {
            bandwidth: 1.0,
            connections: 2.0,
            concurrency: 3.0,
            latency: 4.0,
        },
    }];
    session.send_metrics(network_key, Utc::now(), &samples)?;
    println!("metric sent.");

    let view_index = view.index.as_deref().ok_or("created view has no index")?;
    // the last minute (60000 ms) in 10s samples (10000 ms)
    let metrics = session.view_metrics(&environment.key, view_index, 10_000, 60_000, None)?;
    println!("initial metrics: {:?}", metrics);

    session.send_metrics(network_key, Utc::now(), &samples)?;
    println!("2nd metric sent.");

    // 30s of metrics continuing from where the previous window began
    let update = session.view_metrics(
        &environment.key,
        view_index,
        10_000,
        30_000,
        Some(metrics.window.start),
    )?;
    println!("metrics update: {:?}", update);

    Ok(())
}
