//! Concurrent upload driver for the content-engine HTTP surface.
//!
//! Fires `LOADTEST_TOTAL_REQUESTS` multipart uploads at `POST /upload` with
//! `LOADTEST_CONCURRENT_USERS` in flight at a time, then prints a summary of
//! status codes and latency.

use std::env;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct RequestOutcome {
    status: Option<u16>,
    duration: Duration,
}

async fn send_upload(client: reqwest::Client, api_url: String, request_id: usize) -> RequestOutcome {
    let filename = format!("stress_test_{}.txt", request_id);
    let content = format!("This is a stress test file number {}.", request_id);

    let start = Instant::now();

    let part = match reqwest::multipart::Part::text(content)
        .file_name(filename.clone())
        .mime_str("text/plain")
    {
        Ok(part) => part,
        Err(e) => {
            error!("Failed to build multipart body for {}: {}", filename, e);
            return RequestOutcome {
                status: None,
                duration: start.elapsed(),
            };
        }
    };
    let form = reqwest::multipart::Form::new().part("file", part);

    let result = client
        .post(format!("{}/upload", api_url))
        .multipart(form)
        .send()
        .await;

    let duration = start.elapsed();
    match result {
        Ok(response) => {
            let status = response.status().as_u16();
            if response.status().is_success() {
                info!("Uploaded {} in {:.2}s", filename, duration.as_secs_f64());
            } else {
                let body = response.text().await.unwrap_or_default();
                error!("Upload of {} failed: {} - {}", filename, status, body);
            }
            RequestOutcome {
                status: Some(status),
                duration,
            }
        }
        Err(e) => {
            error!("Network error uploading {}: {}", filename, e);
            RequestOutcome {
                status: None,
                duration,
            }
        }
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let api_url =
        env::var("LOADTEST_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let concurrent_users = env_usize("LOADTEST_CONCURRENT_USERS", 50);
    let total_requests = env_usize("LOADTEST_TOTAL_REQUESTS", 5000);

    info!(
        "Starting stress test on {} with {} concurrent users, {} total requests",
        api_url, concurrent_users, total_requests
    );

    let client = reqwest::Client::new();
    let started = Instant::now();

    let outcomes: Vec<RequestOutcome> = stream::iter(0..total_requests)
        .map(|request_id| {
            let client = client.clone();
            let api_url = api_url.clone();
            send_upload(client, api_url, request_id)
        })
        .buffer_unordered(concurrent_users)
        .collect()
        .await;

    let elapsed = started.elapsed();
    let succeeded = outcomes
        .iter()
        .filter(|o| matches!(o.status, Some(code) if (200..300).contains(&code)))
        .count();
    let rejected = outcomes
        .iter()
        .filter(|o| matches!(o.status, Some(code) if !(200..300).contains(&code)))
        .count();
    let network_errors = outcomes.iter().filter(|o| o.status.is_none()).count();

    let total_latency: Duration = outcomes.iter().map(|o| o.duration).sum();
    let avg_latency = total_latency
        .checked_div(outcomes.len() as u32)
        .unwrap_or_default();
    let max_latency = outcomes
        .iter()
        .map(|o| o.duration)
        .max()
        .unwrap_or_default();

    info!(
        "Stress test complete in {:.2}s: {} ok, {} rejected, {} network errors, \
         avg latency {:.3}s, max latency {:.3}s, {:.1} req/s",
        elapsed.as_secs_f64(),
        succeeded,
        rejected,
        network_errors,
        avg_latency.as_secs_f64(),
        max_latency.as_secs_f64(),
        (outcomes.len() as f64) / elapsed.as_secs_f64()
    );
}
