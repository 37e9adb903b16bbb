use std::time::Duration;

use reqwest::Client;
use tracing::warn;

/// Build an HTTP client with a panic-safe fallback when system proxy
/// discovery is unavailable in the runtime environment.
pub(crate) fn build_http_client(
    timeout: Duration,
    user_agent: Option<&str>,
) -> anyhow::Result<Client> {
    let configure = |builder: reqwest::ClientBuilder| {
        let builder = builder.timeout(timeout);
        match user_agent {
            Some(ua) => builder.user_agent(ua),
            None => builder,
        }
    };

    // Test environments (and some constrained runtimes) can panic inside
    // macOS system proxy discovery. Skip that code path entirely for tests.
    if cfg!(test)
        || matches!(
            std::env::var("DEVBOT_DISABLE_SYSTEM_PROXY_DISCOVERY").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        )
    {
        return Ok(configure(Client::builder()).no_proxy().build()?);
    }

    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        configure(Client::builder()).build()
    })) {
        Ok(Ok(client)) => return Ok(client),
        Ok(Err(e)) => {
            warn!(
                error = %e,
                "HTTP client build with system proxy support failed; retrying with proxy discovery disabled"
            );
        }
        Err(_) => {
            warn!(
                "HTTP client build panicked during system proxy discovery; retrying with proxy discovery disabled"
            );
        }
    }

    Ok(configure(Client::builder()).no_proxy().build()?)
}
