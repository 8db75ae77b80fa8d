//! Turn configured targets into scrapeable ones.

use std::sync::Arc;

use anyhow::Context;
use forti_api::Target;
use forti_core::TargetConfig;
use forti_probe::probes::select;
use tokio::runtime::Handle;
use tracing::debug;

use crate::http_fetcher::HttpFetcher;

pub fn build_target(config: &TargetConfig, handle: &Handle) -> anyhow::Result<Target> {
    let probes = select(config.probes.as_deref(), &config.exclude)
        .with_context(|| format!("target {:?}: invalid probe selection", config.name))?;
    let timeout = config.timeout()?;
    let version = config.firmware_version()?;

    debug!(
        target = %config.name,
        address = %config.address,
        probes = probes.len(),
        timeout_ms = timeout.as_millis() as u64,
        "target configured"
    );

    Ok(Target {
        name: config.name.clone(),
        fetcher: Arc::new(HttpFetcher::new(
            &config.address,
            config.token.clone(),
            timeout,
            handle.clone(),
        )),
        version,
        probes,
    })
}

pub fn build_targets(configs: &[TargetConfig], handle: &Handle) -> anyhow::Result<Vec<Target>> {
    configs.iter().map(|c| build_target(c, handle)).collect()
}
