use anyhow::Result;
use colored::Colorize;

use crate::config::Settings;
use crate::outbound::{BeaconClient, OutboundClickEvent, OutboundClickPayload, PageContext};

/// Send one outbound-click beacon to the configured API.
pub fn run(payload: OutboundClickPayload, page: PageContext) -> Result<()> {
    let settings = Settings::load()?;
    let client = BeaconClient::new(&settings.api_base_url)?;
    let event = OutboundClickEvent::from_context(payload, &page);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(client.send(&event))?;

    println!(
        "{} Recorded {} click for store '{}' at {}",
        "✓".green(),
        event.link_type,
        event.store_id.bright_cyan(),
        client.endpoint().bright_black()
    );
    Ok(())
}
