use anyhow::Result;

use crate::config::Settings;
use crate::webui;

pub fn run(port: Option<u16>) -> Result<()> {
    let mut settings = Settings::load()?;
    if let Some(port) = port {
        settings.port = port;
    }
    webui::run_server(settings)
}
